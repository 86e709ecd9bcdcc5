use crate::history::{HistoryPoint, RollingHistory};
use crate::rank::{SortSpec, rank_top};
use crate::system::process::ProcessRecord;
use crate::system::snapshot::Snapshot;

/// Presentation state carried from tick to tick.
#[derive(Debug, Clone, Default)]
pub struct ViewContext {
    pub sort: SortSpec,
    pub filter: String,
    pub top_n: Option<usize>,
    pub history: RollingHistory,
}

/// Ranked records ready for display.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct View {
    pub records: Vec<ProcessRecord>,
    /// Records passing the filter, before truncation.
    pub matched: usize,
    pub total: usize,
}

impl ViewContext {
    pub fn new(sort: SortSpec, filter: impl Into<String>, top_n: Option<usize>) -> Self {
        ViewContext {
            sort,
            filter: filter.into(),
            top_n,
            history: RollingHistory::new(),
        }
    }

    /// Re-ranks without touching history.
    pub fn view(&self, snapshot: &Snapshot) -> View {
        let mut records = rank_top(&snapshot.records, self.sort, &self.filter, None);
        let matched = records.len();
        if let Some(n) = self.top_n {
            records.truncate(n);
        }
        View {
            records,
            matched,
            total: snapshot.records.len(),
        }
    }
}

/// Runs once per completed sampling pass.
pub fn apply_tick(ctx: &mut ViewContext, snapshot: &Snapshot) -> View {
    ctx.history.append(HistoryPoint::from(&snapshot.memory));
    ctx.view(snapshot)
}
