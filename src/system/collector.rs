use std::time::Duration;

use super::derive::MetricDeriver;
use super::sampler::{ProcessSource, Sampler, SysinfoSource};
use super::snapshot::Snapshot;

/// Sampler and deriver run back to back; one `refresh` is one pass.
pub struct Collector<S: ProcessSource = SysinfoSource> {
    sampler: Sampler<S>,
    deriver: MetricDeriver,
}

impl Collector<SysinfoSource> {
    pub fn new(probe_deadline: Duration) -> Self {
        Collector::from_sampler(Sampler::new(probe_deadline))
    }
}

impl<S: ProcessSource> Collector<S> {
    pub fn from_sampler(sampler: Sampler<S>) -> Self {
        let deriver = MetricDeriver::new(sampler.logical_cores());
        Collector { sampler, deriver }
    }

    pub fn refresh(&mut self) -> Snapshot {
        let _refresh_span = tracing::debug_span!("collector.refresh").entered();

        let raw = self.sampler.sample();
        let snapshot = self.deriver.derive(raw);
        if snapshot.skipped_count() > 0 {
            tracing::debug!(
                skipped = snapshot.skipped_count(),
                degraded = snapshot.unsupported_count(),
                "processes omitted from snapshot"
            );
        }
        snapshot
    }

    pub fn sampler_mut(&mut self) -> &mut Sampler<S> {
        &mut self.sampler
    }

    pub fn deriver(&self) -> &MetricDeriver {
        &self.deriver
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::derive::MIN_RATE_WINDOW;
    use crate::system::platform::{IoStats, ProbeError};
    use crate::system::sampler::tests::{FakeSource, entry};

    fn collector(source: FakeSource) -> Collector<FakeSource> {
        Collector::from_sampler(Sampler::with_source(source, Duration::from_secs(5)))
    }

    #[test]
    fn first_pass_is_cold_then_counters_follow_live_pids() {
        let mut source = FakeSource::default();
        source
            .frames
            .push_back(vec![Ok(entry(1, "a", 1024, 0)), Ok(entry(2, "b", 2048, 0))]);
        source
            .frames
            .push_back(vec![Ok(entry(2, "b", 2048, 50)), Ok(entry(3, "c", 4096, 0))]);
        let mut collector = collector(source);

        let first = collector.refresh();
        assert_eq!(first.records.len(), 2);
        assert!(first.records.iter().all(|r| r.cpu_percent == 0.0));

        let second = collector.refresh();
        let pids: Vec<u32> = second.records.iter().map(|r| r.pid).collect();
        assert_eq!(pids, vec![2, 3]);
        assert!(second.records.iter().all(|r| r.cpu_percent >= 0.0));

        let counters = collector.deriver().counters();
        assert_eq!(counters.len(), 2);
        assert!(counters.get(1).is_none());
    }

    #[test]
    fn io_deltas_use_previous_pass() {
        let mut source = FakeSource::default();
        source.frames.push_back(vec![Ok(entry(1, "writer", 1, 0))]);
        source.frames.push_back(vec![Ok(entry(1, "writer", 1, 0))]);
        source.io.insert(
            1,
            Ok(IoStats {
                read_bytes: 0,
                write_bytes: 0,
            }),
        );
        let mut collector = collector(source);
        let _ = collector.refresh();

        collector.sampler_mut().source_mut().io.insert(
            1,
            Ok(IoStats {
                read_bytes: 0,
                write_bytes: 1 << 20,
            }),
        );
        std::thread::sleep(MIN_RATE_WINDOW + Duration::from_millis(5));
        let snapshot = collector.refresh();
        assert!(snapshot.records[0].disk_write_delta > 0.0);
        assert_eq!(snapshot.records[0].disk_read_delta, 0.0);
    }

    #[test]
    fn processes_exiting_mid_pass_never_reach_the_snapshot() {
        let mut source = FakeSource::default();
        source
            .frames
            .push_back(vec![Ok(entry(1, "a", 1, 0)), Ok(entry(2, "gone", 1, 0))]);
        source.priority.insert(2, Err(ProbeError::Gone));
        let mut collector = collector(source);

        let snapshot = collector.refresh();
        assert_eq!(snapshot.records.len(), 1);
        assert_eq!(snapshot.skipped_count(), 1);
        assert!(collector.deriver().counters().get(2).is_none());
    }
}
