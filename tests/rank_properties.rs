use proptest::prelude::*;

use procscope::history::{HISTORY_CAPACITY, HistoryPoint, RollingHistory};
use procscope::rank::{SortKey, matches_filter, rank};
use procscope::system::process::ProcessRecord;

fn records_strategy() -> impl Strategy<Value = Vec<ProcessRecord>> {
    prop::collection::vec(
        (
            "[a-cA-C]{1,4}",
            0.0f64..4096.0,
            0.0f64..100.0,
            prop::option::of(-20i32..20),
        ),
        0..60,
    )
    .prop_map(|rows| {
        rows.into_iter()
            .enumerate()
            .map(|(i, (name, memory_mb, cpu_percent, priority))| ProcessRecord {
                memory_mb,
                cpu_percent,
                priority,
                ..ProcessRecord::new(i as u32 + 1, name)
            })
            .collect()
    })
}

fn key_strategy() -> impl Strategy<Value = SortKey> {
    prop::sample::select(SortKey::ALL.to_vec())
}

fn sorted_pids(records: &[ProcessRecord]) -> Vec<u32> {
    let mut pids: Vec<u32> = records.iter().map(|r| r.pid).collect();
    pids.sort_unstable();
    pids
}

proptest! {
    #[test]
    fn ranking_is_a_permutation_of_matches(
        records in records_strategy(),
        key in key_strategy(),
        descending in any::<bool>(),
        filter in "[a-c0-9]{0,2}",
    ) {
        let ranked = rank(&records, key, descending, &filter);
        let expected: Vec<ProcessRecord> = records
            .iter()
            .filter(|r| matches_filter(r, &filter))
            .cloned()
            .collect();
        prop_assert_eq!(sorted_pids(&ranked), sorted_pids(&expected));
        prop_assert!(ranked.iter().all(|r| matches_filter(r, &filter)));
    }

    #[test]
    fn exact_pid_query_finds_that_process(records in records_strategy(), pick in any::<prop::sample::Index>()) {
        prop_assume!(!records.is_empty());
        let target = pick.get(&records).pid;
        let query = target.to_string();

        let ranked = rank(&records, SortKey::Cpu, true, &query);
        prop_assert!(ranked.iter().any(|r| r.pid == target));
        // Generated names hold no digits, so only PIDs can match.
        let expected: Vec<ProcessRecord> = records
            .iter()
            .filter(|r| r.pid.to_string().contains(&query))
            .cloned()
            .collect();
        prop_assert_eq!(sorted_pids(&ranked), sorted_pids(&expected));
    }

    #[test]
    fn cpu_ranking_is_ordered(records in records_strategy(), descending in any::<bool>()) {
        let ranked = rank(&records, SortKey::Cpu, descending, "");
        for pair in ranked.windows(2) {
            if descending {
                prop_assert!(pair[0].cpu_percent >= pair[1].cpu_percent);
            } else {
                prop_assert!(pair[0].cpu_percent <= pair[1].cpu_percent);
            }
        }
    }

    #[test]
    fn ranking_twice_changes_nothing(
        records in records_strategy(),
        key in key_strategy(),
        descending in any::<bool>(),
    ) {
        let once = rank(&records, key, descending, "");
        let twice = rank(&once, key, descending, "");
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn unique_keys_reverse_exactly(records in records_strategy()) {
        let ascending = rank(&records, SortKey::Pid, false, "");
        let mut descending = rank(&records, SortKey::Pid, true, "");
        descending.reverse();
        prop_assert_eq!(ascending, descending);
    }

    #[test]
    fn ties_keep_input_order(records in records_strategy(), descending in any::<bool>()) {
        let ranked = rank(&records, SortKey::Name, descending, "");
        for pair in ranked.windows(2) {
            if pair[0].name.to_lowercase() == pair[1].name.to_lowercase() {
                prop_assert!(pair[0].pid < pair[1].pid);
            }
        }
    }

    #[test]
    fn history_keeps_the_most_recent_points(values in prop::collection::vec(0.0f64..100.0, 0..40)) {
        let mut history = RollingHistory::new();
        for v in &values {
            history.append(HistoryPoint { memory_percent: *v, fault_indicator: 0.0 });
        }

        let kept: Vec<f64> = history.values().iter().map(|p| p.memory_percent).collect();
        let start = values.len().saturating_sub(HISTORY_CAPACITY);
        prop_assert_eq!(history.len(), values.len().min(HISTORY_CAPACITY));
        prop_assert_eq!(kept, values[start..].to_vec());
    }
}
