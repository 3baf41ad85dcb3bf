use contend::{
    run_case, AccessPattern, Case, ConcurrentMap, ExecutionMode, KeySpace, LockedMap, MapKind,
    ParallelRunner, RunConfig, SequentialRunner, SkipListMap, StripedHashMap,
};
use std::sync::Arc;

fn contended<M: ConcurrentMap>(workers: usize, epochs: usize, budget: u64) {
    let keys = KeySpace::new(epochs);
    let map: Arc<M> = Arc::new(keys.populate_with_capacity(8));
    let report = ParallelRunner::new(workers, budget)
        .unwrap()
        .run(map.clone(), keys, AccessPattern::ReadsWithWrites)
        .unwrap()
        .into_result()
        .unwrap();
    assert_eq!(report.writers, 1, "{}", M::NAME);
    assert_eq!(report.writes, budget * epochs as u64);
    assert_eq!(report.reads, (workers as u64 - 1) * budget * epochs as u64);
    assert!(keys.iter().all(|k| map.get(k) == Some(k)));
}

fn contended_all(workers: usize, epochs: usize, budget: u64) {
    contended::<LockedMap<usize, usize>>(workers, epochs, budget);
    contended::<StripedHashMap<usize, usize>>(workers, epochs, budget);
    contended::<dashmap::DashMap<usize, usize>>(workers, epochs, budget);
    contended::<flurry::HashMap<usize, usize>>(workers, epochs, budget);
    contended::<SkipListMap>(workers, epochs, budget);
}

#[test]
#[cfg_attr(miri, ignore)]
fn every_map_survives_one_writer_many_readers() {
    contended_all(4, 4096, 20);
}

#[test]
#[ignore = "long running, use --ignored"]
fn every_map_survives_full_budget() {
    contended_all(4, 4096, 10_000);
}

#[test]
fn every_map_survives_alternating_turns() {
    let keys = KeySpace::new(4096);
    for map in MapKind::ALL {
        let config = RunConfig::default()
            .with_epochs(keys.len())
            .with_budget(2 * keys.len() as u64);
        let case = Case::new(map, AccessPattern::ReadsWithWrites, ExecutionMode::Sequential);
        let report = run_case(case, &config).unwrap();
        assert!(report.is_valid(), "{}", case);
        assert_eq!(report.reads, 4096);
        assert_eq!(report.writes, 4096);
    }
}

#[test]
fn locked_baseline_and_lock_free_agree() {
    let config = RunConfig::default()
        .with_epochs(4096)
        .with_workers(4)
        .with_budget(10);
    let mut reports = Vec::new();
    for map in [MapKind::Locked, MapKind::Flurry, MapKind::DashMap] {
        let case = Case::new(map, AccessPattern::ReadsWithWrites, ExecutionMode::Parallel);
        reports.push(run_case(case, &config).unwrap());
    }
    assert!(reports.iter().all(|r| r.is_valid()));
    assert!(reports.windows(2).all(|w| w[0].ops() == w[1].ops()));
}

#[test]
fn empty_key_space_in_every_case() {
    let config = RunConfig::default()
        .with_epochs(0)
        .with_workers(4)
        .with_budget(10_000);
    for case in Case::all() {
        let report = run_case(case, &config).unwrap();
        assert!(report.is_valid(), "{}", case);
        assert_eq!(report.ops(), 0, "{}", case);
    }
}

#[test]
fn sequential_runner_on_a_borrowed_map() {
    let keys = KeySpace::new(100);
    let map: flurry::HashMap<usize, usize> = keys.populate();
    let runner = SequentialRunner::new(1000);
    for pattern in AccessPattern::ALL {
        let report = runner.run(&map, keys, pattern);
        assert!(report.is_valid());
    }
    assert!(keys.iter().all(|k| ConcurrentMap::get(&map, k) == Some(k)));
}
