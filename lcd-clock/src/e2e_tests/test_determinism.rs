//! Test that the same seed produces identical simulation runs.

use crate::simulation::{SimulatedClock, Simulator};

fn run(seed: u64) -> (u64, u64, u64, Vec<String>) {
    let mut sim = Simulator::new(seed, SimulatedClock::new(0), 1_700_000_000_000)
        .with_failure_rate(0.3)
        .with_resync_rate(0.05);
    let result = sim.run(500);
    (
        result.ticks,
        result.sync_attempts,
        result.successful_syncs,
        result.violations,
    )
}

#[test]
fn test_deterministic_simulation() {
    for seed in [1, 42, 9_001] {
        let first = run(seed);
        let second = run(seed);

        assert_eq!(first, second, "seed {seed} diverged");
        assert!(first.3.is_empty(), "seed {seed} violations: {:?}", first.3);
    }
}
