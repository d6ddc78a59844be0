//! Property-based tests for the bounded concurrency runner

use proptest::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tattle::concurrency::run_limited;

fn paused_runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .start_paused(true)
        .build()
        .unwrap()
}

proptest! {
    /// Output order equals input order and every input is processed exactly
    /// once, whatever the limit and completion timing.
    #[test]
    fn results_follow_input_order(
        delays in prop::collection::vec(0u64..50, 0..40),
        limit in 1usize..12,
    ) {
        let runtime = paused_runtime();
        let calls = AtomicUsize::new(0);
        let calls = &calls;
        let inputs: Vec<(usize, u64)> = delays.iter().copied().enumerate().collect();

        let results = runtime.block_on(run_limited(&inputs, limit, move |(index, delay)| async move {
            calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(delay)).await;
            index * 10
        })).unwrap();

        let expected: Vec<usize> = (0..delays.len()).map(|i| i * 10).collect();
        prop_assert_eq!(results, expected);
        prop_assert_eq!(calls.load(Ordering::SeqCst), delays.len());
    }

    /// Never more than `limit` workers in flight, and the limit is reached
    /// whenever there is enough work.
    #[test]
    fn in_flight_is_bounded(
        delays in prop::collection::vec(1u64..30, 1..30),
        limit in 1usize..8,
    ) {
        let runtime = paused_runtime();
        let in_flight = AtomicUsize::new(0);
        let peak = AtomicUsize::new(0);
        let (in_flight_ref, peak_ref) = (&in_flight, &peak);

        runtime.block_on(run_limited(&delays, limit, move |delay| async move {
            let now = in_flight_ref.fetch_add(1, Ordering::SeqCst) + 1;
            peak_ref.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(delay)).await;
            in_flight_ref.fetch_sub(1, Ordering::SeqCst);
        })).unwrap();

        prop_assert_eq!(peak.load(Ordering::SeqCst), limit.min(delays.len()));
    }
}
