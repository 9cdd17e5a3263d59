//! tests/policy_tests.rs
//! Cuota, pausas y reintentos ante contención.

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::time::Duration;

    use rand::{rngs::StdRng, SeedableRng};

    use crate::error::{CampaignError, StoreError};
    use crate::services::pacing_service::{total_to_send, PacingPolicy};
    use crate::services::retry_service::{Backoff, RetryPolicy};

    #[test]
    fn total_is_min_of_unsent_and_quota() {
        for (unsent, quota, expected) in [(5, 3, 3), (2, 10, 2), (0, 10, 0), (7, 0, 0), (4, 4, 4)] {
            assert_eq!(total_to_send(unsent, quota), expected, "unsent={unsent} quota={quota}");
        }
    }

    #[test]
    fn sampled_delays_are_within_inclusive_bounds() {
        let policy = PacingPolicy::new(3, 6).unwrap();
        let mut rng = StdRng::seed_from_u64(42);
        let samples: Vec<u64> = (0..500).map(|_| policy.sample(&mut rng)).collect();

        assert!(samples.iter().all(|d| (3..=6).contains(d)));
        // Ambos extremos son alcanzables
        assert!(samples.contains(&3));
        assert!(samples.contains(&6));
    }

    #[test]
    fn equal_bounds_always_yield_that_delay() {
        let policy = PacingPolicy::new(45, 45).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        assert!((0..50).all(|_| policy.sample(&mut rng) == 45));
    }

    #[test]
    fn inverted_bounds_are_rejected() {
        let err = PacingPolicy::new(10, 5).unwrap_err();
        assert!(matches!(err, CampaignError::Configuration(_)));
    }

    #[test]
    fn backoff_schedules() {
        let linear = RetryPolicy {
            max_attempts: 4,
            base_delay: Duration::from_millis(100),
            backoff: Backoff::Linear,
        };
        assert_eq!(linear.delay_for(1), Duration::from_millis(100));
        assert_eq!(linear.delay_for(3), Duration::from_millis(300));

        let exponential = RetryPolicy {
            backoff: Backoff::Exponential,
            ..linear
        };
        assert_eq!(exponential.delay_for(1), Duration::from_millis(100));
        assert_eq!(exponential.delay_for(3), Duration::from_millis(400));
    }

    #[test]
    fn mark_sent_path_is_more_patient_than_read_path() {
        let read = RetryPolicy::read_path();
        let mark = RetryPolicy::mark_sent_path();
        assert!(mark.max_attempts > read.max_attempts);
        assert!(mark.base_delay > read.base_delay);
        assert_eq!(read.backoff, Backoff::Linear);
    }

    /// Operación que falla por contención `failures` veces y luego funciona.
    async fn flaky(calls: &Cell<u32>, failures: u32) -> Result<&'static str, StoreError> {
        calls.set(calls.get() + 1);
        if calls.get() <= failures {
            Err(StoreError::Contention(format!("locked #{}", calls.get())))
        } else {
            Ok("ok")
        }
    }

    #[tokio::test(start_paused = true)]
    async fn succeeds_when_failures_are_below_max_attempts() {
        let policy = RetryPolicy::read_path();
        for failures in 0..policy.max_attempts {
            let calls = Cell::new(0);
            let result = policy.run("flaky", || flaky(&calls, failures)).await;
            assert_eq!(result.unwrap(), "ok");
            assert_eq!(calls.get(), failures + 1);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn propagates_last_transient_error_when_exhausted() {
        let policy = RetryPolicy::mark_sent_path();
        let calls = Cell::new(0);

        let err = policy
            .run("flaky", || flaky(&calls, policy.max_attempts))
            .await
            .unwrap_err();

        assert_eq!(calls.get(), policy.max_attempts);
        match err {
            StoreError::Contention(msg) => assert_eq!(msg, format!("locked #{}", policy.max_attempts)),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn non_transient_errors_are_not_retried() {
        let policy = RetryPolicy::mark_sent_path();
        let calls = Cell::new(0);

        let err = policy
            .run("broken", || {
                calls.set(calls.get() + 1);
                async { Err::<(), _>(StoreError::Other("no such table: clients".to_string())) }
            })
            .await
            .unwrap_err();

        assert!(!err.is_transient());
        assert_eq!(calls.get(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn waits_between_attempts() {
        let policy = RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
            backoff: Backoff::Linear,
        };
        let calls = Cell::new(0);
        let started = tokio::time::Instant::now();

        policy.run("flaky", || flaky(&calls, 2)).await.unwrap();

        // 1s tras el primer fallo, 2s tras el segundo
        assert_eq!(started.elapsed().as_secs(), 3);
    }
}
