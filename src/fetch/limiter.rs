//! Reusable bounded-concurrency fan-out
//!
//! Every embedder runs the same shape of work, a batch of independent
//! fetch futures, under a different concurrency policy: unbounded for
//! images and scripts, capped for stylesheets and background images. The
//! policy is a plain value passed to [`run_limited`] instead of logic
//! woven into each call site.

use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::Semaphore;

/// Run a batch of futures, optionally bounding how many are in flight.
///
/// Results come back in input order regardless of completion order.
/// `None` runs the whole batch at once; `Some(n)` lets at most `n` futures
/// proceed concurrently, the rest waiting on a semaphore.
pub async fn run_limited<T, F>(futures: Vec<F>, limit: Option<usize>) -> Vec<T>
where
    F: std::future::Future<Output = T>,
{
    match limit {
        None => join_all(futures).await,
        Some(n) => {
            let semaphore = Arc::new(Semaphore::new(n.max(1)));
            join_all(futures.into_iter().map(|future| {
                let semaphore = Arc::clone(&semaphore);
                async move {
                    // The semaphore lives for the whole batch, so acquisition
                    // only fails if it were closed; run unguarded in that case.
                    match semaphore.acquire_owned().await {
                        Ok(_permit) => future.await,
                        Err(_) => future.await,
                    }
                }
            }))
            .await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn results_preserve_input_order() {
        // Later futures finish first; output order must still match input.
        let futures: Vec<_> = (0..8u64)
            .map(|i| async move {
                tokio::time::sleep(Duration::from_millis(80 - i * 10)).await;
                i
            })
            .collect();

        let results = run_limited(futures, None).await;
        assert_eq!(results, (0..8).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn cap_bounds_in_flight_futures() {
        let active = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let futures: Vec<_> = (0..12)
            .map(|_| {
                let active = Arc::clone(&active);
                let peak = Arc::clone(&peak);
                async move {
                    let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(10)).await;
                    active.fetch_sub(1, Ordering::SeqCst);
                }
            })
            .collect();

        run_limited(futures, Some(2)).await;
        assert!(peak.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn zero_cap_is_clamped_to_one() {
        let futures: Vec<_> = (1..=2).map(|i| async move { i }).collect();
        let results = run_limited(futures, Some(0)).await;
        assert_eq!(results, vec![1, 2]);
    }
}
