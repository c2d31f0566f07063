//! Completion barrier
//!
//! Counts outstanding workers. The coordinator registers each worker before
//! launching it and then blocks in `wait()` until every worker has called
//! `signal()`. Platform implementations use the cheapest blocking primitive
//! available.
//!
//! Misuse is fatal: signalling more times than registered, or registering
//! past `u32::MAX` outstanding workers, panics. A failed `signal` leaves the
//! count untouched.

use tandem_core::CompletionSignal;

/// Counting barrier shared between a coordinator and its workers
///
/// Workers reach it only through [`CompletionSignal`]. `register`/`add` and
/// `wait` belong to the coordinator, and must not race with each other for
/// the same generation of workers. Once `wait` returns the barrier can be
/// reused.
pub trait CountingBarrier: CompletionSignal {
    /// Add `n` outstanding workers
    fn add(&self, n: u32);

    /// Add one outstanding worker; call before the worker starts
    fn register(&self) {
        self.add(1);
    }

    /// Block until the outstanding count reaches zero
    ///
    /// Returns immediately if nothing is registered. There is no timeout.
    fn wait(&self);

    /// Current outstanding count (a hint; may be stale under concurrency)
    fn outstanding(&self) -> u32;
}

#[cold]
#[track_caller]
pub(crate) fn over_signal() -> ! {
    panic!("completion barrier signalled more times than workers were registered")
}

#[cold]
#[track_caller]
pub(crate) fn over_register(current: u32, n: u32) -> ! {
    panic!(
        "completion barrier overflow: {} outstanding, registering {} more",
        current, n
    )
}

mod fallback;
pub use fallback::CondvarBarrier;

cfg_if::cfg_if! {
    if #[cfg(target_os = "linux")] {
        mod futex_linux;
        pub use futex_linux::FutexBarrier;
        pub use futex_linux::FutexBarrier as CompletionBarrier;
    } else {
        pub use fallback::CondvarBarrier as CompletionBarrier;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    fn check_zero_registered_returns_immediately<B: CountingBarrier + Default>() {
        let barrier = B::default();
        assert_eq!(barrier.outstanding(), 0);
        barrier.wait();
        barrier.wait();
    }

    fn check_wait_sees_every_signal<B: CountingBarrier + Default + 'static>(n: u32) {
        let barrier = Arc::new(B::default());
        let finished = Arc::new(AtomicUsize::new(0));
        let mut handles = Vec::new();

        for i in 0..n {
            barrier.register();
            let barrier = Arc::clone(&barrier);
            let finished = Arc::clone(&finished);
            handles.push(thread::spawn(move || {
                // Stagger so some workers finish well after wait() starts
                thread::sleep(Duration::from_millis(u64::from(i % 4) * 5));
                finished.fetch_add(1, Ordering::SeqCst);
                barrier.signal();
            }));
        }

        barrier.wait();
        assert_eq!(finished.load(Ordering::SeqCst), n as usize);
        assert_eq!(barrier.outstanding(), 0);

        for h in handles {
            h.join().unwrap();
        }
    }

    fn check_reusable_after_drain<B: CountingBarrier + Default + 'static>() {
        let barrier = Arc::new(B::default());
        for round in 1..=3u32 {
            barrier.add(round);
            let handles: Vec<_> = (0..round)
                .map(|_| {
                    let barrier = Arc::clone(&barrier);
                    thread::spawn(move || barrier.signal())
                })
                .collect();
            barrier.wait();
            assert_eq!(barrier.outstanding(), 0);
            for h in handles {
                h.join().unwrap();
            }
        }
    }

    fn check_over_signal_panics_and_keeps_count<B: CountingBarrier + Default>() {
        let barrier = B::default();
        barrier.register();
        barrier.signal();

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| barrier.signal()));
        assert!(result.is_err());
        assert_eq!(barrier.outstanding(), 0);
        barrier.wait();
    }

    fn check_over_register_panics<B: CountingBarrier + Default>() {
        let barrier = B::default();
        barrier.add(u32::MAX);
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| barrier.register()));
        assert!(result.is_err());
        assert_eq!(barrier.outstanding(), u32::MAX);
    }

    #[test]
    fn test_zero_registered() {
        check_zero_registered_returns_immediately::<CompletionBarrier>();
        check_zero_registered_returns_immediately::<CondvarBarrier>();
    }

    #[test]
    fn test_wait_for_all() {
        for n in [0, 1, 5, 32] {
            check_wait_sees_every_signal::<CompletionBarrier>(n);
            check_wait_sees_every_signal::<CondvarBarrier>(n);
        }
    }

    #[test]
    fn test_reuse() {
        check_reusable_after_drain::<CompletionBarrier>();
        check_reusable_after_drain::<CondvarBarrier>();
    }

    #[test]
    fn test_over_signal() {
        check_over_signal_panics_and_keeps_count::<CompletionBarrier>();
        check_over_signal_panics_and_keeps_count::<CondvarBarrier>();
    }

    #[test]
    #[should_panic(expected = "signalled more times")]
    fn test_signal_without_register_panics() {
        CompletionBarrier::new().signal();
    }

    #[test]
    fn test_over_register() {
        check_over_register_panics::<CompletionBarrier>();
        check_over_register_panics::<CondvarBarrier>();
    }

    #[test]
    fn test_wait_blocks_until_last_signal() {
        let barrier = Arc::new(CompletionBarrier::new());
        barrier.add(2);
        barrier.signal();

        let waiter = {
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || barrier.wait())
        };

        thread::sleep(Duration::from_millis(50));
        assert!(!waiter.is_finished());
        assert_eq!(barrier.outstanding(), 1);

        barrier.signal();
        waiter.join().unwrap();
    }

    #[test]
    fn test_multiple_waiters_released() {
        let barrier = Arc::new(CompletionBarrier::new());
        barrier.register();

        let waiters: Vec<_> = (0..3)
            .map(|_| {
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || barrier.wait())
            })
            .collect();

        thread::sleep(Duration::from_millis(20));
        barrier.signal();
        for w in waiters {
            w.join().unwrap();
        }
    }
}
