//! Linux futex-based completion barrier
//!
//! The outstanding count is itself the futex word:
//! - `wait()` sleeps with FUTEX_WAIT on the last count it observed, so any
//!   change between the load and the syscall makes the kernel return EAGAIN
//! - the `signal()` that takes the count to zero issues FUTEX_WAKE for all
//!   waiters, skipping the syscall when nobody is parked

use super::{over_register, over_signal, CountingBarrier};
use nix::errno::Errno;
use std::sync::atomic::{AtomicU32, Ordering};
use tandem_core::{log_trace, log_warn, CompletionSignal};

pub struct FutexBarrier {
    /// Outstanding workers (futex word)
    count: AtomicU32,

    /// Threads currently inside `wait()`
    waiters: AtomicU32,
}

impl FutexBarrier {
    pub const fn new() -> Self {
        Self {
            count: AtomicU32::new(0),
            waiters: AtomicU32::new(0),
        }
    }

    fn futex_wait(&self, expected: u32) -> Result<(), Errno> {
        let result = unsafe {
            libc::syscall(
                libc::SYS_futex,
                self.count.as_ptr(),
                libc::FUTEX_WAIT | libc::FUTEX_PRIVATE_FLAG,
                expected,
                std::ptr::null::<libc::timespec>(),
                std::ptr::null::<u32>(),
                0u32,
            )
        };
        if result == 0 {
            Ok(())
        } else {
            Err(Errno::last())
        }
    }

    fn futex_wake_all(&self) {
        unsafe {
            libc::syscall(
                libc::SYS_futex,
                self.count.as_ptr(),
                libc::FUTEX_WAKE | libc::FUTEX_PRIVATE_FLAG,
                i32::MAX,
                std::ptr::null::<libc::timespec>(),
                std::ptr::null::<u32>(),
                0u32,
            );
        }
    }
}

impl Default for FutexBarrier {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for FutexBarrier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FutexBarrier")
            .field("outstanding", &self.count.load(Ordering::Relaxed))
            .field("waiters", &self.waiters.load(Ordering::Relaxed))
            .finish()
    }
}

impl CompletionSignal for FutexBarrier {
    fn signal(&self) {
        let prev = match self
            .count
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |c| c.checked_sub(1))
        {
            Ok(prev) => prev,
            Err(_) => over_signal(),
        };

        // Waiter increments `waiters` before loading `count`; with SeqCst on
        // both sides either we see the waiter or the waiter sees zero.
        if prev == 1 && self.waiters.load(Ordering::SeqCst) > 0 {
            log_trace!("barrier drained, waking waiters");
            self.futex_wake_all();
        }
    }
}

impl CountingBarrier for FutexBarrier {
    fn add(&self, n: u32) {
        if let Err(current) = self
            .count
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |c| c.checked_add(n))
        {
            over_register(current, n);
        }
    }

    fn wait(&self) {
        loop {
            if self.count.load(Ordering::SeqCst) == 0 {
                return;
            }

            self.waiters.fetch_add(1, Ordering::SeqCst);
            let observed = self.count.load(Ordering::SeqCst);
            if observed != 0 {
                match self.futex_wait(observed) {
                    // Woken, count moved (EAGAIN), or interrupted: re-check
                    Ok(()) | Err(Errno::EAGAIN) | Err(Errno::EINTR) => {}
                    Err(e) => {
                        log_warn!("futex wait failed: {}", e);
                        std::thread::yield_now();
                    }
                }
            }
            self.waiters.fetch_sub(1, Ordering::SeqCst);
        }
    }

    fn outstanding(&self) -> u32 {
        self.count.load(Ordering::SeqCst)
    }
}
