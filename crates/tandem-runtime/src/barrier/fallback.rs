//! Portable completion barrier using std::sync::Condvar
//!
//! Used on platforms without futex support. Always compiled so both
//! implementations can be exercised side by side.

use super::{over_register, over_signal, CountingBarrier};
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use tandem_core::{log_trace, CompletionSignal};

#[derive(Debug, Default)]
pub struct CondvarBarrier {
    /// Outstanding workers
    count: Mutex<u32>,

    /// Notified when `count` reaches zero
    drained: Condvar,
}

impl CondvarBarrier {
    pub const fn new() -> Self {
        Self {
            count: Mutex::new(0),
            drained: Condvar::new(),
        }
    }

    /// The count stays consistent even if a holder panicked
    fn lock(&self) -> MutexGuard<'_, u32> {
        self.count.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl CompletionSignal for CondvarBarrier {
    fn signal(&self) {
        let mut count = self.lock();
        if *count == 0 {
            drop(count);
            over_signal();
        }
        *count -= 1;
        if *count == 0 {
            drop(count);
            log_trace!("barrier drained, notifying waiters");
            self.drained.notify_all();
        }
    }
}

impl CountingBarrier for CondvarBarrier {
    fn add(&self, n: u32) {
        let mut count = self.lock();
        match count.checked_add(n) {
            Some(next) => *count = next,
            None => {
                let current = *count;
                drop(count);
                over_register(current, n);
            }
        }
    }

    fn wait(&self) {
        let mut count = self.lock();
        while *count != 0 {
            count = self
                .drained
                .wait(count)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    fn outstanding(&self) -> u32 {
        *self.lock()
    }
}
