//! Scope-exit LIFO execution
//!
//! A `DeferStack` collects closures and runs them in reverse push order
//! when it is dropped (or when `run_now` is called), one at a time on the
//! current thread. A panicking closure does not stop the rest: the remaining
//! closures still run and the first panic is resumed afterwards.

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

type Deferred<'a> = Box<dyn FnOnce() + 'a>;

#[derive(Default)]
pub struct DeferStack<'a> {
    pending: Vec<Deferred<'a>>,
}

impl<'a> DeferStack<'a> {
    pub fn new() -> Self {
        Self { pending: Vec::new() }
    }

    /// Schedule `f` to run before every closure pushed earlier
    pub fn defer<F>(&mut self, f: F)
    where
        F: FnOnce() + 'a,
    {
        self.pending.push(Box::new(f));
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Run everything scheduled so far, newest first
    ///
    /// The stack stays usable afterwards.
    pub fn run_now(&mut self) {
        if let Some(payload) = self.unwind_all() {
            panic::resume_unwind(payload);
        }
    }

    fn unwind_all(&mut self) -> Option<Box<dyn Any + Send>> {
        let mut first_panic = None;
        while let Some(f) = self.pending.pop() {
            if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(f)) {
                first_panic.get_or_insert(payload);
            }
        }
        first_panic
    }
}

impl fmt::Debug for DeferStack<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeferStack")
            .field("pending", &self.pending.len())
            .finish()
    }
}

impl Drop for DeferStack<'_> {
    fn drop(&mut self) {
        let payload = self.unwind_all();
        // Re-raising while already unwinding would abort the process
        if let Some(payload) = payload {
            if !std::thread::panicking() {
                panic::resume_unwind(payload);
            }
        }
    }
}
