//! Fan-out / fan-in coordinator
//!
//! The coordinator registers each worker with a completion barrier, starts
//! it on its own named OS thread, and later blocks in `drain()` until all of
//! them have signalled. Workers borrow the barrier and sink from the
//! enclosing `thread::scope`, so nothing here is global.
//!
//! ```text
//!   Running ──launch()──▶ Running ──drain()──▶ Drained
//! ```
//!
//! Completion order among workers is whatever the OS scheduler produces.

use crate::barrier::CountingBarrier;
use std::thread::{self, Scope, ScopedJoinHandle};
use tandem_core::{log_debug, log_info, print_to, LineSink, TandemError, TandemResult, WorkerError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinatorState {
    /// Workers may still be launched
    Running,

    /// `drain()` returned; every launched worker has signalled
    Drained,
}

pub struct Coordinator<'scope, 'env: 'scope, B: CountingBarrier> {
    scope: &'scope Scope<'scope, 'env>,
    barrier: &'env B,
    sink: &'env dyn LineSink,
    handles: Vec<ScopedJoinHandle<'scope, ()>>,
    state: CoordinatorState,
}

impl<'scope, 'env, B: CountingBarrier> Coordinator<'scope, 'env, B> {
    pub fn new(scope: &'scope Scope<'scope, 'env>, barrier: &'env B, sink: &'env dyn LineSink) -> Self {
        Self {
            scope,
            barrier,
            sink,
            handles: Vec::new(),
            state: CoordinatorState::Running,
        }
    }

    pub fn state(&self) -> CoordinatorState {
        self.state
    }

    /// Number of workers launched so far
    pub fn launched(&self) -> usize {
        self.handles.len()
    }

    /// Register one worker, then start it printing `message`
    ///
    /// If the thread cannot be spawned the registration is undone before
    /// returning, so the barrier count stays balanced.
    pub fn launch(&mut self, message: String) -> TandemResult<()> {
        if self.state == CoordinatorState::Drained {
            return Err(TandemError::InvalidState("launch after drain"));
        }

        let id = self.handles.len() + 1;
        let barrier = self.barrier;
        let sink = self.sink;

        self.barrier.register();
        let spawned = thread::Builder::new()
            .name(format!("tandem-worker-{}", id))
            .spawn_scoped(self.scope, move || {
                print_to(sink, &message, Some(barrier));
            });

        match spawned {
            Ok(handle) => {
                log_debug!("launched worker {}", id);
                self.handles.push(handle);
                Ok(())
            }
            Err(e) => {
                self.barrier.signal();
                Err(WorkerError::SpawnFailed(e.to_string()).into())
            }
        }
    }

    /// Block until every launched worker has signalled
    ///
    /// Returns the number of workers drained. A worker that panicked still
    /// signals (the worker task signals on unwind), and is reported here as
    /// `WorkerError::Panicked` once all others have finished.
    pub fn drain(&mut self) -> TandemResult<usize> {
        self.barrier.wait();
        self.state = CoordinatorState::Drained;

        let count = self.handles.len();
        let mut panicked = false;
        for handle in self.handles.drain(..) {
            panicked |= handle.join().is_err();
        }
        log_info!("drained {} workers", count);

        if panicked {
            return Err(WorkerError::Panicked.into());
        }
        Ok(count)
    }
}

/// Launch one worker per message against `barrier` and wait for all of them
pub fn fan_out<B, I>(barrier: &B, sink: &dyn LineSink, messages: I) -> TandemResult<usize>
where
    B: CountingBarrier,
    I: IntoIterator<Item = String>,
{
    thread::scope(|scope| {
        let mut coordinator = Coordinator::new(scope, barrier, sink);
        for message in messages {
            coordinator.launch(message)?;
        }
        coordinator.drain()
    })
}
