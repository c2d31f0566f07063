//! # tandem-runtime
//!
//! Platform-specific runtime pieces for tandem.
//!
//! This crate provides:
//! - Completion barriers (futex on Linux, Condvar elsewhere)
//! - The fan-out coordinator that launches workers on OS threads
//! - A scope-exit LIFO stack for deferred calls
//! - `dlopen`-based plugin loading
//! - A lock-free capture sink and the demo configuration

pub mod barrier;
pub mod capture;
pub mod config;
pub mod coordinator;
pub mod defer;
pub mod plugin;

pub use barrier::{CompletionBarrier, CondvarBarrier, CountingBarrier};
pub use capture::CaptureSink;
pub use config::DemoConfig;
pub use coordinator::{fan_out, Coordinator, CoordinatorState};
pub use defer::DeferStack;
pub use plugin::{load_and_call, DynamicModule, NativeLoader};
