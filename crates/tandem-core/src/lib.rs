//! # tandem-core
//!
//! Core types and traits for tandem.
//!
//! This crate is platform-agnostic and contains no OS-specific code.
//! Barriers, the plugin loader and the coordinator live in `tandem-runtime`.
//!
//! ## Modules
//!
//! - `task` - The worker task (`print`) and the stdout sink
//! - `traits` - Completion signal, line sink and plugin capability traits
//! - `error` - Error types
//! - `logging` - Leveled stderr logging macros
//! - `env` - Environment variable utilities

pub mod task;
pub mod traits;
pub mod error;
pub mod logging;
pub mod env;

pub use task::{print, print_to, StdoutSink};
pub use traits::{CompletionSignal, LineSink, PluginLoader, PluginModule, PluginSymbol};
pub use error::{ConfigError, LoadError, LookupError, TandemError, TandemResult, WorkerError};
pub use env::{env_get, env_get_bool, env_get_opt, env_get_path, env_get_str};

pub mod constants {
    /// Upper bound on workers a single fan-out may launch
    pub const MAX_WORKERS: usize = 1024;

    /// Plugin opened by the demo when nothing else is configured
    pub const DEFAULT_PLUGIN_PATH: &str = "./plugins/example_plugin.so";

    /// Symbol the demo resolves in the plugin
    pub const DEFAULT_PLUGIN_SYMBOL: &str = "Print";
}
