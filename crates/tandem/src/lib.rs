//! # tandem
//!
//! Three small flows built on the same worker task:
//!
//! - **Plugin**: open a shared library, resolve a named `extern "C" fn()`
//!   and call it
//! - **Fan-out**: launch N workers on OS threads, each bound to a completion
//!   barrier, and block until all of them have signalled
//! - **Deferred**: stack worker calls and run them newest-first when the
//!   enclosing function returns
//!
//! ## Quick Start
//!
//! ```ignore
//! use tandem::{deferred_example, fan_out_example, DemoConfig, StdoutSink};
//!
//! let config = DemoConfig::from_env();
//! fan_out_example(&config, &StdoutSink)?;
//! deferred_example(&config, &StdoutSink);
//! ```
//!
//! ## Layout
//!
//! ```text
//!   coordinator ──register()──▶ CompletionBarrier ◀──signal()── worker 1..N
//!        │                            ▲
//!        └───────────wait()───────────┘
//!
//!   DeferStack: push 5, 6, .. 10  ──drop──▶  run 10, 9, .. 5
//! ```

pub use tandem_core::{
    print,
    print_to,
    CompletionSignal,
    ConfigError,
    LineSink,
    LoadError,
    LookupError,
    PluginLoader,
    PluginModule,
    PluginSymbol,
    StdoutSink,
    TandemError,
    TandemResult,
    WorkerError,
};

pub use tandem_core::{log_debug, log_error, log_info, log_trace, log_warn};
pub use tandem_core::logging::{init as init_logging, set_log_level, LogLevel};

pub use tandem_core::{env_get, env_get_bool, env_get_opt, env_get_path, env_get_str};

pub use tandem_runtime::{
    fan_out,
    load_and_call,
    CaptureSink,
    CompletionBarrier,
    CondvarBarrier,
    Coordinator,
    CoordinatorState,
    CountingBarrier,
    DeferStack,
    DemoConfig,
    DynamicModule,
    NativeLoader,
};

/// Announce, then load the configured plugin and call its symbol
///
/// Returns the load or lookup error without calling anything if either
/// step fails.
pub fn plugin_example<L: PluginLoader>(loader: &L, config: &DemoConfig, sink: &dyn LineSink) -> TandemResult<()> {
    sink.write_line(&format!("Running a plugin's {} method", config.plugin_symbol));
    load_and_call(loader, &config.plugin_path, &config.plugin_symbol)
}

/// Message printed by fan-out worker `i`
pub fn fan_out_message(i: usize) -> String {
    format!("Hello World (Goroutine plus waitgroup {})!", i)
}

/// Message printed by deferred call `i`
pub fn deferred_message(i: usize) -> String {
    format!("Hello World (Deferred Thread {})!", i)
}

/// Launch `config.workers` workers against a fresh barrier and wait for all
///
/// Worker lines appear in nondeterministic order between the two banner
/// lines. Returns the number of workers drained.
pub fn fan_out_example(config: &DemoConfig, sink: &dyn LineSink) -> TandemResult<usize> {
    let n = config.workers;
    sink.write_line(&format!("Threading {} Print calls in worker threads", n));
    sink.write_line(&format!(
        "Creating {} worker threads (numbered 1-{}), then waiting for them to complete in nondeterministic order:",
        n, n
    ));

    let barrier = CompletionBarrier::new();
    let drained = fan_out(&barrier, sink, (1..=n).map(fan_out_message))?;

    sink.write_line("All worker threads have completed");
    Ok(drained)
}

/// Schedule one print per deferred index, to run newest-first on return
pub fn deferred_example(config: &DemoConfig, sink: &dyn LineSink) {
    let indices = config.deferred_indices();
    sink.write_line(&format!("Deferring {} Print calls", indices.clone().count()));

    let mut deferred = DeferStack::new();
    for i in indices.clone() {
        deferred.defer(move || print_to(sink, &deferred_message(i), None));
    }

    sink.write_line(&format!(
        "Deferred functions (numbered {}-{}) should now (upon parent function completion) execute in reverse order:",
        indices.start(),
        indices.end()
    ));
}
