//! tandem demo
//!
//! Runs the three flows in order: plugin call, fan-out/fan-in, deferred.
//! A plugin that cannot be loaded or resolved is fatal (exit status 1).
//!
//! # Environment Variables
//!
//! - `TANDEM_PLUGIN_PATH` - plugin library (default `./plugins/example_plugin.so`)
//! - `TANDEM_PLUGIN_SYMBOL` - symbol to call (default `Print`)
//! - `TANDEM_WORKERS` - fan-out worker count (default 5)
//! - `TANDEM_LOG_LEVEL=debug` - stderr log level (off, error, warn, info, debug, trace)
//! - `TANDEM_FLUSH_EPRINT=1` - flush stderr after every log line

use std::process;
use tandem::{deferred_example, fan_out_example, plugin_example};
use tandem::{init_logging, log_error, log_info, DemoConfig, LineSink, NativeLoader, StdoutSink, TandemError};

// cargo build -p tandem-plugin && cp target/debug/libexample_plugin.so plugins/example_plugin.so
// TANDEM_LOG_LEVEL=info cargo run -p tandem-demo
fn main() {
    init_logging();

    let config = DemoConfig::from_env();
    if let Err(e) = config.validate() {
        log_error!("{}", TandemError::from(e));
        process::exit(1);
    }
    log_info!("config: {:?}", config);

    let stdout = StdoutSink;

    if let Err(e) = plugin_example(&NativeLoader::new(), &config, &stdout) {
        match &e {
            TandemError::Lookup(_) => stdout.write_line(&format!(
                "Failed to lookup symbol with name {}: {}",
                config.plugin_symbol, e
            )),
            _ => stdout.write_line(&format!(
                "Failed to load plugin {}: {}",
                config.plugin_path.display(),
                e
            )),
        }
        log_error!("{}", e);
        process::exit(1);
    }

    if let Err(e) = fan_out_example(&config, &stdout) {
        log_error!("{}", e);
        process::exit(1);
    }

    deferred_example(&config, &stdout);
}
