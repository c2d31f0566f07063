//! Example plugin loaded by the tandem demo.
//!
//! Build with `cargo build -p tandem-plugin` and copy the resulting
//! `libexample_plugin.so` to `./plugins/example_plugin.so` (or point
//! `TANDEM_PLUGIN_PATH` at it).
//!
//! Every exported entry point takes no arguments, returns nothing and uses
//! the C ABI.

use tandem_core::print;

/// Line printed by the exported `Print` symbol
pub const GREETING: &str = "Hello World (from plugin)!";

#[no_mangle]
#[allow(non_snake_case)]
pub extern "C" fn Print() {
    print(GREETING, None);
}
