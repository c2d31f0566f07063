//! Dynamic plugin loading
//!
//! A plugin is a shared library exporting zero-argument, zero-return C-ABI
//! functions. The loader opens it, resolves a symbol by name and hands back
//! a [`PluginSymbol`](tandem_core::PluginSymbol) whose lifetime is bound to
//! the open module, so a symbol can never be called after its library is
//! closed.

cfg_if::cfg_if! {
    if #[cfg(unix)] {
        mod unix;
        pub use unix::{DlopenLoader as NativeLoader, DynamicModule};
    } else {
        mod fallback;
        pub use fallback::{UnsupportedLoader as NativeLoader, NoModule as DynamicModule};
    }
}

use std::path::Path;
use tandem_core::{log_debug, PluginLoader, PluginModule, TandemResult};

/// Open `path` with `loader`, resolve `symbol`, and invoke it once
///
/// Nothing is invoked unless both the load and the lookup succeed.
pub fn load_and_call<L: PluginLoader>(loader: &L, path: &Path, symbol: &str) -> TandemResult<()> {
    let module = loader.load(path)?;
    let func = module.lookup(symbol)?;
    log_debug!("calling {} from {}", func.name(), module.path().display());
    func.call();
    Ok(())
}
