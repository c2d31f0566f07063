//! Loader for targets without a dynamic linker interface

use std::path::Path;
use tandem_core::{LoadError, LookupError, PluginLoader, PluginModule, PluginSymbol};

#[derive(Debug, Default, Clone, Copy)]
pub struct UnsupportedLoader;

impl UnsupportedLoader {
    pub fn new() -> Self {
        Self
    }
}

/// Never constructed: loading always fails on these targets
#[derive(Debug)]
pub enum NoModule {}

impl PluginLoader for UnsupportedLoader {
    type Module = NoModule;

    fn load(&self, _path: &Path) -> Result<NoModule, LoadError> {
        Err(LoadError::Unsupported)
    }
}

impl PluginModule for NoModule {
    fn path(&self) -> &Path {
        match *self {}
    }

    fn lookup(&self, _name: &str) -> Result<PluginSymbol<'_>, LookupError> {
        match *self {}
    }
}
