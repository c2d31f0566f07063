//! Capability traits
//!
//! These are the seams between the platform-agnostic core and the
//! runtime: workers only ever see a [`CompletionSignal`] and a
//! [`LineSink`], and plugin loading is reached through [`PluginLoader`].

use crate::error::{LoadError, LookupError};
use core::fmt;
use core::marker::PhantomData;
use std::path::Path;
use std::sync::Arc;

/// The one operation a worker may perform on a completion barrier
///
/// Kept separate from the barrier itself so tests can count calls with a
/// mock and workers cannot register or wait.
pub trait CompletionSignal: Send + Sync {
    /// Report that one outstanding worker has finished
    fn signal(&self);
}

impl<T: CompletionSignal + ?Sized> CompletionSignal for Arc<T> {
    fn signal(&self) {
        (**self).signal()
    }
}

impl<T: CompletionSignal + ?Sized> CompletionSignal for &T {
    fn signal(&self) {
        (**self).signal()
    }
}

/// Destination for worker output, one whole line per call
///
/// Implementations must not tear a line: concurrent callers may interleave
/// lines in any order, but never bytes within a line.
pub trait LineSink: Send + Sync {
    fn write_line(&self, line: &str);
}

impl<T: LineSink + ?Sized> LineSink for Arc<T> {
    fn write_line(&self, line: &str) {
        (**self).write_line(line)
    }
}

/// Opens dynamically loadable modules
pub trait PluginLoader {
    type Module: PluginModule;

    fn load(&self, path: &Path) -> Result<Self::Module, LoadError>;
}

/// An opened module that can resolve named symbols
pub trait PluginModule {
    /// Path the module was opened from
    fn path(&self) -> &Path;

    /// Resolve `name` as a zero-argument, zero-return C-ABI function
    fn lookup(&self, name: &str) -> Result<PluginSymbol<'_>, LookupError>;
}

/// A resolved `extern "C" fn()` that cannot outlive its module
#[derive(Clone)]
pub struct PluginSymbol<'lib> {
    name: String,
    func: unsafe extern "C" fn(),
    _module: PhantomData<&'lib ()>,
}

impl<'lib> PluginSymbol<'lib> {
    /// Wrap a resolved function pointer
    ///
    /// # Safety
    ///
    /// `func` must really be a function taking no arguments and returning
    /// nothing under the C ABI, and it must stay mapped for `'lib`.
    pub unsafe fn new(name: impl Into<String>, func: unsafe extern "C" fn()) -> Self {
        Self {
            name: name.into(),
            func,
            _module: PhantomData,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Invoke the symbol
    pub fn call(&self) {
        // Safety: signature and lifetime were vouched for in `new`
        unsafe { (self.func)() }
    }
}

impl fmt::Debug for PluginSymbol<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginSymbol")
            .field("name", &self.name)
            .field("addr", &(self.func as *const ()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    static CALLS: AtomicUsize = AtomicUsize::new(0);

    extern "C" fn bump() {
        CALLS.fetch_add(1, Ordering::SeqCst);
    }

    #[test]
    fn test_symbol_call() {
        let sym = unsafe { PluginSymbol::new("bump", bump) };
        assert_eq!(sym.name(), "bump");

        let before = CALLS.load(Ordering::SeqCst);
        sym.call();
        sym.call();
        assert_eq!(CALLS.load(Ordering::SeqCst), before + 2);
    }

    struct Counter(AtomicUsize);

    impl CompletionSignal for Counter {
        fn signal(&self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_signal_through_arc_and_ref() {
        let counter = Arc::new(Counter(AtomicUsize::new(0)));
        counter.signal();
        (&*counter).signal();
        let as_dyn: &dyn CompletionSignal = &counter;
        as_dyn.signal();
        assert_eq!(counter.0.load(Ordering::SeqCst), 3);
    }
}
