//! Error types for tandem

use core::fmt;
use std::path::PathBuf;

/// Result type for tandem operations
pub type TandemResult<T> = Result<T, TandemError>;

/// Errors that can occur while running the demonstration flows
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TandemError {
    /// Plugin module could not be opened
    Load(LoadError),

    /// Symbol could not be resolved in an opened module
    Lookup(LookupError),

    /// Worker thread error
    Worker(WorkerError),

    /// Invalid configuration
    Config(ConfigError),

    /// Operation not valid in the current coordinator state
    InvalidState(&'static str),
}

impl fmt::Display for TandemError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TandemError::Load(e) => write!(f, "plugin load error: {}", e),
            TandemError::Lookup(e) => write!(f, "symbol lookup error: {}", e),
            TandemError::Worker(e) => write!(f, "worker error: {}", e),
            TandemError::Config(e) => write!(f, "config error: {}", e),
            TandemError::InvalidState(what) => write!(f, "invalid state: {}", what),
        }
    }
}

impl std::error::Error for TandemError {}

/// Plugin load errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    /// No file exists at the given path
    NotFound(PathBuf),

    /// Path cannot be handed to the dynamic loader (interior NUL, not UTF-8)
    InvalidPath(PathBuf),

    /// The dynamic loader rejected the file
    Open { path: PathBuf, reason: String },

    /// Dynamic loading is not available on this platform
    Unsupported,
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::NotFound(path) => write!(f, "no such file: {}", path.display()),
            LoadError::InvalidPath(path) => write!(f, "invalid plugin path: {}", path.display()),
            LoadError::Open { path, reason } => {
                write!(f, "failed to open {}: {}", path.display(), reason)
            }
            LoadError::Unsupported => write!(f, "dynamic loading unsupported on this platform"),
        }
    }
}

impl std::error::Error for LoadError {}

impl From<LoadError> for TandemError {
    fn from(e: LoadError) -> Self {
        TandemError::Load(e)
    }
}

/// Symbol lookup errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    /// Symbol name is empty or contains an interior NUL
    InvalidName(String),

    /// Symbol is not exported by the module
    NotFound { symbol: String, reason: String },
}

impl fmt::Display for LookupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupError::InvalidName(name) => write!(f, "invalid symbol name {:?}", name),
            LookupError::NotFound { symbol, reason } => {
                write!(f, "symbol {} not found: {}", symbol, reason)
            }
        }
    }
}

impl std::error::Error for LookupError {}

impl From<LookupError> for TandemError {
    fn from(e: LookupError) -> Self {
        TandemError::Lookup(e)
    }
}

/// Worker thread related errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerError {
    /// OS refused to spawn the worker thread
    SpawnFailed(String),

    /// Worker thread panicked
    Panicked,
}

impl fmt::Display for WorkerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkerError::SpawnFailed(reason) => {
                write!(f, "failed to spawn worker thread: {}", reason)
            }
            WorkerError::Panicked => write!(f, "worker thread panicked"),
        }
    }
}

impl From<WorkerError> for TandemError {
    fn from(e: WorkerError) -> Self {
        TandemError::Worker(e)
    }
}

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Worker count above the supported maximum
    TooManyWorkers(usize),

    /// Plugin symbol name is empty
    EmptySymbol,

    /// Deferred range runs backwards
    InvalidDeferredRange { first: usize, last: usize },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::TooManyWorkers(n) => write!(f, "too many workers: {}", n),
            ConfigError::EmptySymbol => write!(f, "plugin symbol must not be empty"),
            ConfigError::InvalidDeferredRange { first, last } => {
                write!(f, "deferred range {}..={} is empty", first, last)
            }
        }
    }
}

impl From<ConfigError> for TandemError {
    fn from(e: ConfigError) -> Self {
        TandemError::Config(e)
    }
}
