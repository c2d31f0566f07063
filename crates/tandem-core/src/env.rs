//! Environment variable helpers
//!
//! All tandem knobs are read through these so that an unset or
//! unparseable variable always falls back to the compiled default.
//!
//! ```ignore
//! use tandem_core::env::{env_get, env_get_path};
//!
//! let workers: usize = env_get("TANDEM_WORKERS", 5);
//! let plugin = env_get_path("TANDEM_PLUGIN_PATH", "./plugins/example_plugin.so");
//! ```

use std::path::PathBuf;
use std::str::FromStr;

/// Parse `key` as `T`, or return `default` when unset or unparseable
#[inline]
pub fn env_get<T>(key: &str, default: T) -> T
where
    T: FromStr,
{
    env_get_opt(key).unwrap_or(default)
}

/// Boolean variable: "1", "true", "yes", "on" (any case) are true,
/// any other value is false, unset returns `default`
#[inline]
pub fn env_get_bool(key: &str, default: bool) -> bool {
    match std::env::var(key) {
        Ok(val) => matches!(val.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on"),
        Err(_) => default,
    }
}

/// `Some(T)` only if the variable is set and parses
#[inline]
pub fn env_get_opt<T>(key: &str) -> Option<T>
where
    T: FromStr,
{
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

/// Raw string value, or `default`. Empty strings count as unset.
#[inline]
pub fn env_get_str(key: &str, default: &str) -> String {
    match std::env::var(key) {
        Ok(val) if !val.is_empty() => val,
        _ => default.to_string(),
    }
}

/// Filesystem path; non-UTF-8 values are accepted as-is
#[inline]
pub fn env_get_path(key: &str, default: &str) -> PathBuf {
    match std::env::var_os(key) {
        Some(val) if !val.is_empty() => PathBuf::from(val),
        _ => PathBuf::from(default),
    }
}
