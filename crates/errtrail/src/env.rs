//! Environment configuration
//!
//! Generic `env_get<T>` helpers plus the process-wide [`Config`] that
//! controls how locations and reasons are recorded.
//!
//! # Environment Variables
//!
//! - `ERRTRAIL_FULL_PATHS=1` - keep full file paths and function paths in locations
//! - `ERRTRAIL_MAX_REASON_ITEMS=<n>` - keep at most `n` items per annotation (0 = unlimited)
//! - `ERRTRAIL_RESOLVE_SYMBOLS=0` - skip the stack lookup that names the caller of
//!   non-macro constructors (they then record `unnamed`)
//!
//! # Usage
//!
//! ```ignore
//! use errtrail::env::{env_get, env_get_bool};
//!
//! let limit: usize = env_get("ERRTRAIL_MAX_REASON_ITEMS", 0);
//! let full: bool = env_get_bool("ERRTRAIL_FULL_PATHS", false);
//! ```

use std::str::FromStr;

use once_cell::sync::Lazy;

pub const ENV_FULL_PATHS: &str = "ERRTRAIL_FULL_PATHS";
pub const ENV_MAX_REASON_ITEMS: &str = "ERRTRAIL_MAX_REASON_ITEMS";
pub const ENV_RESOLVE_SYMBOLS: &str = "ERRTRAIL_RESOLVE_SYMBOLS";

/// Get environment variable parsed as type T, or return default
///
/// Works with any type that implements `FromStr`. Unset or unparsable
/// values yield the default.
#[inline]
pub fn env_get<T>(key: &str, default: T) -> T
where
    T: FromStr,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// Get environment variable as boolean
///
/// Accepts: "1", "true", "yes", "on" (case-insensitive) as true.
/// Any other value is false; unset returns the default.
#[inline]
pub fn env_get_bool(key: &str, default: bool) -> bool {
    match std::env::var(key) {
        Ok(val) => matches!(val.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on"),
        Err(_) => default,
    }
}

/// Get environment variable as string, or return default
#[inline]
pub fn env_get_str(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

// ============================================================================
// Config
// ============================================================================

/// Recording options, read from the environment once per process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Render locations with full file and function paths instead of
    /// their last segment.
    pub full_paths: bool,
    /// Upper bound on items kept per annotation. `0` keeps everything.
    pub max_reason_items: usize,
    /// Name the enclosing function of `#[track_caller]` sites from debug info.
    pub resolve_symbols: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self { full_paths: false, max_reason_items: 0, resolve_symbols: true }
    }
}

static CONFIG: Lazy<Config> = Lazy::new(Config::from_env);

impl Config {
    /// Build a fresh config from the current environment.
    pub fn from_env() -> Self {
        let base = Self::default();
        Self {
            full_paths: env_get_bool(ENV_FULL_PATHS, base.full_paths),
            max_reason_items: env_get(ENV_MAX_REASON_ITEMS, base.max_reason_items),
            resolve_symbols: env_get_bool(ENV_RESOLVE_SYMBOLS, base.resolve_symbols),
        }
    }

    /// The process-wide config. The environment is read on first use.
    #[inline]
    pub fn get() -> &'static Config {
        &CONFIG
    }

    /// Apply `max_reason_items` to one annotation.
    pub(crate) fn clamp_reason<T>(&self, mut items: Vec<T>) -> Vec<T> {
        if self.max_reason_items > 0 && items.len() > self.max_reason_items {
            items.truncate(self.max_reason_items);
        }
        items
    }
}

// ============================================================================
// Tests
// ============================================================================
