//! # Environment Configuration
//!
//! The memory budget, the delegate's backtrack limit, and the fallback mode
//! are the only tunables. Each can be overridden by an environment variable:
//!
//! * `LINRE_MAX_MEMORY` - compile memory budget, in bytes.
//! * `LINRE_BACKTRACK_LIMIT` - max backtracking steps per delegate match attempt.
//! * `LINRE_FALLBACK_MODE` - one of `silent`, `notify`, `raise`.

use core::str::FromStr;
use std::env;

use once_cell::sync::Lazy;

use crate::fallback::FallbackMode;

/// Default compile memory budget (8 MiB).
pub const DEFAULT_MAX_MEMORY: usize = 8 * 1024 * 1024;

/// Default backtracking step limit for the delegate engine.
pub const DEFAULT_BACKTRACK_LIMIT: usize = 1_000_000;

/// Env var overriding [`DEFAULT_MAX_MEMORY`].
pub const MAX_MEMORY_ENV: &str = "LINRE_MAX_MEMORY";

/// Env var overriding [`DEFAULT_BACKTRACK_LIMIT`].
pub const BACKTRACK_LIMIT_ENV: &str = "LINRE_BACKTRACK_LIMIT";

/// Env var selecting the initial process-wide [`FallbackMode`].
pub const FALLBACK_MODE_ENV: &str = "LINRE_FALLBACK_MODE";

/// Process tunables, resolved from the environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinreConfig {
    /// Compile memory budget, in bytes.
    pub max_memory: usize,

    /// Backtracking step limit for the delegate engine.
    pub backtrack_limit: usize,

    /// Initial fallback mode.
    pub fallback_mode: FallbackMode,
}

impl Default for LinreConfig {
    fn default() -> Self {
        Self {
            max_memory: DEFAULT_MAX_MEMORY,
            backtrack_limit: DEFAULT_BACKTRACK_LIMIT,
            fallback_mode: FallbackMode::default(),
        }
    }
}

impl LinreConfig {
    /// Resolve the config from the environment.
    ///
    /// Unset variables use the defaults; unparseable ones log a warning
    /// and use the defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Resolve the config from a key lookup function.
    ///
    /// ## Arguments
    /// * `lookup` - maps a variable name to its value, if set.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            max_memory: parse_var(&lookup, MAX_MEMORY_ENV)
                .filter(|&n: &usize| n > 0)
                .unwrap_or(defaults.max_memory),
            backtrack_limit: parse_var(&lookup, BACKTRACK_LIMIT_ENV)
                .filter(|&n: &usize| n > 0)
                .unwrap_or(defaults.backtrack_limit),
            fallback_mode: parse_var(&lookup, FALLBACK_MODE_ENV)
                .unwrap_or(defaults.fallback_mode),
        }
    }
}

static PROCESS_CONFIG: Lazy<LinreConfig> = Lazy::new(LinreConfig::from_env);

/// The process config; read from the environment once, on first use.
pub fn process_config() -> &'static LinreConfig {
    &PROCESS_CONFIG
}

fn parse_var<F, T>(
    lookup: &F,
    key: &str,
) -> Option<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    let value = lookup(key)?;
    match T::from_str(value.trim()) {
        Ok(v) => Some(v),
        Err(_) => {
            log::warn!("ignoring unparseable {key}={value:?}");
            None
        }
    }
}
