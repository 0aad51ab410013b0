//! # Compile Options

use crate::config::process_config;

/// Resource limits for compilation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompileOptions {
    /// Byte ceiling for the compiled program.
    ///
    /// Used as the linear-time engine's NFA size limit and lazy-DFA cache
    /// capacity, and as the backtracking delegate's inner size limits.
    pub max_memory: usize,

    /// Max backtracking steps per delegate match attempt.
    pub backtrack_limit: usize,
}

impl Default for CompileOptions {
    /// The process defaults; see [`crate::config`].
    fn default() -> Self {
        let config = process_config();
        Self {
            max_memory: config.max_memory,
            backtrack_limit: config.backtrack_limit,
        }
    }
}

impl CompileOptions {
    /// Set the memory budget.
    pub fn with_max_memory(
        self,
        max_memory: usize,
    ) -> Self {
        Self { max_memory, ..self }
    }

    /// Set the delegate's backtrack limit.
    pub fn with_backtrack_limit(
        self,
        backtrack_limit: usize,
    ) -> Self {
        Self {
            backtrack_limit,
            ..self
        }
    }
}
