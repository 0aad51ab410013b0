//! # Error Types

/// Errors from linre operations.
///
/// "No match" is never an error; searches return `Ok(None)` and iterators
/// end without yielding.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum LinreError {
    /// The pattern is malformed under both grammars.
    #[error("pattern syntax error{}: {message}", fmt_offset(.offset))]
    PatternSyntax {
        /// The engine diagnostic.
        message: String,

        /// Character offset of the error in the pattern, if known.
        offset: Option<usize>,
    },

    /// The pattern is valid, but uses constructs outside the linear-time
    /// grammar; and fallback is disabled.
    #[error("unsupported pattern: {message}")]
    UnsupportedPattern {
        /// The linear-time engine diagnostic.
        message: String,
    },

    /// The compiled program would exceed the memory budget.
    #[error("pattern too large: compiled program exceeds {limit} bytes")]
    PatternTooLarge {
        /// The memory budget which was exceeded.
        limit: usize,
    },

    /// Unknown flag bits were set.
    #[error("invalid flags: {bits:#x}")]
    InvalidFlags {
        /// The offending (unknown) bits.
        bits: u32,
    },

    /// Caller data can not be represented for the engine.
    #[error("encoding error: {0}")]
    Encoding(String),

    /// A substitution template is malformed, or names a group which doesn't exist.
    #[error("bad replacement template: {0}")]
    Replacement(String),

    /// A match result was asked for a group which doesn't exist.
    #[error("no such group: {0}")]
    NoSuchGroup(String),

    /// The backtracking delegate gave up while scanning.
    #[error("match failed: {0}")]
    MatchRuntime(String),
}

fn fmt_offset(offset: &Option<usize>) -> String {
    match offset {
        Some(offset) => format!(" at position {offset}"),
        None => String::new(),
    }
}

impl LinreError {
    /// Is this a compile-time error?
    pub fn is_compile_error(&self) -> bool {
        matches!(
            self,
            Self::PatternSyntax { .. }
                | Self::UnsupportedPattern { .. }
                | Self::PatternTooLarge { .. }
                | Self::InvalidFlags { .. }
        )
    }
}

/// Result type for linre operations.
pub type LRResult<T> = core::result::Result<T, LinreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = LinreError::PatternSyntax {
            message: "unclosed group".to_string(),
            offset: Some(3),
        };
        assert_eq!(
            err.to_string(),
            "pattern syntax error at position 3: unclosed group"
        );

        let err = LinreError::PatternSyntax {
            message: "unclosed group".to_string(),
            offset: None,
        };
        assert_eq!(err.to_string(), "pattern syntax error: unclosed group");

        assert_eq!(
            LinreError::InvalidFlags { bits: 0x400 }.to_string(),
            "invalid flags: 0x400"
        );
    }

    #[test]
    fn test_is_compile_error() {
        assert!(LinreError::PatternTooLarge { limit: 10 }.is_compile_error());
        assert!(!LinreError::Replacement("x".to_string()).is_compile_error());
        assert!(!LinreError::MatchRuntime("x".to_string()).is_compile_error());
    }
}
