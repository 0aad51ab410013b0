//! # Pattern Compilation
//!
//! [`PatternCompiler`] turns a pattern and [`FlagSet`](crate::FlagSet) into a
//! [`CompiledPattern`], choosing between the linear-time engine and the
//! backtracking delegate.
//!
//! ## Example
//!
//! ```rust
//! use linre::{FlagSet, compile};
//!
//! let pattern = compile(r"(?P<word>\w+)", FlagSet::UNICODE).unwrap();
//! assert!(!pattern.is_fallback());
//! assert_eq!(pattern.group_index("word"), Some(1));
//!
//! let pattern = compile(r"(\w)\1", FlagSet::UNICODE).unwrap();
//! assert!(pattern.is_fallback());
//! ```

mod compile_options;
#[doc(inline)]
pub use compile_options::*;

mod compiled_pattern;
#[doc(inline)]
pub use compiled_pattern::*;

mod group_names;
#[doc(inline)]
pub use group_names::*;

mod pattern_compiler;
#[doc(inline)]
pub use pattern_compiler::*;

mod pattern_hints;
#[doc(inline)]
pub use pattern_hints::*;

pub(crate) mod program;
#[doc(inline)]
pub use program::{Program, Spans};
