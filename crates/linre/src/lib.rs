//! # `linre` Linear-Time Regular Expressions
//!
//! `linre` runs regular expressions on a linear-time automata engine, and
//! falls back transparently to a backtracking engine for the constructs the
//! linear-time grammar lacks (backreferences, look-around, atomic groups).
//!
//! Whether a fallback is allowed, and whether it is reported, is decided by
//! a [`FallbackPolicy`]; see [`fallback`].
//!
//! See:
//! * [`compiler`] to compile patterns.
//! * [`matching`] to search with them.
//! * [`substitution`] to replace matches, split, and escape.
//! * [`config`] for the environment tunables.
//!
//! ## Example
//!
//! ```rust
//! use linre::{FlagSet, compile};
//!
//! let pattern = compile(r"(?P<year>\d{4})-(?P<month>\d\d)", FlagSet::NONE).unwrap();
//! let m = pattern.search("due 2024-05", 0, None).unwrap().unwrap();
//! assert_eq!(m.group("year").unwrap(), Some(&b"2024"[..]));
//! assert_eq!(m.span(0).unwrap(), Some((4, 11)));
//!
//! let bumped = pattern.sub(br"\g<month>/\g<year>", "due 2024-05", 0).unwrap();
//! assert_eq!(bumped, b"due 05/2024");
//! ```
//!
//! ## Crate Features
#![doc = document_features::document_features!()]
#![warn(missing_docs, unused)]

pub mod api;
pub mod compiler;
pub mod config;
pub mod encoding;
pub mod errors;
pub mod fallback;
pub mod flags;
pub mod matching;
pub mod substitution;

#[doc(inline)]
pub use api::{
    AsPattern,
    findall,
    finditer,
    fullmatch,
    is_match,
    match_at,
    search,
    split,
    sub,
    subn,
};
#[doc(inline)]
pub use compiler::{CompileOptions, CompiledPattern, PatternCompiler, compile};
#[doc(inline)]
pub use encoding::Haystack;
#[doc(inline)]
pub use errors::{LRResult, LinreError};
#[doc(inline)]
pub use fallback::{FallbackMode, FallbackPolicy, set_fallback_notification};
#[doc(inline)]
pub use flags::FlagSet;
#[doc(inline)]
pub use matching::{Found, MatchResult};
#[doc(inline)]
pub use substitution::{Replacer, escape};
