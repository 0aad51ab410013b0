//! # Searching
//!
//! Search operations on a [`CompiledPattern`](crate::CompiledPattern):
//!
//! * [`search`](crate::CompiledPattern::search) - the left-most match;
//! * [`match_at`](crate::CompiledPattern::match_at) - a match at a fixed start;
//! * [`fullmatch`](crate::CompiledPattern::fullmatch) - a match spanning the range;
//! * [`finditer`](crate::CompiledPattern::finditer) and
//!   [`findall`](crate::CompiledPattern::findall) - every non-overlapping match.
//!
//! After an empty match, the next scan starts one byte (one character,
//! for text) later; after any other match, at its end.

mod find_all;
#[doc(inline)]
pub use find_all::*;

mod match_result;
#[doc(inline)]
pub use match_result::*;

mod matches;
#[doc(inline)]
pub use matches::*;

pub(crate) mod search;
