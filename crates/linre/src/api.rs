//! # Module-Level Functions
//!
//! One-shot forms of the [`CompiledPattern`] operations, which accept either
//! a compiled pattern or a pattern source. Sources are compiled per call,
//! with the process-wide policy and default options; there is no cache.

use std::borrow::Cow;

use crate::{
    compiler::{CompiledPattern, compile},
    encoding::Haystack,
    errors::{LRResult, LinreError},
    flags::FlagSet,
    matching::{FindAll, MatchResult, Matches},
    substitution::Replacer,
};

/// A compiled pattern, or a pattern source to compile.
pub trait AsPattern {
    /// Resolve to a compiled pattern.
    ///
    /// ## Arguments
    /// * `flags` - compile flags for a source; must be empty for a
    ///   compiled pattern, which has its own.
    fn as_pattern(
        &self,
        flags: FlagSet,
    ) -> LRResult<Cow<'_, CompiledPattern>>;
}

impl AsPattern for CompiledPattern {
    fn as_pattern(
        &self,
        flags: FlagSet,
    ) -> LRResult<Cow<'_, CompiledPattern>> {
        if !flags.is_empty() {
            return Err(LinreError::InvalidFlags { bits: flags.bits() });
        }
        Ok(Cow::Borrowed(self))
    }
}

impl AsPattern for str {
    fn as_pattern(
        &self,
        flags: FlagSet,
    ) -> LRResult<Cow<'_, CompiledPattern>> {
        compile(self, flags).map(Cow::Owned)
    }
}

impl AsPattern for [u8] {
    fn as_pattern(
        &self,
        flags: FlagSet,
    ) -> LRResult<Cow<'_, CompiledPattern>> {
        compile(self, flags).map(Cow::Owned)
    }
}

/// See [`CompiledPattern::search`].
pub fn search<'h, P, H>(
    pattern: &P,
    haystack: H,
    flags: FlagSet,
) -> LRResult<Option<MatchResult<'h>>>
where
    P: AsPattern + ?Sized,
    H: Into<Haystack<'h>>,
{
    pattern.as_pattern(flags)?.search(haystack, 0, None)
}

/// See [`CompiledPattern::match_at`].
pub fn match_at<'h, P, H>(
    pattern: &P,
    haystack: H,
    flags: FlagSet,
) -> LRResult<Option<MatchResult<'h>>>
where
    P: AsPattern + ?Sized,
    H: Into<Haystack<'h>>,
{
    pattern.as_pattern(flags)?.match_at(haystack, 0, None)
}

/// See [`CompiledPattern::fullmatch`].
pub fn fullmatch<'h, P, H>(
    pattern: &P,
    haystack: H,
    flags: FlagSet,
) -> LRResult<Option<MatchResult<'h>>>
where
    P: AsPattern + ?Sized,
    H: Into<Haystack<'h>>,
{
    pattern.as_pattern(flags)?.fullmatch(haystack, 0, None)
}

/// Does `pattern` match anywhere in `haystack`?
pub fn is_match<'h, P, H>(
    pattern: &P,
    haystack: H,
    flags: FlagSet,
) -> LRResult<bool>
where
    P: AsPattern + ?Sized,
    H: Into<Haystack<'h>>,
{
    pattern.as_pattern(flags)?.is_match(haystack)
}

/// Iterate over every match in `haystack`; see [`CompiledPattern::finditer`].
///
/// A source is compiled once, and owned by the iterator.
pub fn finditer<'p, 'h, P, H>(
    pattern: &'p P,
    haystack: H,
    flags: FlagSet,
) -> LRResult<Matches<'p, 'h>>
where
    P: AsPattern + ?Sized,
    H: Into<Haystack<'h>>,
{
    Matches::new(pattern.as_pattern(flags)?, haystack.into(), 0, None)
}

/// Iterate over the text of every match; see [`CompiledPattern::findall`].
pub fn findall<'p, 'h, P, H>(
    pattern: &'p P,
    haystack: H,
    flags: FlagSet,
) -> LRResult<FindAll<'p, 'h>>
where
    P: AsPattern + ?Sized,
    H: Into<Haystack<'h>>,
{
    finditer(pattern, haystack, flags).map(FindAll::from)
}

/// See [`CompiledPattern::split`].
pub fn split<'h, P, H>(
    pattern: &P,
    haystack: H,
    max_splits: usize,
    flags: FlagSet,
) -> LRResult<Vec<Option<&'h [u8]>>>
where
    P: AsPattern + ?Sized,
    H: Into<Haystack<'h>>,
{
    pattern.as_pattern(flags)?.split(haystack, max_splits)
}

/// See [`CompiledPattern::sub`].
pub fn sub<'h, P, R, H>(
    pattern: &P,
    repl: R,
    haystack: H,
    count: usize,
    flags: FlagSet,
) -> LRResult<Vec<u8>>
where
    P: AsPattern + ?Sized,
    R: Replacer,
    H: Into<Haystack<'h>>,
{
    pattern.as_pattern(flags)?.sub(repl, haystack, count)
}

/// See [`CompiledPattern::subn`].
pub fn subn<'h, P, R, H>(
    pattern: &P,
    repl: R,
    haystack: H,
    count: usize,
    flags: FlagSet,
) -> LRResult<(Vec<u8>, usize)>
where
    P: AsPattern + ?Sized,
    R: Replacer,
    H: Into<Haystack<'h>>,
{
    pattern.as_pattern(flags)?.subn(repl, haystack, count)
}
