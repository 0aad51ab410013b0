//! # Single Searches

use crate::{
    compiler::{CompiledPattern, SearchMode},
    encoding::Haystack,
    errors::LRResult,
    matching::MatchResult,
};

/// A caller range resolved against a subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SearchRange {
    /// Engine byte offset of `pos`.
    pub start: usize,

    /// Engine byte offset of `endpos`.
    pub end: usize,

    /// Caller start offset, clamped to the subject.
    pub pos: usize,

    /// Caller end offset, clamped to the subject.
    pub endpos: usize,
}

impl SearchRange {
    /// Resolve `[pos, endpos)` against `haystack`.
    ///
    /// Both offsets clamp to the subject; `endpos = None` is the subject end.
    pub(crate) fn resolve(
        haystack: Haystack<'_>,
        pos: usize,
        endpos: Option<usize>,
    ) -> LRResult<Self> {
        let start = haystack.to_engine_offset(pos);
        let end = match endpos {
            Some(endpos) => haystack.to_engine_offset(endpos),
            None => haystack.len(),
        };
        Ok(Self {
            start,
            end,
            pos: haystack.from_engine_offset(start)?,
            endpos: haystack.from_engine_offset(end)?,
        })
    }
}

impl CompiledPattern {
    /// Find the left-most match in `haystack[pos..endpos]`.
    ///
    /// `endpos` truncates the subject, so `$` and `\z` match there; `pos`
    /// does not, so `^` and `\A` can only match at the true start.
    ///
    /// ## Arguments
    /// * `haystack` - the subject.
    /// * `pos` - caller offset to start searching at.
    /// * `endpos` - caller offset to stop at; `None` for the subject end.
    ///
    /// ## Returns
    /// The match, if any.
    pub fn search<'h, H>(
        &self,
        haystack: H,
        pos: usize,
        endpos: Option<usize>,
    ) -> LRResult<Option<MatchResult<'h>>>
    where
        H: Into<Haystack<'h>>,
    {
        self.run(haystack.into(), pos, endpos, SearchMode::Unanchored)
    }

    /// Find a match starting exactly at `pos`.
    ///
    /// See [`CompiledPattern::search`].
    pub fn match_at<'h, H>(
        &self,
        haystack: H,
        pos: usize,
        endpos: Option<usize>,
    ) -> LRResult<Option<MatchResult<'h>>>
    where
        H: Into<Haystack<'h>>,
    {
        self.run(haystack.into(), pos, endpos, SearchMode::Start)
    }

    /// Find a match spanning exactly `haystack[pos..endpos]`.
    ///
    /// See [`CompiledPattern::search`].
    pub fn fullmatch<'h, H>(
        &self,
        haystack: H,
        pos: usize,
        endpos: Option<usize>,
    ) -> LRResult<Option<MatchResult<'h>>>
    where
        H: Into<Haystack<'h>>,
    {
        self.run(haystack.into(), pos, endpos, SearchMode::Full)
    }

    /// Does the pattern match anywhere in `haystack`?
    pub fn is_match<'h, H>(
        &self,
        haystack: H,
    ) -> LRResult<bool>
    where
        H: Into<Haystack<'h>>,
    {
        Ok(self.search(haystack, 0, None)?.is_some())
    }

    fn run<'h>(
        &self,
        haystack: Haystack<'h>,
        pos: usize,
        endpos: Option<usize>,
        mode: SearchMode,
    ) -> LRResult<Option<MatchResult<'h>>> {
        let range = SearchRange::resolve(haystack, pos, endpos)?;
        self.search_range(haystack, (range.start, range.pos), &range, mode)
    }

    /// Search within an already-resolved range.
    ///
    /// ## Arguments
    /// * `start` - the `(engine, caller)` offsets at which to start.
    pub(crate) fn search_range<'h>(
        &self,
        haystack: Haystack<'h>,
        start: (usize, usize),
        range: &SearchRange,
        mode: SearchMode,
    ) -> LRResult<Option<MatchResult<'h>>> {
        let origin = start;
        let start = start.0;
        let Some(spans) = self.find_spans(haystack, start, range.end, mode)? else {
            return Ok(None);
        };
        debug_assert!(
            spans[0].is_some_and(|(s, e)| start <= s && s <= e && e <= range.end),
            "match outside of search range"
        );
        Ok(Some(MatchResult::from_spans(
            haystack,
            spans,
            self.group_names().clone(),
            range.pos,
            range.endpos,
        )
        .with_origin(origin)))
    }
}
