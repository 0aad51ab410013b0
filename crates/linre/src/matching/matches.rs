//! # Match Iteration

use std::borrow::Cow;

use crate::{
    compiler::{CompiledPattern, SearchMode},
    encoding::Haystack,
    errors::LRResult,
    matching::{MatchResult, search::SearchRange},
};

/// The resumable state of a [`Matches`] iteration.
///
/// Holds no borrows; a host can keep it between calls and resume with
/// [`CompiledPattern::resume`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchCursor {
    range: SearchRange,

    /// Engine byte offset of the next scan; `None` once exhausted.
    next_start: Option<usize>,

    /// Caller offset of `next_start`.
    next_pos: usize,
}

impl MatchCursor {
    /// Is the iteration exhausted?
    pub fn is_done(&self) -> bool {
        self.next_start.is_none()
    }

    /// Engine byte offset of the next scan, if any.
    pub fn next_start(&self) -> Option<usize> {
        self.next_start
    }

    /// Advance past the last match.
    ///
    /// Empty matches step one unit forward; others resume at their end.
    fn advance(
        &mut self,
        m: &MatchResult<'_>,
    ) -> LRResult<()> {
        let (Some((start, end)), Some((_, end_pos))) = (m.byte_span(0)?, m.span(0)?) else {
            self.next_start = None;
            return Ok(());
        };
        let (next, next_pos) = if start == end {
            (m.haystack().advance_past_empty(end), end_pos + 1)
        } else {
            (end, end_pos)
        };
        self.next_start = (next <= self.range.end).then_some(next);
        self.next_pos = next_pos;
        Ok(())
    }
}

/// An iterator over successive non-overlapping matches.
///
/// Borrows its pattern, or owns a clone of it. Yields `Err` at most once,
/// and then ends.
#[derive(Debug, Clone)]
pub struct Matches<'p, 'h> {
    pattern: Cow<'p, CompiledPattern>,
    haystack: Haystack<'h>,
    cursor: MatchCursor,
}

impl<'p, 'h> Matches<'p, 'h> {
    /// Iterate over every match in `haystack[pos..endpos]`.
    pub(crate) fn new(
        pattern: Cow<'p, CompiledPattern>,
        haystack: Haystack<'h>,
        pos: usize,
        endpos: Option<usize>,
    ) -> LRResult<Self> {
        let range = SearchRange::resolve(haystack, pos, endpos)?;
        let next_start = (range.start <= range.end).then_some(range.start);
        Ok(Self {
            pattern,
            haystack,
            cursor: MatchCursor {
                range,
                next_start,
                next_pos: range.pos,
            },
        })
    }

    /// The pattern being matched.
    pub fn pattern(&self) -> &CompiledPattern {
        &self.pattern
    }

    /// The subject being searched.
    pub fn haystack(&self) -> Haystack<'h> {
        self.haystack
    }

    /// The current iteration state.
    pub fn cursor(&self) -> MatchCursor {
        self.cursor
    }

    /// Detach from a borrowed pattern, by cloning it.
    pub fn into_owned(self) -> Matches<'static, 'h> {
        Matches {
            pattern: Cow::Owned(self.pattern.into_owned()),
            haystack: self.haystack,
            cursor: self.cursor,
        }
    }

    /// Pull the next match.
    ///
    /// ## Returns
    /// The next match; `Ok(None)` when exhausted.
    pub fn pull_next(&mut self) -> LRResult<Option<MatchResult<'h>>> {
        let Some(start) = self.cursor.next_start else {
            return Ok(None);
        };

        let found = self
            .pattern
            .search_range(
                self.haystack,
                (start, self.cursor.next_pos),
                &self.cursor.range,
                SearchMode::Unanchored,
            )
            .and_then(|found| {
                if let Some(m) = &found {
                    self.cursor.advance(m)?;
                }
                Ok(found)
            });
        match found {
            Ok(Some(m)) => Ok(Some(m)),
            Ok(None) => {
                self.cursor.next_start = None;
                Ok(None)
            }
            Err(err) => {
                self.cursor.next_start = None;
                Err(err)
            }
        }
    }
}

impl<'p, 'h> Iterator for Matches<'p, 'h> {
    type Item = LRResult<MatchResult<'h>>;

    fn next(&mut self) -> Option<Self::Item> {
        self.pull_next().transpose()
    }
}

impl CompiledPattern {
    /// Iterate over every match in `haystack`.
    pub fn finditer<'p, 'h, H>(
        &'p self,
        haystack: H,
    ) -> LRResult<Matches<'p, 'h>>
    where
        H: Into<Haystack<'h>>,
    {
        self.finditer_range(haystack, 0, None)
    }

    /// Iterate over every match in `haystack[pos..endpos]`.
    ///
    /// ## Arguments
    /// * `haystack` - the subject.
    /// * `pos` - caller offset to start searching at.
    /// * `endpos` - caller offset to stop at; `None` for the subject end.
    pub fn finditer_range<'p, 'h, H>(
        &'p self,
        haystack: H,
        pos: usize,
        endpos: Option<usize>,
    ) -> LRResult<Matches<'p, 'h>>
    where
        H: Into<Haystack<'h>>,
    {
        Matches::new(Cow::Borrowed(self), haystack.into(), pos, endpos)
    }

    /// Resume an iteration from a saved cursor.
    ///
    /// ## Arguments
    /// * `haystack` - the subject the cursor was taken over.
    /// * `cursor` - from [`Matches::cursor`].
    pub fn resume<'p, 'h, H>(
        &'p self,
        haystack: H,
        cursor: MatchCursor,
    ) -> Matches<'p, 'h>
    where
        H: Into<Haystack<'h>>,
    {
        Matches {
            pattern: Cow::Borrowed(self),
            haystack: haystack.into(),
            cursor,
        }
    }
}
