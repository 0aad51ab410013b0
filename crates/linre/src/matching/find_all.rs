//! # Find All

use crate::{
    compiler::CompiledPattern,
    encoding::Haystack,
    errors::LRResult,
    matching::{MatchResult, Matches},
};

/// One `findall` item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Found<'h> {
    /// The whole match (no groups), or group 1 (exactly one group).
    Single(&'h [u8]),

    /// Every group's text, for patterns with two or more groups.
    Tuple(Vec<&'h [u8]>),
}

impl<'h> Found<'h> {
    /// Build the item for a match.
    ///
    /// Non-participating groups yield empty text.
    pub fn from_match(m: &MatchResult<'h>) -> Self {
        match m.groups().as_slice() {
            [] => Self::Single(m.as_bytes()),
            [group] => Self::Single(group.unwrap_or_default()),
            groups => Self::Tuple(groups.iter().map(|g| g.unwrap_or_default()).collect()),
        }
    }
}

/// A lazy iterator of [`Found`] items; see [`CompiledPattern::findall`].
#[derive(Debug, Clone)]
pub struct FindAll<'p, 'h> {
    matches: Matches<'p, 'h>,
}

impl<'p, 'h> From<Matches<'p, 'h>> for FindAll<'p, 'h> {
    fn from(matches: Matches<'p, 'h>) -> Self {
        Self { matches }
    }
}

impl<'p, 'h> Iterator for FindAll<'p, 'h> {
    type Item = LRResult<Found<'h>>;

    fn next(&mut self) -> Option<Self::Item> {
        self.matches
            .next()
            .map(|m| m.map(|m| Found::from_match(&m)))
    }
}

impl CompiledPattern {
    /// Iterate over the text of every match in `haystack`.
    pub fn findall<'p, 'h, H>(
        &'p self,
        haystack: H,
    ) -> LRResult<FindAll<'p, 'h>>
    where
        H: Into<Haystack<'h>>,
    {
        self.findall_range(haystack, 0, None)
    }

    /// Iterate over the text of every match in `haystack[pos..endpos]`.
    pub fn findall_range<'p, 'h, H>(
        &'p self,
        haystack: H,
        pos: usize,
        endpos: Option<usize>,
    ) -> LRResult<FindAll<'p, 'h>>
    where
        H: Into<Haystack<'h>>,
    {
        self.finditer_range(haystack, pos, endpos)
            .map(FindAll::from)
    }
}
