//! # Match Result

use std::sync::Arc;

use crate::{
    compiler::{GroupNames, Spans},
    encoding::Haystack,
    errors::{LRResult, LinreError},
    substitution::ReplacementTemplate,
};

/// A reference to a capture group; by index or by name.
pub trait GroupRef {
    /// Resolve to a group index.
    ///
    /// ## Arguments
    /// * `names` - the pattern's named groups.
    /// * `group_count` - the number of groups, excluding group 0.
    ///
    /// ## Returns
    /// The index; or [`LinreError::NoSuchGroup`].
    fn resolve(
        &self,
        names: &GroupNames,
        group_count: usize,
    ) -> LRResult<usize>;
}

impl GroupRef for usize {
    fn resolve(
        &self,
        _names: &GroupNames,
        group_count: usize,
    ) -> LRResult<usize> {
        if *self > group_count {
            return Err(LinreError::NoSuchGroup(self.to_string()));
        }
        Ok(*self)
    }
}

impl GroupRef for &str {
    fn resolve(
        &self,
        names: &GroupNames,
        _group_count: usize,
    ) -> LRResult<usize> {
        names
            .get(self)
            .ok_or_else(|| LinreError::NoSuchGroup(format!("{self:?}")))
    }
}

impl GroupRef for &String {
    fn resolve(
        &self,
        names: &GroupNames,
        group_count: usize,
    ) -> LRResult<usize> {
        self.as_str().resolve(names, group_count)
    }
}

/// One match, borrowing the subject it was found in.
///
/// Spans are held as engine byte offsets, and reported in the subject's
/// offset units (bytes, or characters for text).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult<'h> {
    haystack: Haystack<'h>,
    spans: Spans,
    names: Arc<GroupNames>,
    pos: usize,
    endpos: usize,

    /// A known `(engine, caller)` offset pair at or before the match.
    origin: (usize, usize),
}

impl<'h> MatchResult<'h> {
    /// Assemble a match.
    ///
    /// This is how hosts which can't hold a borrowed `MatchResult` rebuild
    /// one from the parts of another; see [`MatchResult::spans`].
    ///
    /// ## Arguments
    /// * `haystack` - the subject which was searched.
    /// * `spans` - per-group engine byte spans; item 0 must be `Some`.
    /// * `names` - the pattern's named groups.
    /// * `pos` - the caller start offset of the search.
    /// * `endpos` - the caller end offset of the search.
    pub fn from_spans(
        haystack: Haystack<'h>,
        spans: Spans,
        names: Arc<GroupNames>,
        pos: usize,
        endpos: usize,
    ) -> Self {
        Self {
            haystack,
            spans,
            names,
            pos,
            endpos,
            origin: (0, 0),
        }
    }

    /// Set the `(engine, caller)` offset pair from which caller offsets
    /// are counted; it must be at or before the match start.
    pub fn with_origin(
        self,
        origin: (usize, usize),
    ) -> Self {
        Self { origin, ..self }
    }

    /// See [`MatchResult::with_origin`].
    pub fn origin(&self) -> (usize, usize) {
        self.origin
    }

    /// The subject which was searched.
    pub fn haystack(&self) -> Haystack<'h> {
        self.haystack
    }

    /// The per-group engine byte spans; item 0 is the whole match.
    pub fn spans(&self) -> &Spans {
        &self.spans
    }

    /// The named groups of the pattern.
    pub fn names(&self) -> &Arc<GroupNames> {
        &self.names
    }

    /// The number of groups, excluding group 0.
    pub fn group_count(&self) -> usize {
        self.spans.len().saturating_sub(1)
    }

    /// The caller start offset of the search which produced this match.
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// The caller end offset of the search which produced this match.
    pub fn endpos(&self) -> usize {
        self.endpos
    }

    /// Resolve a group reference to an index.
    pub fn group_index<G: GroupRef>(
        &self,
        group: G,
    ) -> LRResult<usize> {
        group.resolve(&self.names, self.group_count())
    }

    /// The engine byte span of a group; `None` if it did not participate.
    pub fn byte_span<G: GroupRef>(
        &self,
        group: G,
    ) -> LRResult<Option<(usize, usize)>> {
        let idx = self.group_index(group)?;
        Ok(self.spans.get(idx).copied().flatten())
    }

    /// The text of a group.
    ///
    /// ## Returns
    /// `Ok(None)` for a group which did not participate; an empty slice
    /// for a group which matched the empty string.
    pub fn group<G: GroupRef>(
        &self,
        group: G,
    ) -> LRResult<Option<&'h [u8]>> {
        Ok(self.byte_span(group)?.map(|span| self.haystack.slice(span)))
    }

    /// The text of a group, as a `&str`.
    ///
    /// ## Returns
    /// As [`MatchResult::group`]; or [`LinreError::Encoding`] if the group
    /// text is not UTF-8.
    pub fn group_str<G: GroupRef>(
        &self,
        group: G,
    ) -> LRResult<Option<&'h str>> {
        match self.group(group)? {
            None => Ok(None),
            Some(bytes) => core::str::from_utf8(bytes)
                .map(Some)
                .map_err(|e| LinreError::Encoding(format!("group text is not UTF-8: {e}"))),
        }
    }

    /// The whole match.
    pub fn as_bytes(&self) -> &'h [u8] {
        self.spans
            .first()
            .copied()
            .flatten()
            .map(|span| self.haystack.slice(span))
            .unwrap_or_default()
    }

    /// The text of groups `1..=group_count`.
    pub fn groups(&self) -> Vec<Option<&'h [u8]>> {
        self.spans
            .iter()
            .skip(1)
            .map(|span| span.map(|span| self.haystack.slice(span)))
            .collect()
    }

    /// The text of each named group, in group order.
    pub fn groupdict(&self) -> Vec<(&str, Option<&'h [u8]>)> {
        self.names
            .iter()
            .map(|(name, idx)| {
                let text = self.spans.get(idx).copied().flatten();
                (name, text.map(|span| self.haystack.slice(span)))
            })
            .collect()
    }

    /// The caller span of a group; `None` if it did not participate.
    pub fn span<G: GroupRef>(
        &self,
        group: G,
    ) -> LRResult<Option<(usize, usize)>> {
        match self.byte_span(group)? {
            None => Ok(None),
            Some((start, end)) => {
                let start_pos = self.haystack.from_engine_offset_after(self.origin, start)?;
                let end_pos = self
                    .haystack
                    .from_engine_offset_after((start, start_pos), end)?;
                Ok(Some((start_pos, end_pos)))
            }
        }
    }

    /// The caller start offset of a group.
    pub fn start<G: GroupRef>(
        &self,
        group: G,
    ) -> LRResult<Option<usize>> {
        Ok(self.span(group)?.map(|(start, _)| start))
    }

    /// The caller end offset of a group.
    pub fn end<G: GroupRef>(
        &self,
        group: G,
    ) -> LRResult<Option<usize>> {
        Ok(self.span(group)?.map(|(_, end)| end))
    }

    /// The index of the last group to close.
    ///
    /// Groups are ranked by end offset. Of groups ending together, a later
    /// group closes after an earlier one, unless the earlier one encloses it.
    pub fn lastindex(&self) -> Option<usize> {
        let mut last: Option<(usize, usize)> = None;
        for (idx, span) in self.spans.iter().enumerate().skip(1) {
            let Some((_, end)) = *span else {
                continue;
            };
            last = match last {
                Some((best, best_end))
                    if best_end > end || (best_end == end && self.names.encloses(best, idx)) =>
                {
                    Some((best, best_end))
                }
                _ => Some((idx, end)),
            };
        }
        last.map(|(idx, _)| idx)
    }

    /// The name of the [`MatchResult::lastindex`] group, if it has one.
    pub fn lastgroup(&self) -> Option<&str> {
        self.lastindex().and_then(|idx| self.names.name_of(idx))
    }

    /// Expand a substitution template against this match.
    ///
    /// ## Arguments
    /// * `template` - the template; see [`ReplacementTemplate`].
    pub fn expand(
        &self,
        template: &[u8],
    ) -> LRResult<Vec<u8>> {
        let template = ReplacementTemplate::parse(template, &self.names, self.group_count())?;
        let mut buf = Vec::new();
        template.expand_into(self, &mut buf);
        Ok(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FlagSet, compile};

    #[test]
    fn test_groups() {
        let p = compile(r"(?P<year>\d{4})-(\d\d)(x)?", FlagSet::NONE).unwrap();
        let m = p.search("on 2024-05.", 0, None).unwrap().unwrap();

        assert_eq!(m.group(0).unwrap(), Some(&b"2024-05"[..]));
        assert_eq!(m.group("year").unwrap(), m.group(1).unwrap());
        assert_eq!(m.group_str(2).unwrap(), Some("05"));
        assert_eq!(m.group(3).unwrap(), None);
        assert_eq!(m.as_bytes(), b"2024-05");
        assert_eq!(
            m.groups(),
            vec![Some(&b"2024"[..]), Some(&b"05"[..]), None]
        );
        assert_eq!(m.groupdict(), vec![("year", Some(&b"2024"[..]))]);

        assert!(matches!(m.group(4), Err(LinreError::NoSuchGroup(_))));
        assert!(matches!(m.group("month"), Err(LinreError::NoSuchGroup(_))));
    }

    #[test]
    fn test_offsets_in_chars() {
        let p = compile(r"(\d+)", FlagSet::UNICODE).unwrap();
        let m = p.search("éé42", 0, None).unwrap().unwrap();
        assert_eq!(m.span(0).unwrap(), Some((2, 4)));
        assert_eq!(m.byte_span(0).unwrap(), Some((4, 6)));
        assert_eq!(m.start(1).unwrap(), Some(2));
        assert_eq!(m.end(1).unwrap(), Some(4));
        assert_eq!(m.pos(), 0);
        assert_eq!(m.endpos(), 4);
    }

    #[test]
    fn test_empty_group_vs_absent() {
        let p = compile(r"a(b*)(c)?", FlagSet::NONE).unwrap();
        let m = p.search(b"a", 0, None).unwrap().unwrap();
        assert_eq!(m.group(1).unwrap(), Some(&b""[..]));
        assert_eq!(m.span(1).unwrap(), Some((1, 1)));
        assert_eq!(m.group(2).unwrap(), None);
        assert_eq!(m.span(2).unwrap(), None);
    }

    #[test]
    fn test_lastindex() {
        let p = compile(r"(a)(b)?", FlagSet::NONE).unwrap();
        let m = p.search(b"a", 0, None).unwrap().unwrap();
        assert_eq!(m.lastindex(), Some(1));

        let p = compile(r"((a)b)", FlagSet::NONE).unwrap();
        let m = p.search(b"ab", 0, None).unwrap().unwrap();
        assert_eq!(m.lastindex(), Some(1));

        let p = compile(r"(?P<x>a)(?P<y>b)", FlagSet::NONE).unwrap();
        let m = p.search(b"ab", 0, None).unwrap().unwrap();
        assert_eq!(m.lastindex(), Some(2));
        assert_eq!(m.lastgroup(), Some("y"));

        // Group 2 closes last, at the same offset as group 1.
        let p = compile(r"(a)(b*)", FlagSet::NONE).unwrap();
        let m = p.search(b"a", 0, None).unwrap().unwrap();
        assert_eq!(m.lastindex(), Some(2));

        let p = compile(r"(a(b*))", FlagSet::NONE).unwrap();
        let m = p.search(b"a", 0, None).unwrap().unwrap();
        assert_eq!(m.lastindex(), Some(1));

        let p = compile(r"(a)((b*))", FlagSet::NONE).unwrap();
        let m = p.search(b"a", 0, None).unwrap().unwrap();
        assert_eq!(m.lastindex(), Some(2));

        let p = compile(r"(a)(b*)\2", FlagSet::NONE).unwrap();
        assert!(p.is_fallback());
        let m = p.search(b"a", 0, None).unwrap().unwrap();
        assert_eq!(m.lastindex(), Some(2));

        let p = compile(r"ab", FlagSet::NONE).unwrap();
        let m = p.search(b"ab", 0, None).unwrap().unwrap();
        assert_eq!(m.lastindex(), None);
        assert_eq!(m.lastgroup(), None);
    }

    #[test]
    fn test_origin_offsets() {
        let p = compile(r"b+", FlagSet::UNICODE).unwrap();
        let hay = "ééabbé";
        let m = p.search(hay, 2, None).unwrap().unwrap();
        assert_eq!(m.origin(), (4, 2));
        assert_eq!(m.span(0).unwrap(), Some((3, 5)));

        // An origin past the match start is ignored.
        let m = m.with_origin((8, 6));
        assert_eq!(m.span(0).unwrap(), Some((3, 5)));
    }

    #[test]
    fn test_expand() {
        let p = compile(r"(?P<k>\w+)=(\w+)", FlagSet::NONE).unwrap();
        let m = p.search(b"key=val", 0, None).unwrap().unwrap();
        assert_eq!(m.expand(br"\2:\g<k>").unwrap(), b"val:key");
        assert!(matches!(m.expand(br"\3"), Err(LinreError::Replacement(_))));
    }
}
