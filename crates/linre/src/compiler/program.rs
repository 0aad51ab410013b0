//! # Engine Programs
//! This module provides mechanisms to mix linear-time and backtracking programs.

use core::fmt::Debug;

use regex_automata::{Anchored, Input, MatchKind, PatternID, meta, util::syntax};

use crate::{
    compiler::CompileOptions,
    encoding::{ByteTextView, Haystack},
    errors::{LRResult, LinreError},
    flags::FlagSet,
};

/// Per-group spans of one match; index 0 is the whole match.
///
/// `None` marks a group which did not participate.
pub type Spans = Vec<Option<(usize, usize)>>;

/// Where a search must start its match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Anchor {
    /// Anywhere at or after the start offset.
    Unanchored,

    /// Exactly at the start offset.
    Start,
}

/// Build error wrapper for the two engines.
#[non_exhaustive]
#[derive(Debug)]
pub(crate) enum EngineError {
    /// Error from the linear-time engine.
    Linear(Box<meta::BuildError>),

    /// Error from the backtracking delegate.
    Backtracking(Box<fancy_regex::Error>),
}

impl From<meta::BuildError> for EngineError {
    fn from(err: meta::BuildError) -> Self {
        Self::Linear(err.into())
    }
}

impl From<fancy_regex::Error> for EngineError {
    fn from(err: fancy_regex::Error) -> Self {
        Self::Backtracking(err.into())
    }
}

impl core::fmt::Display for EngineError {
    fn fmt(
        &self,
        f: &mut core::fmt::Formatter<'_>,
    ) -> core::fmt::Result {
        match self {
            Self::Linear(err) => match err.syntax_error() {
                Some(syntax_err) => core::fmt::Display::fmt(syntax_err, f),
                None => core::fmt::Display::fmt(err, f),
            },
            Self::Backtracking(err) => core::fmt::Display::fmt(err, f),
        }
    }
}

/// The syntax config of the linear-time engine for `flags`.
pub(crate) fn linear_syntax_config(flags: FlagSet) -> syntax::Config {
    syntax::Config::new()
        .case_insensitive(flags.contains(FlagSet::IGNORECASE))
        .multi_line(flags.contains(FlagSet::MULTILINE))
        .dot_matches_new_line(flags.contains(FlagSet::DOTALL))
        .ignore_whitespace(flags.contains(FlagSet::VERBOSE))
        .unicode(flags.contains(FlagSet::UNICODE))
        .utf8(false)
}

/// Wrap `pattern` so that it must also match through to the end of the haystack.
///
/// A verbose pattern may end in a comment, which would swallow the closing
/// paren; `terminate` ends the pattern with a newline first.
pub(crate) fn full_match_source(
    pattern: &str,
    terminate: bool,
) -> String {
    let sep = if terminate { "\n" } else { "" };
    format!("(?:{pattern}{sep})\\z")
}

/// A compiled program, from one of the two engines.
#[derive(Clone)]
pub enum Program {
    /// Linear-time `regex_automata::meta::Regex`.
    Linear(meta::Regex),

    /// Backtracking `fancy_regex::Regex`.
    Backtracking(fancy_regex::Regex),
}

impl Debug for Program {
    fn fmt(
        &self,
        f: &mut core::fmt::Formatter<'_>,
    ) -> core::fmt::Result {
        match self {
            Self::Linear(_) => write!(f, "Program::Linear"),
            Self::Backtracking(re) => write!(f, "Program::Backtracking({:?})", re.as_str()),
        }
    }
}

impl From<meta::Regex> for Program {
    fn from(regex: meta::Regex) -> Self {
        Self::Linear(regex)
    }
}

impl From<fancy_regex::Regex> for Program {
    fn from(regex: fancy_regex::Regex) -> Self {
        Self::Backtracking(regex)
    }
}

impl Program {
    /// Compile with the linear-time engine.
    pub(crate) fn build_linear(
        pattern: &str,
        flags: FlagSet,
        options: &CompileOptions,
    ) -> Result<Self, EngineError> {
        let metac = meta::Config::new()
            .match_kind(MatchKind::LeftmostFirst)
            .utf8_empty(flags.contains(FlagSet::UNICODE))
            .nfa_size_limit(Some(options.max_memory))
            .hybrid_cache_capacity(options.max_memory);

        meta::Builder::new()
            .configure(metac)
            .syntax(linear_syntax_config(flags))
            .build(pattern)
            .map(Self::from)
            .map_err(EngineError::from)
    }

    /// Compile with the backtracking delegate.
    ///
    /// Flags are applied as an inline-flag prefix; see [`FlagSet::inline_prefix`].
    pub(crate) fn build_backtracking(
        pattern: &str,
        flags: FlagSet,
        options: &CompileOptions,
    ) -> Result<Self, EngineError> {
        let source = format!("{}{}", flags.inline_prefix(), pattern);
        fancy_regex::RegexBuilder::new(&source)
            .backtrack_limit(options.backtrack_limit)
            .delegate_size_limit(options.max_memory)
            .delegate_dfa_size_limit(options.max_memory)
            .build()
            .map(Self::from)
            .map_err(EngineError::from)
    }

    /// Compile a sibling program with the same engine.
    pub(crate) fn build_like(
        &self,
        pattern: &str,
        flags: FlagSet,
        options: &CompileOptions,
    ) -> Result<Self, EngineError> {
        match self {
            Self::Linear(_) => Self::build_linear(pattern, flags, options),
            Self::Backtracking(_) => Self::build_backtracking(pattern, flags, options),
        }
    }

    /// Is this `Linear`?
    ///
    /// ## Returns
    /// `true` if it wraps a linear-time program, `false` otherwise.
    pub fn is_linear(&self) -> bool {
        match self {
            Self::Linear(_) => true,
            Self::Backtracking(_) => false,
        }
    }

    /// Is this `Backtracking`?
    ///
    /// ## Returns
    /// `true` if it wraps a backtracking program, `false` otherwise.
    pub fn is_backtracking(&self) -> bool {
        !self.is_linear()
    }

    /// The number of capture slots, including group 0.
    pub fn captures_len(&self) -> usize {
        match self {
            Self::Linear(re) => re.captures_len(),
            Self::Backtracking(re) => re.captures_len(),
        }
    }

    /// Per-group names, where item `i` names group `i`.
    pub fn capture_names(&self) -> Vec<Option<&str>> {
        match self {
            Self::Linear(re) => re.group_info().pattern_names(PatternID::ZERO).collect(),
            Self::Backtracking(re) => re.capture_names().collect(),
        }
    }

    /// Find the left-most match in `haystack[start..end]`.
    ///
    /// The haystack is truncated at `end`; but not cut at `start`, so
    /// look-behind assertions see what precedes `start`.
    ///
    /// ## Arguments
    /// * `haystack` - the subject.
    /// * `start` - the byte offset at which to start searching.
    /// * `end` - the byte offset at which the subject ends.
    /// * `anchor` - must the match begin at `start`?
    ///
    /// ## Returns
    /// The per-group spans of the match, if there is one.
    pub(crate) fn find_spans(
        &self,
        haystack: Haystack<'_>,
        start: usize,
        end: usize,
        anchor: Anchor,
    ) -> LRResult<Option<Spans>> {
        match self {
            Self::Linear(re) => Ok(linear_find(re, haystack.as_bytes(), start, end, anchor)),
            Self::Backtracking(re) => backtracking_find(re, haystack.as_text()?, start, end, anchor),
        }
    }

    /// As [`Program::find_spans`], over bytes read one character per byte;
    /// see [`crate::encoding::byte_text`].
    ///
    /// A linear program scans the bytes directly.
    pub(crate) fn find_byte_text_spans(
        &self,
        bytes: &[u8],
        start: usize,
        end: usize,
        anchor: Anchor,
    ) -> LRResult<Option<Spans>> {
        let re = match self {
            Self::Linear(re) => return Ok(linear_find(re, bytes, start, end, anchor)),
            Self::Backtracking(re) => re,
        };
        let end = end.min(bytes.len());
        if start > end {
            return Ok(None);
        }
        let view = ByteTextView::new(&bytes[..end]);
        let text = view.as_str();
        let spans = backtracking_find(re, text, view.to_text_offset(start), text.len(), anchor)?;
        Ok(spans.map(|spans| {
            spans
                .into_iter()
                .map(|span| span.map(|(s, e)| (view.to_byte_offset(s), view.to_byte_offset(e))))
                .collect()
        }))
    }
}

fn linear_find(
    re: &meta::Regex,
    bytes: &[u8],
    start: usize,
    end: usize,
    anchor: Anchor,
) -> Option<Spans> {
    let end = end.min(bytes.len());
    if start > end {
        return None;
    }
    let anchored = match anchor {
        Anchor::Unanchored => Anchored::No,
        Anchor::Start => Anchored::Yes,
    };
    let input = Input::new(&bytes[..end]).span(start..end).anchored(anchored);

    let mut caps = re.create_captures();
    re.search_captures(&input, &mut caps);
    if !caps.is_match() {
        return None;
    }

    Some(
        (0..re.captures_len())
            .map(|group| caps.get_group(group).map(|span| (span.start, span.end)))
            .collect(),
    )
}

fn backtracking_find(
    re: &fancy_regex::Regex,
    text: &str,
    start: usize,
    end: usize,
    anchor: Anchor,
) -> LRResult<Option<Spans>> {
    let end = end.min(text.len());
    if start > end {
        return Ok(None);
    }
    let Some(text) = text.get(..end) else {
        return Err(boundary_error(end));
    };
    if !text.is_char_boundary(start) {
        return Err(boundary_error(start));
    }

    let caps = re
        .captures_from_pos(text, start)
        .map_err(|e| LinreError::MatchRuntime(e.to_string()))?;
    let Some(caps) = caps else {
        return Ok(None);
    };

    let spans: Spans = (0..re.captures_len())
        .map(|group| caps.get(group).map(|m| (m.start(), m.end())))
        .collect();

    // A left-most search from `start` finds a match at `start` iff one exists.
    if anchor == Anchor::Start && spans.first().copied().flatten().map(|s| s.0) != Some(start) {
        return Ok(None);
    }

    Ok(Some(spans))
}

fn boundary_error(offset: usize) -> LinreError {
    LinreError::Encoding(format!(
        "offset {offset} is not a character boundary; the backtracking engine scans text"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::byte_pattern_source;

    fn opts() -> CompileOptions {
        CompileOptions::default()
    }

    #[test]
    fn test_linear_program() {
        let p = Program::build_linear(r"(\w+)@(?P<host>\w+)", FlagSet::NONE, &opts()).unwrap();
        assert!(p.is_linear());
        assert!(!p.is_backtracking());
        assert_eq!(p.captures_len(), 3);
        assert_eq!(p.capture_names(), vec![None, None, Some("host")]);

        let h = Haystack::from(b"mail bob@home now");
        assert_eq!(
            p.find_spans(h, 0, h.len(), Anchor::Unanchored).unwrap(),
            Some(vec![Some((5, 13)), Some((5, 8)), Some((9, 13))])
        );
        assert_eq!(p.find_spans(h, 0, h.len(), Anchor::Start).unwrap(), None);
        assert_eq!(p.find_spans(h, 6, h.len(), Anchor::Start).unwrap().unwrap()[0], Some((6, 13)));
        assert_eq!(p.find_spans(h, 0, 10, Anchor::Unanchored).unwrap().unwrap()[0], Some((5, 10)));
    }

    #[test]
    fn test_backtracking_program() {
        let p = Program::build_backtracking(r"(a)\1", FlagSet::NONE, &opts()).unwrap();
        assert!(p.is_backtracking());
        assert_eq!(p.captures_len(), 2);

        let h = Haystack::from("xaab");
        assert_eq!(
            p.find_spans(h, 0, h.len(), Anchor::Unanchored).unwrap(),
            Some(vec![Some((1, 3)), Some((1, 2))])
        );
        assert_eq!(p.find_spans(h, 0, h.len(), Anchor::Start).unwrap(), None);
        assert!(p.find_spans(h, 1, h.len(), Anchor::Start).unwrap().is_some());
        assert_eq!(p.find_spans(h, 0, 2, Anchor::Unanchored).unwrap(), None);
    }

    #[test]
    fn test_backtracking_requires_utf8() {
        let p = Program::build_backtracking(r"(a)\1", FlagSet::NONE, &opts()).unwrap();
        let bad: &[u8] = b"aa\xff";
        assert!(matches!(
            p.find_spans(Haystack::from(bad), 0, 3, Anchor::Unanchored),
            Err(LinreError::Encoding(_))
        ));
    }

    #[test]
    fn test_linear_rejects_backreference() {
        let err = Program::build_linear(r"(a)\1", FlagSet::NONE, &opts()).unwrap_err();
        assert!(matches!(err, EngineError::Linear(_)));
        assert!(err.to_string().contains("backreference"));
    }

    #[test]
    fn test_flags_apply_to_both_engines() {
        let flags = FlagSet::IGNORECASE;
        let h = Haystack::from("ABAB");

        let p = Program::build_linear("(ab)+", flags, &opts()).unwrap();
        assert_eq!(p.find_spans(h, 0, 4, Anchor::Start).unwrap().unwrap()[0], Some((0, 4)));

        let p = Program::build_backtracking(r"(ab)\1", flags, &opts()).unwrap();
        assert_eq!(p.find_spans(h, 0, 4, Anchor::Start).unwrap().unwrap()[0], Some((0, 4)));
    }

    #[test]
    fn test_backtracking_byte_text() {
        let p = Program::build_backtracking(r"(a)\1", FlagSet::NONE, &opts()).unwrap();
        let bytes: &[u8] = b"\xffaa\xfe";
        assert_eq!(
            p.find_byte_text_spans(bytes, 0, 4, Anchor::Unanchored).unwrap(),
            Some(vec![Some((1, 3)), Some((1, 2))])
        );
        assert!(p.find_byte_text_spans(bytes, 0, 2, Anchor::Unanchored).unwrap().is_none());
        assert!(p.find_byte_text_spans(bytes, 1, 4, Anchor::Start).unwrap().is_some());

        let source = byte_pattern_source(br"(\xff)\1");
        let p = Program::build_backtracking(&source, FlagSet::NONE, &opts()).unwrap();
        assert_eq!(
            p.find_byte_text_spans(b"a\xff\xff", 0, 3, Anchor::Unanchored).unwrap().unwrap()[0],
            Some((1, 3))
        );

        // High bytes are neither word characters nor letters with a case.
        let p = Program::build_backtracking(r"(\w)\1", FlagSet::NONE, &opts()).unwrap();
        assert!(p.find_byte_text_spans(b"\xe9\xe9", 0, 2, Anchor::Unanchored).unwrap().is_none());
        let source = byte_pattern_source(br"(?<=x)\xe9");
        let p = Program::build_backtracking(&source, FlagSet::IGNORECASE, &opts()).unwrap();
        assert!(p.find_byte_text_spans(b"x\xc9", 0, 2, Anchor::Unanchored).unwrap().is_none());
        assert_eq!(
            p.find_byte_text_spans(b"x\xe9", 0, 2, Anchor::Unanchored).unwrap().unwrap()[0],
            Some((1, 2))
        );
    }

    #[test]
    fn test_full_match_source() {
        assert_eq!(full_match_source("a|ab", false), "(?:a|ab)\\z");
        assert_eq!(full_match_source("a # c", true), "(?:a # c\n)\\z");
    }
}
