//! # Compiled Pattern

use std::{borrow::Cow, sync::Arc};

use once_cell::sync::OnceCell;

use crate::{
    compiler::{
        CompileOptions,
        GroupNames,
        PatternHints,
        Program,
        pattern_compiler::classify_engine_error,
        program::{Anchor, Spans, full_match_source},
    },
    encoding::{Haystack, byte_pattern_source, pattern_text},
    errors::{LRResult, LinreError},
    flags::FlagSet,
};

/// The source a program variant is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Dialect {
    /// The pattern as compiled.
    Native,

    /// `UNICODE` added; scans of text subjects keep to character boundaries.
    Unicode,

    /// The pattern bytes read one character per byte, for byte subjects of
    /// the backtracking engine; see [`crate::encoding::byte_text`].
    ByteText,
}

#[derive(Debug)]
struct PatternInner {
    /// The source `program` was compiled from.
    pattern: String,

    /// The pattern as given.
    source_bytes: Vec<u8>,
    source_utf8: bool,

    /// Does the `ByteText` reading of the pattern equal `pattern`?
    byte_text_native: bool,

    flags: FlagSet,
    program: Program,

    /// Lazily built variants; see [`CompiledPattern::variant`].
    variants: [OnceCell<Program>; 5],

    group_names: Arc<GroupNames>,
    options: CompileOptions,
    hints: PatternHints,
}

/// A compiled pattern; either a linear-time program or a backtracking one.
///
/// Immutable, `Send + Sync`, and cheap to clone.
///
/// Search operations are in [`crate::matching`]; substitution in
/// [`crate::substitution`].
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    inner: Arc<PatternInner>,
}

impl CompiledPattern {
    pub(crate) fn new(
        pattern: String,
        source_bytes: Vec<u8>,
        flags: FlagSet,
        program: Program,
        group_names: GroupNames,
        options: CompileOptions,
        hints: PatternHints,
    ) -> Self {
        Self {
            inner: Arc::new(PatternInner {
                byte_text_native: byte_pattern_source(&source_bytes) == pattern.as_str(),
                pattern,
                source_utf8: core::str::from_utf8(&source_bytes).is_ok(),
                source_bytes,
                flags,
                program,
                variants: Default::default(),
                group_names: Arc::new(group_names),
                options,
                hints,
            }),
        }
    }

    /// The pattern source the engine compiled.
    ///
    /// Pattern bytes which are not UTF-8 appear as escapes.
    pub fn pattern(&self) -> &str {
        &self.inner.pattern
    }

    /// The pattern, as it was given.
    pub fn source_bytes(&self) -> &[u8] {
        &self.inner.source_bytes
    }

    /// The flags the pattern was compiled with.
    pub fn flags(&self) -> FlagSet {
        self.inner.flags
    }

    /// The compiled program.
    pub fn program(&self) -> &Program {
        &self.inner.program
    }

    /// Does this pattern run on the backtracking delegate?
    pub fn is_fallback(&self) -> bool {
        self.inner.program.is_backtracking()
    }

    /// The number of capturing groups, excluding group 0.
    pub fn group_count(&self) -> usize {
        self.inner.program.captures_len().saturating_sub(1)
    }

    /// Lookup the index of a named group.
    pub fn group_index(
        &self,
        name: &str,
    ) -> Option<usize> {
        self.inner.group_names.get(name)
    }

    /// The named groups of the pattern.
    pub fn group_names(&self) -> &Arc<GroupNames> {
        &self.inner.group_names
    }

    /// The byte ceiling the pattern was compiled with.
    pub fn max_memory(&self) -> usize {
        self.inner.options.max_memory
    }

    /// The options the pattern was compiled with.
    pub fn options(&self) -> &CompileOptions {
        &self.inner.options
    }

    /// Search hints; empty for fallback patterns.
    pub fn hints(&self) -> &PatternHints {
        &self.inner.hints
    }

    /// Which program variant scans `haystack`.
    fn dialect(
        &self,
        haystack: Haystack<'_>,
    ) -> LRResult<Dialect> {
        let inner = &self.inner;
        if haystack.is_text() && !inner.source_utf8 {
            return Err(LinreError::Encoding(
                "a pattern which is not UTF-8 cannot search text".to_string(),
            ));
        }
        if inner.flags.contains(FlagSet::UNICODE) {
            return Ok(Dialect::Native);
        }
        Ok(match (inner.program.is_linear(), haystack.is_text()) {
            (true, true) => Dialect::Unicode,
            (false, false) => Dialect::ByteText,
            _ => Dialect::Native,
        })
    }

    /// The program for `dialect`, built on first use.
    ///
    /// ## Arguments
    /// * `dialect` - the source to build from.
    /// * `full` - wrap the pattern as `(?:pattern)\z`?
    fn variant(
        &self,
        dialect: Dialect,
        full: bool,
    ) -> LRResult<&Program> {
        let inner = &self.inner;

        let dialect = match dialect {
            Dialect::ByteText if inner.byte_text_native => Dialect::Native,
            dialect => dialect,
        };

        let slot = match (dialect, full) {
            (Dialect::Native, false) => return Ok(&inner.program),
            (Dialect::Native, true) => 0,
            (Dialect::Unicode, false) => 1,
            (Dialect::Unicode, true) => 2,
            (Dialect::ByteText, false) => 3,
            (Dialect::ByteText, true) => 4,
        };
        inner.variants[slot].get_or_try_init(|| {
            let (source, flags) = match dialect {
                Dialect::Native => (Cow::Borrowed(inner.pattern.as_str()), inner.flags),
                // Text subjects only reach UTF-8 patterns; see `dialect`.
                Dialect::Unicode => (
                    pattern_text(&inner.source_bytes),
                    inner.flags | FlagSet::UNICODE,
                ),
                Dialect::ByteText => (byte_pattern_source(&inner.source_bytes), inner.flags),
            };
            if full {
                self.build_full(&source, flags)
            } else {
                log::trace!("building {dialect:?} program for {source:?}");
                self.build(&source, flags)
            }
        })
    }

    fn build(
        &self,
        source: &str,
        flags: FlagSet,
    ) -> LRResult<Program> {
        let inner = &self.inner;
        inner
            .program
            .build_like(source, flags, &inner.options)
            .map_err(|err| classify_engine_error(source, flags, &err, inner.options.max_memory))
    }

    /// Build the `(?:source)\z` program.
    fn build_full(
        &self,
        source: &str,
        flags: FlagSet,
    ) -> LRResult<Program> {
        let verbose = flags.contains(FlagSet::VERBOSE);
        let full = full_match_source(source, verbose);
        log::trace!("building full-match program {full:?}");
        match self.build(&full, flags) {
            // The pattern compiled alone, so only a trailing comment under an
            // inline `x` flag can have swallowed the closing paren.
            Err(err) if !verbose => self
                .build(&full_match_source(source, true), flags)
                .map_err(|_| err),
            result => result,
        }
    }

    /// Run one search over engine byte offsets.
    ///
    /// ## Arguments
    /// * `haystack` - the subject.
    /// * `start` - the byte offset at which to start.
    /// * `end` - the byte offset at which the subject is truncated.
    /// * `mode` - what the match must be anchored to.
    ///
    /// ## Returns
    /// The per-group byte spans of the match, if any.
    pub(crate) fn find_spans(
        &self,
        haystack: Haystack<'_>,
        start: usize,
        end: usize,
        mode: SearchMode,
    ) -> LRResult<Option<Spans>> {
        let bytes = haystack.as_bytes();
        let end = end.min(bytes.len());
        if start > end {
            return Ok(None);
        }

        let hints = &self.inner.hints;
        if hints.start_anchored && start > 0 {
            return Ok(None);
        }

        let dialect = self.dialect(haystack)?;
        // The literal prefix is exact for the native syntax only.
        if mode != SearchMode::Unanchored
            && dialect == Dialect::Native
            && !hints.may_match_at(&bytes[..end], start)
        {
            return Ok(None);
        }

        let (program, anchor) = match mode {
            SearchMode::Unanchored => (self.variant(dialect, false)?, Anchor::Unanchored),
            SearchMode::Start => (self.variant(dialect, false)?, Anchor::Start),
            SearchMode::Full => (self.variant(dialect, true)?, Anchor::Start),
        };
        match dialect {
            Dialect::ByteText => program.find_byte_text_spans(bytes, start, end, anchor),
            _ => program.find_spans(haystack, start, end, anchor),
        }
    }
}

/// What a search must be anchored to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SearchMode {
    /// Left-most match anywhere in range.
    Unanchored,

    /// Match starting at the start offset.
    Start,

    /// Match spanning the whole range.
    Full,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::compile;

    #[test]
    fn test_accessors() {
        let p = compile(r"(?P<year>\d{4})-(\d\d)", FlagSet::NONE).unwrap();
        assert_eq!(p.pattern(), r"(?P<year>\d{4})-(\d\d)");
        assert_eq!(p.flags(), FlagSet::NONE);
        assert!(!p.is_fallback());
        assert_eq!(p.group_count(), 2);
        assert_eq!(p.group_index("year"), Some(1));
        assert_eq!(p.group_index("month"), None);
        assert_eq!(p.group_names().len(), 1);
        assert_eq!(p.max_memory(), CompileOptions::default().max_memory);
    }

    #[test]
    fn test_send_sync() {
        fn check<T: Send + Sync>() {}
        check::<CompiledPattern>();
    }

    #[test]
    fn test_find_modes() {
        let p = compile("a|ab", FlagSet::NONE).unwrap();
        let h = Haystack::from(b"xab");

        assert_eq!(
            p.find_spans(h, 0, 3, SearchMode::Unanchored).unwrap(),
            Some(vec![Some((1, 2))])
        );
        assert_eq!(p.find_spans(h, 0, 3, SearchMode::Start).unwrap(), None);
        assert_eq!(
            p.find_spans(h, 1, 3, SearchMode::Start).unwrap(),
            Some(vec![Some((1, 2))])
        );
        assert_eq!(
            p.find_spans(h, 1, 3, SearchMode::Full).unwrap(),
            Some(vec![Some((1, 3))])
        );
        assert_eq!(p.find_spans(h, 0, 3, SearchMode::Full).unwrap(), None);
        assert_eq!(p.find_spans(h, 3, 1, SearchMode::Unanchored).unwrap(), None);
    }

    #[test]
    fn test_start_anchored_reject() {
        let p = compile(r"\Aab", FlagSet::NONE).unwrap();
        assert!(p.hints().start_anchored);
        let h = Haystack::from(b"abab");
        assert!(p.find_spans(h, 2, 4, SearchMode::Unanchored).unwrap().is_none());
        assert!(p.find_spans(h, 0, 4, SearchMode::Unanchored).unwrap().is_some());
    }

    #[test]
    fn test_verbose_full_match() {
        let p = compile("a b # trailing comment", FlagSet::VERBOSE).unwrap();
        let h = Haystack::from("ab");
        assert_eq!(
            p.find_spans(h, 0, 2, SearchMode::Full).unwrap(),
            Some(vec![Some((0, 2))])
        );
    }

    #[test]
    fn test_inline_verbose_full_match() {
        for pattern in ["(?ix)a # c", "(?sx)a # c", "(?x) a # c"] {
            let p = compile(pattern, FlagSet::NONE).unwrap();
            assert!(p.fullmatch("a", 0, None).unwrap().is_some(), "{pattern}");
            assert!(p.fullmatch("ab", 0, None).unwrap().is_none(), "{pattern}");
        }

        let p = compile("(?ix)a # c", FlagSet::NONE).unwrap();
        assert!(p.search("A", 0, None).unwrap().is_some());
        assert!(p.fullmatch("A", 0, None).unwrap().is_some());
        assert!(p.fullmatch(&b"A"[..], 0, None).unwrap().is_some());

        // A scoped `x` does not reach the end; no newline is needed.
        let p = compile("(?x: a )b", FlagSet::NONE).unwrap();
        assert!(p.fullmatch("ab", 0, None).unwrap().is_some());
    }

    #[test]
    fn test_text_subject_keeps_char_boundaries() {
        let p = compile(".", FlagSet::NONE).unwrap();
        let m = p.search("é", 0, None).unwrap().unwrap();
        assert_eq!(m.span(0).unwrap(), Some((0, 1)));
        assert_eq!(m.group_str(0).unwrap(), Some("é"));

        // Byte subjects keep byte classes.
        let m = p.search("é".as_bytes(), 0, None).unwrap().unwrap();
        assert_eq!(m.span(0).unwrap(), Some((0, 1)));

        let p = compile("[^x]+", FlagSet::NONE).unwrap();
        let m = p.fullmatch("aé", 0, None).unwrap().unwrap();
        assert_eq!(m.span(0).unwrap(), Some((0, 2)));
    }

    #[test]
    fn test_non_utf8_pattern() {
        let p = compile(&b"\xff\xd8"[..], FlagSet::NONE).unwrap();
        assert!(!p.is_fallback());
        assert_eq!(p.source_bytes(), b"\xff\xd8");

        let m = p.search(&b"ab\xff\xd8\xff"[..], 0, None).unwrap().unwrap();
        assert_eq!(m.span(0).unwrap(), Some((2, 4)));
        assert!(matches!(
            p.search("text", 0, None),
            Err(LinreError::Encoding(_))
        ));
    }

    #[test]
    fn test_fallback_on_byte_subjects() {
        let p = compile(r"(a)\1", FlagSet::NONE).unwrap();
        assert!(p.is_fallback());
        let m = p.search(&b"\xffaa"[..], 0, None).unwrap().unwrap();
        assert_eq!(m.span(0).unwrap(), Some((1, 3)));
        assert_eq!(m.span(1).unwrap(), Some((1, 2)));
        assert!(p.fullmatch(&b"aa"[..], 0, None).unwrap().is_some());

        // Non-ASCII literals match their bytes.
        let p = compile("(é)\\1", FlagSet::NONE).unwrap();
        let hay = "xéé".as_bytes();
        let m = p.search(hay, 0, None).unwrap().unwrap();
        assert_eq!(m.span(0).unwrap(), Some((1, 5)));

        // And so do non-UTF-8 ones.
        let p = compile(&b"(\xff)\\1"[..], FlagSet::NONE).unwrap();
        assert!(p.is_fallback());
        let m = p.search(&b"a\xff\xff"[..], 0, None).unwrap().unwrap();
        assert_eq!(m.span(0).unwrap(), Some((1, 3)));

        // High bytes have no classes and no case.
        let p = compile(r"(\w)\1", FlagSet::NONE).unwrap();
        assert!(p.search(&b"\xe9\xe9"[..], 0, None).unwrap().is_none());
        let p = compile(r"(?<=x)\xe9", FlagSet::IGNORECASE).unwrap();
        assert!(p.is_fallback());
        assert!(p.search(&b"x\xc9"[..], 0, None).unwrap().is_none());
        let m = p.search(&b"x\xe9"[..], 0, None).unwrap().unwrap();
        assert_eq!(m.span(0).unwrap(), Some((1, 2)));

        let p = compile("(?P<año>é)(?P=año)", FlagSet::NONE).unwrap();
        let m = p.search("xéé".as_bytes(), 0, None).unwrap().unwrap();
        assert_eq!(m.span("año").unwrap(), Some((1, 3)));
    }

    #[test]
    fn test_fallback_agrees_with_linear_on_high_bytes() {
        let cases: &[(&str, FlagSet)] = &[
            (r"\w+", FlagSet::NONE),
            (r"\W+", FlagSet::NONE),
            (r"\s+", FlagSet::NONE),
            (r"\S+", FlagSet::NONE),
            (r"\d|\D", FlagSet::NONE),
            (r"\b.", FlagSet::NONE),
            (r"\B.", FlagSet::NONE),
            (r".", FlagSet::DOTALL),
            (r"[^a-z ]+", FlagSet::NONE),
            (r"[\x80-\xff]+", FlagSet::NONE),
            (r"\xe9", FlagSet::IGNORECASE),
            (r"\xc9|\x85", FlagSet::IGNORECASE),
            (r"caf\xe9", FlagSet::IGNORECASE),
            (r"[a-z\xe9]+", FlagSet::IGNORECASE),
            (r"\w+", FlagSet::IGNORECASE),
        ];
        let subjects: &[&[u8]] = &[
            b"caf\xe9 CAF\xc9",
            b"a\x85b\xa0c",
            b"\xc9\xe9\xe9",
            b"x \x85\xa0 y9",
            b"\xa0\x85\xc9\xe9",
        ];

        let spans_of = |p: &CompiledPattern, hay: &[u8]| -> Vec<Option<(usize, usize)>> {
            p.finditer(hay)
                .unwrap()
                .map(|m| m.unwrap().span(0).unwrap())
                .collect()
        };

        for &(pattern, flags) in cases {
            let linear = compile(pattern, flags).unwrap();
            assert!(!linear.is_fallback(), "{pattern}");
            let fallback = compile(format!(r"(?=[\s\S]|\z)(?:{pattern})"), flags).unwrap();
            assert!(fallback.is_fallback(), "{pattern}");

            for &hay in subjects {
                assert_eq!(
                    spans_of(&linear, hay),
                    spans_of(&fallback, hay),
                    "{pattern} on {hay:?}"
                );
            }
        }
    }
}
