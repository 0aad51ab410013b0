//! # Pattern Hints

use regex_automata::util::syntax;
use regex_syntax::hir::{
    Look,
    literal::{ExtractKind, Extractor},
};

/// Search hints derived from a parsed pattern.
///
/// Only the linear-time engine's grammar is analysed; fallback patterns
/// carry empty hints.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatternHints {
    /// Every match begins with these bytes.
    pub literal_prefix: Option<Vec<u8>>,

    /// Every match begins at the start of the haystack (`\A`).
    pub start_anchored: bool,
}

impl PatternHints {
    /// Analyse a pattern with the syntax config it was compiled with.
    ///
    /// Patterns which fail to parse yield empty hints.
    pub(crate) fn analyze(
        pattern: &str,
        config: &syntax::Config,
    ) -> Self {
        let Ok(hir) = syntax::parse_with(pattern, config) else {
            return Self::default();
        };

        let start_anchored = hir.properties().look_set_prefix().contains(Look::Start);

        let mut extractor = Extractor::new();
        extractor.kind(ExtractKind::Prefix);
        let seq = extractor.extract(&hir);
        let literal_prefix = seq
            .longest_common_prefix()
            .filter(|prefix| !prefix.is_empty())
            .map(<[u8]>::to_vec);

        Self {
            literal_prefix,
            start_anchored,
        }
    }

    /// Can a match start at `offset` in `haystack`?
    ///
    /// A `false` is definitive; a `true` only means "maybe".
    pub(crate) fn may_match_at(
        &self,
        haystack: &[u8],
        offset: usize,
    ) -> bool {
        if self.start_anchored && offset > 0 {
            return false;
        }
        match &self.literal_prefix {
            Some(prefix) => haystack
                .get(offset..)
                .is_some_and(|rest| rest.starts_with(prefix)),
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hints(pattern: &str) -> PatternHints {
        PatternHints::analyze(pattern, &syntax::Config::new().utf8(false))
    }

    #[test]
    fn test_literal_prefix() {
        assert_eq!(hints("foo\\d+").literal_prefix, Some(b"foo".to_vec()));
        assert_eq!(hints("(?:foobar|foobaz)").literal_prefix, Some(b"fooba".to_vec()));
        assert_eq!(hints("\\d+").literal_prefix, None);
        assert_eq!(hints("").literal_prefix, None);
    }

    #[test]
    fn test_start_anchored() {
        assert!(hints("^abc").start_anchored);
        assert!(hints("\\Aabc").start_anchored);
        assert!(!hints("abc").start_anchored);
        assert!(!hints("^a|b").start_anchored);
        assert!(!PatternHints::analyze("^abc", &syntax::Config::new().multi_line(true)).start_anchored);
    }

    #[test]
    fn test_may_match_at() {
        let h = hints("^ab");
        assert!(h.may_match_at(b"abc", 0));
        assert!(!h.may_match_at(b"abc", 1));
        assert!(!h.may_match_at(b"xbc", 0));

        let h = hints("x*");
        assert!(h.may_match_at(b"", 0));
        assert!(h.may_match_at(b"abc", 2));
    }

    #[test]
    fn test_unparseable() {
        assert_eq!(hints("(a)\\1"), PatternHints::default());
    }
}
