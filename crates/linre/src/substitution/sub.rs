//! # Substitution

use crate::{
    compiler::CompiledPattern,
    encoding::Haystack,
    errors::LRResult,
    substitution::Replacer,
};

impl CompiledPattern {
    /// Replace matches in `haystack`.
    ///
    /// See [`CompiledPattern::subn`].
    pub fn sub<'h, H, R>(
        &self,
        repl: R,
        haystack: H,
        count: usize,
    ) -> LRResult<Vec<u8>>
    where
        H: Into<Haystack<'h>>,
        R: Replacer,
    {
        Ok(self.subn(repl, haystack, count)?.0)
    }

    /// Replace matches in `haystack`, and count the replacements.
    ///
    /// Templates are validated before any matching; matches are found
    /// as [`CompiledPattern::finditer`] finds them.
    ///
    /// ## Arguments
    /// * `repl` - the replacement; a template, or a closure.
    /// * `haystack` - the subject.
    /// * `count` - the max number of replacements; `0` is unbounded.
    ///
    /// ## Returns
    /// `(result, replacements)`.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all))]
    pub fn subn<'h, H, R>(
        &self,
        mut repl: R,
        haystack: H,
        count: usize,
    ) -> LRResult<(Vec<u8>, usize)>
    where
        H: Into<Haystack<'h>>,
        R: Replacer,
    {
        let haystack = haystack.into();
        let template = repl.prepare(self)?;
        let bytes = haystack.as_bytes();

        let mut out = Vec::with_capacity(bytes.len());
        let mut last = 0;
        let mut n = 0;

        let mut matches = self.finditer(haystack)?;
        while count == 0 || n < count {
            let Some(m) = matches.pull_next()? else {
                break;
            };
            let Some((start, end)) = m.byte_span(0)? else {
                break;
            };

            out.extend_from_slice(&bytes[last..start]);
            match &template {
                Some(template) => template.expand_into(&m, &mut out),
                None => repl.replace_append(&m, &mut out)?,
            }
            last = end;
            n += 1;
        }
        out.extend_from_slice(&bytes[last..]);

        Ok((out, n))
    }
}

#[cfg(test)]
mod tests {
    use crate::{FlagSet, LRResult, LinreError, MatchResult, compile};

    #[test]
    fn test_template_sub() {
        let p = compile(r"(\w+)@(\w+)", FlagSet::NONE).unwrap();
        assert_eq!(
            p.sub(br"\2 at \1", b"mail bob@home, amy@work", 0).unwrap(),
            b"mail home at bob, work at amy"
        );
        assert_eq!(
            p.subn(br"\2 at \1", b"mail bob@home, amy@work", 1).unwrap(),
            (b"mail home at bob, amy@work".to_vec(), 1)
        );
    }

    #[test]
    fn test_count_zero_is_unbounded() {
        let p = compile("a", FlagSet::NONE).unwrap();
        assert_eq!(p.subn(b"b", b"aaaa", 0).unwrap(), (b"bbbb".to_vec(), 4));
        assert_eq!(p.subn(b"b", b"aaaa", 3).unwrap(), (b"bbba".to_vec(), 3));
        assert_eq!(p.subn(b"b", b"xyz", 0).unwrap(), (b"xyz".to_vec(), 0));
    }

    #[test]
    fn test_empty_matches() {
        let p = compile("x*", FlagSet::NONE).unwrap();
        assert_eq!(p.sub(b"-", b"abxd", 0).unwrap(), b"-a-b--d-");
    }

    #[test]
    fn test_closure() {
        let p = compile(r"\d+", FlagSet::NONE).unwrap();
        let double = |m: &MatchResult<'_>| -> LRResult<Vec<u8>> {
            let n: u64 = core::str::from_utf8(m.as_bytes()).unwrap().parse().unwrap();
            Ok((n * 2).to_string().into_bytes())
        };
        assert_eq!(p.sub(double, b"1, 20, 300", 0).unwrap(), b"2, 40, 600");
    }

    #[test]
    fn test_closure_errors_propagate() {
        let p = compile(r"\d", FlagSet::NONE).unwrap();
        let mut calls = 0;
        let failing = |_: &MatchResult<'_>| -> LRResult<Vec<u8>> {
            calls += 1;
            Err(LinreError::Replacement("nope".to_string()))
        };
        assert!(p.sub(failing, b"1 2 3", 0).is_err());
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_bad_template_fails_before_matching() {
        let p = compile(r"(a)", FlagSet::NONE).unwrap();
        assert!(matches!(
            p.sub(br"\2", b"no match here", 0),
            Err(LinreError::Replacement(_))
        ));
    }

    #[test]
    fn test_unmatched_group_is_empty() {
        let p = compile(r"(a)|(b)", FlagSet::NONE).unwrap();
        assert_eq!(p.sub(br"[\1\2]", b"ab", 0).unwrap(), b"[a][b]");
    }

    #[test]
    fn test_text_sub() {
        let p = compile(r"é", FlagSet::UNICODE).unwrap();
        assert_eq!(p.sub("e", "café é", 0).unwrap(), "cafe e".as_bytes());
    }
}
