#![allow(missing_docs)]

use std::sync::Arc;

use linre::{
    CompileOptions,
    FallbackMode,
    FallbackPolicy,
    FlagSet,
    Found,
    LRResult,
    LinreError,
    MatchResult,
    PatternCompiler,
    compile,
    escape,
    fallback::RecordingNotifier,
    findall,
};

#[test]
fn bump_numbers_with_a_callable() {
    let pattern = compile(r"\d+", FlagSet::NONE).unwrap();
    let bump = |m: &MatchResult<'_>| -> LRResult<Vec<u8>> {
        let text = core::str::from_utf8(m.as_bytes()).unwrap();
        let n: u64 = text.parse().unwrap();
        Ok((n + 1).to_string().into_bytes())
    };
    assert_eq!(
        pattern.sub(bump, b"08.2 -2 23x99y", 0).unwrap(),
        b"9.3 -3 24x100y"
    );
}

#[test]
fn escape_round_trips_through_a_template() {
    let pattern = compile("(.)", FlagSet::NONE).unwrap();
    for s in [&b"\\1\\1"[..], b"\\g<0>", b"a.b\tc\\", b"\\\\"] {
        assert_eq!(pattern.sub(escape(s).as_slice(), b"x", 0).unwrap(), s);
    }
}

#[test]
fn backreference_under_each_mode() {
    let notifier = Arc::new(RecordingNotifier::default());
    let policy = FallbackPolicy::new(FallbackMode::Raise).with_notifier(notifier.clone());
    let compiler = PatternCompiler::new(&policy);
    let options = CompileOptions::default();

    let err = compiler.compile(r"(a)\1", FlagSet::NONE, &options).unwrap_err();
    assert!(matches!(err, LinreError::UnsupportedPattern { .. }));
    assert!(notifier.is_empty());

    policy.set_mode(FallbackMode::Notify);
    let p = compiler.compile(r"(a)\1", FlagSet::NONE, &options).unwrap();
    assert!(p.is_fallback());
    assert_eq!(notifier.len(), 1);
    let m = p.search(b"baab", 0, None).unwrap().unwrap();
    assert_eq!(m.byte_span(0).unwrap(), Some((1, 3)));

    policy.set_mode(FallbackMode::Silent);
    let p = compiler.compile(r"(a)\1", FlagSet::NONE, &options).unwrap();
    assert!(p.is_fallback());
    assert_eq!(notifier.len(), 1);
}

#[test]
fn invalid_under_both_grammars_is_a_syntax_error() {
    for mode in [FallbackMode::Silent, FallbackMode::Notify, FallbackMode::Raise] {
        let policy = FallbackPolicy::new(mode);
        let err = PatternCompiler::new(&policy)
            .compile(r"(a", FlagSet::NONE, &CompileOptions::default())
            .unwrap_err();
        assert!(matches!(err, LinreError::PatternSyntax { .. }), "{mode}: {err:?}");
    }
}

#[test]
fn empty_pattern_matches_between_every_byte() {
    let found = findall("", b"ab", FlagSet::NONE)
        .unwrap()
        .collect::<LRResult<Vec<_>>>()
        .unwrap();
    assert_eq!(found, vec![Found::Single(b""); 3]);
}

#[test]
fn named_and_numbered_groups_agree() {
    let p = compile(r"(?P<year>\d{4})-(?P<month>\d\d)", FlagSet::NONE).unwrap();
    let m = p.search(b"x 1999-12 y", 0, None).unwrap().unwrap();
    assert_eq!(m.group("year").unwrap(), m.group(1).unwrap());
    assert_eq!(m.group("month").unwrap(), Some(&b"12"[..]));
    assert_eq!(m.lastgroup(), Some("month"));
}

#[test]
fn both_engines_agree_on_shared_constructs() {
    let silent = FallbackPolicy::new(FallbackMode::Silent);
    let compiler = PatternCompiler::new(&silent);
    let options = CompileOptions::default();

    // `(?=)` forces the delegate, without changing what matches.
    for (linear, delegate) in [
        (r"a|ab", r"(?=)(?:a|ab)"),
        (r"a+?b", r"(?=)a+?b"),
        (r"(a*)(a*)", r"(?=)(a*)(a*)"),
        (r"\w+", r"(?=)\w+"),
    ] {
        let linear = compiler.compile(linear, FlagSet::UNICODE, &options).unwrap();
        let delegate = compiler.compile(delegate, FlagSet::UNICODE, &options).unwrap();
        assert!(!linear.is_fallback());
        assert!(delegate.is_fallback());

        for hay in ["ab", "aab", "xaaab b", ""] {
            let lhs: Vec<_> = linear
                .finditer(hay)
                .unwrap()
                .map(|m| m.unwrap().spans().clone())
                .collect();
            let rhs: Vec<_> = delegate
                .finditer(hay)
                .unwrap()
                .map(|m| m.unwrap().spans().clone())
                .collect();
            assert_eq!(lhs, rhs, "{} on {hay:?}", linear.pattern());
        }
    }
}

#[test]
fn flags_are_validated() {
    assert!(FlagSet::from_bits(2 | 8).is_ok());
    assert_eq!(
        FlagSet::from_bits(1 | 2).unwrap_err(),
        LinreError::InvalidFlags { bits: 1 }
    );
}
