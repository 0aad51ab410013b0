//! # Pattern Compiler
//!
//! Every pattern is first offered to the linear-time engine. Patterns it
//! rejects are classified:
//!
//! * size-limit failures are [`LinreError::PatternTooLarge`], and never fall back;
//! * patterns neither engine accepts are [`LinreError::PatternSyntax`];
//! * the rest use constructs only the backtracking delegate supports,
//!   and the [`FallbackPolicy`] decides whether that is allowed.

use std::borrow::Cow;

use regex_automata::meta;

use crate::{
    compiler::{
        CompileOptions,
        CompiledPattern,
        GroupNames,
        PatternHints,
        Program,
        group_names::scan_group_parents,
        program::{EngineError, linear_syntax_config},
    },
    encoding::{byte_pattern_source, byte_pattern_text, pattern_text},
    errors::{LRResult, LinreError},
    fallback::{FallbackEvent, FallbackMode, FallbackPolicy, global_policy},
    flags::FlagSet,
};

/// Compile a pattern with the process-wide policy and default options.
///
/// ## Arguments
/// * `pattern` - the pattern source.
/// * `flags` - the compile flags.
pub fn compile<P>(
    pattern: P,
    flags: FlagSet,
) -> LRResult<CompiledPattern>
where
    P: AsRef<[u8]>,
{
    PatternCompiler::global().compile(pattern, flags, &CompileOptions::default())
}

/// Compiles patterns under a [`FallbackPolicy`].
#[derive(Debug, Clone, Copy)]
pub struct PatternCompiler<'p> {
    policy: &'p FallbackPolicy,
}

impl PatternCompiler<'static> {
    /// A compiler using [`global_policy`].
    pub fn global() -> Self {
        Self::new(global_policy())
    }
}

impl<'p> PatternCompiler<'p> {
    /// Create a new compiler.
    ///
    /// ## Arguments
    /// * `policy` - consulted once per compilation which needs the delegate.
    pub fn new(policy: &'p FallbackPolicy) -> Self {
        Self { policy }
    }

    /// The policy of this compiler.
    pub fn policy(&self) -> &'p FallbackPolicy {
        self.policy
    }

    /// Compile a pattern.
    ///
    /// ## Arguments
    /// * `pattern` - the pattern source; bytes which are not UTF-8 match
    ///   themselves.
    /// * `flags` - the compile flags.
    /// * `options` - resource limits.
    ///
    /// ## Returns
    /// The compiled pattern, or the classified compile error.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all))]
    pub fn compile<P>(
        &self,
        pattern: P,
        flags: FlagSet,
        options: &CompileOptions,
    ) -> LRResult<CompiledPattern>
    where
        P: AsRef<[u8]>,
    {
        let raw = pattern.as_ref();
        let unicode = flags.contains(FlagSet::UNICODE);
        let text = if unicode {
            pattern_text(raw)
        } else {
            byte_pattern_text(raw)
        };
        let pattern: &str = &text;

        let linear_err = match Program::build_linear(pattern, flags, options) {
            Ok(program) => {
                let group_names = group_names_of(pattern, flags, &program)?;
                let hints = PatternHints::analyze(pattern, &linear_syntax_config(flags));
                return Ok(Self::finish(raw, pattern, flags, program, group_names, options, hints));
            }
            Err(err) => err,
        };

        let EngineError::Linear(build_err) = &linear_err else {
            return Err(classify_engine_error(pattern, flags, &linear_err, options.max_memory));
        };
        if build_err.size_limit().is_some() {
            return Err(LinreError::PatternTooLarge {
                limit: options.max_memory,
            });
        }
        let (linear_message, linear_offset) = linear_diagnostic(pattern, build_err);

        // The delegate parses text; byte patterns which are not UTF-8 are
        // read one character per byte (see `byte_text`), and only search
        // byte subjects.
        let source = match core::str::from_utf8(raw) {
            Ok(source) => Cow::Borrowed(source),
            Err(_) if !unicode => byte_pattern_source(raw),
            Err(_) => Cow::Borrowed(pattern),
        };

        let program = match Program::build_backtracking(&source, flags, options) {
            Ok(program) => program,
            Err(err) => {
                let mut err = classify_engine_error(&source, flags, &err, options.max_memory);
                if let LinreError::PatternSyntax { offset, .. } = &mut err {
                    *offset = offset.or(linear_offset);
                }
                return Err(err);
            }
        };
        let group_names = group_names_of(&source, flags, &program)?;

        let mode = self.policy.mode();
        if !mode.allows_fallback() {
            return Err(LinreError::UnsupportedPattern {
                message: linear_message,
            });
        }
        if mode == FallbackMode::Notify {
            self.policy.notify(&FallbackEvent {
                pattern: String::from_utf8_lossy(raw).into_owned(),
                reason: linear_message,
            });
        }

        Ok(Self::finish(
            raw,
            &source,
            flags,
            program,
            group_names,
            options,
            PatternHints::default(),
        ))
    }

    fn finish(
        raw: &[u8],
        pattern: &str,
        flags: FlagSet,
        program: Program,
        group_names: GroupNames,
        options: &CompileOptions,
        hints: PatternHints,
    ) -> CompiledPattern {
        log::debug!(
            "compiled {pattern:?} for the {} engine with {} groups",
            if program.is_linear() { "linear" } else { "backtracking" },
            program.captures_len().saturating_sub(1)
        );
        CompiledPattern::new(
            pattern.to_string(),
            raw.to_vec(),
            flags,
            program,
            group_names,
            *options,
            hints,
        )
    }
}

/// The group names of `program`, with the nesting of its groups.
fn group_names_of(
    pattern: &str,
    flags: FlagSet,
    program: &Program,
) -> LRResult<GroupNames> {
    let names = GroupNames::from_names(program.capture_names())?;
    let parents = scan_group_parents(pattern, flags.contains(FlagSet::VERBOSE));
    Ok(if parents.len() == program.captures_len() {
        names.with_parents(parents)
    } else {
        names
    })
}

/// The single-line diagnostic and character offset of a linear build error.
fn linear_diagnostic(
    pattern: &str,
    err: &meta::BuildError,
) -> (String, Option<usize>) {
    let byte_offset = match err.syntax_error() {
        Some(regex_syntax::Error::Parse(e)) => Some((e.kind().to_string(), e.span().start.offset)),
        Some(regex_syntax::Error::Translate(e)) => {
            Some((e.kind().to_string(), e.span().start.offset))
        }
        _ => None,
    };
    match byte_offset {
        Some((message, offset)) => (message, char_offset(pattern, offset)),
        None => (err.to_string(), None),
    }
}

/// Convert an engine build error to a compile error.
///
/// ## Arguments
/// * `pattern` - the source the engine was given, less any inline-flag prefix.
/// * `flags` - the flags the engine was given.
/// * `err` - the engine error.
/// * `limit` - the memory budget the engine was given.
pub(crate) fn classify_engine_error(
    pattern: &str,
    flags: FlagSet,
    err: &EngineError,
    limit: usize,
) -> LinreError {
    match err {
        EngineError::Linear(build_err) => {
            if build_err.size_limit().is_some() {
                return LinreError::PatternTooLarge { limit };
            }
            let (message, offset) = linear_diagnostic(pattern, build_err);
            LinreError::PatternSyntax { message, offset }
        }
        EngineError::Backtracking(fancy_err) => {
            let offset = match fancy_err.as_ref() {
                // Positions include the (ASCII) inline-flag prefix.
                fancy_regex::Error::ParseError(pos, _) => pos
                    .checked_sub(flags.inline_prefix().len())
                    .and_then(|pos| char_offset(pattern, pos)),
                _ => None,
            };
            LinreError::PatternSyntax {
                message: fancy_err.to_string(),
                offset,
            }
        }
    }
}

fn char_offset(
    pattern: &str,
    byte_offset: usize,
) -> Option<usize> {
    pattern.get(..byte_offset).map(|prefix| prefix.chars().count())
}
