//! # Replacers

use crate::{
    compiler::CompiledPattern,
    errors::LRResult,
    matching::MatchResult,
    substitution::ReplacementTemplate,
};

/// Produces the replacement text for each match of a substitution.
///
/// Implemented for templates (byte slices, `&str`, [`ReplacementTemplate`])
/// and for closures `FnMut(&MatchResult) -> LRResult<Vec<u8>>`.
pub trait Replacer {
    /// Prepare for a substitution, before any matching.
    ///
    /// ## Returns
    /// A validated template for `pattern`, if this replacer is one; the
    /// substitution then expands it instead of calling
    /// [`Replacer::replace_append`].
    fn prepare(
        &mut self,
        pattern: &CompiledPattern,
    ) -> LRResult<Option<ReplacementTemplate>> {
        let _ = pattern;
        Ok(None)
    }

    /// Append the replacement for `m` to `dst`.
    fn replace_append(
        &mut self,
        m: &MatchResult<'_>,
        dst: &mut Vec<u8>,
    ) -> LRResult<()>;
}

fn parse_for(
    template: &[u8],
    pattern: &CompiledPattern,
) -> LRResult<Option<ReplacementTemplate>> {
    ReplacementTemplate::parse(template, pattern.group_names(), pattern.group_count()).map(Some)
}

fn expand_bytes(
    template: &[u8],
    m: &MatchResult<'_>,
    dst: &mut Vec<u8>,
) -> LRResult<()> {
    let template = ReplacementTemplate::parse(template, m.names(), m.group_count())?;
    template.expand_into(m, dst);
    Ok(())
}

impl Replacer for ReplacementTemplate {
    fn replace_append(
        &mut self,
        m: &MatchResult<'_>,
        dst: &mut Vec<u8>,
    ) -> LRResult<()> {
        self.expand_into(m, dst);
        Ok(())
    }
}

impl<'a> Replacer for &'a [u8] {
    fn prepare(
        &mut self,
        pattern: &CompiledPattern,
    ) -> LRResult<Option<ReplacementTemplate>> {
        parse_for(self, pattern)
    }

    fn replace_append(
        &mut self,
        m: &MatchResult<'_>,
        dst: &mut Vec<u8>,
    ) -> LRResult<()> {
        expand_bytes(self, m, dst)
    }
}

impl<'a, const N: usize> Replacer for &'a [u8; N] {
    fn prepare(
        &mut self,
        pattern: &CompiledPattern,
    ) -> LRResult<Option<ReplacementTemplate>> {
        parse_for(self.as_slice(), pattern)
    }

    fn replace_append(
        &mut self,
        m: &MatchResult<'_>,
        dst: &mut Vec<u8>,
    ) -> LRResult<()> {
        expand_bytes(self.as_slice(), m, dst)
    }
}

impl<'a> Replacer for &'a Vec<u8> {
    fn prepare(
        &mut self,
        pattern: &CompiledPattern,
    ) -> LRResult<Option<ReplacementTemplate>> {
        parse_for(self, pattern)
    }

    fn replace_append(
        &mut self,
        m: &MatchResult<'_>,
        dst: &mut Vec<u8>,
    ) -> LRResult<()> {
        expand_bytes(self, m, dst)
    }
}

impl<'a> Replacer for &'a str {
    fn prepare(
        &mut self,
        pattern: &CompiledPattern,
    ) -> LRResult<Option<ReplacementTemplate>> {
        parse_for(self.as_bytes(), pattern)
    }

    fn replace_append(
        &mut self,
        m: &MatchResult<'_>,
        dst: &mut Vec<u8>,
    ) -> LRResult<()> {
        expand_bytes(self.as_bytes(), m, dst)
    }
}

impl<F> Replacer for F
where
    F: FnMut(&MatchResult<'_>) -> LRResult<Vec<u8>>,
{
    fn replace_append(
        &mut self,
        m: &MatchResult<'_>,
        dst: &mut Vec<u8>,
    ) -> LRResult<()> {
        dst.extend_from_slice(&(*self)(m)?);
        Ok(())
    }
}
