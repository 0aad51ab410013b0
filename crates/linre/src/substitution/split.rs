//! # Split

use crate::{compiler::CompiledPattern, encoding::Haystack, errors::LRResult};

impl CompiledPattern {
    /// Split `haystack` by the matches of this pattern.
    ///
    /// When the pattern has groups, each match's group texts are interleaved
    /// between the pieces; `None` for groups which did not participate.
    ///
    /// ## Arguments
    /// * `haystack` - the subject.
    /// * `max_splits` - the max number of splits; `0` is unbounded.
    ///
    /// ## Returns
    /// The pieces; the remainder of the subject is always the last piece.
    pub fn split<'h, H>(
        &self,
        haystack: H,
        max_splits: usize,
    ) -> LRResult<Vec<Option<&'h [u8]>>>
    where
        H: Into<Haystack<'h>>,
    {
        let haystack = haystack.into();
        let bytes = haystack.as_bytes();

        let mut pieces = Vec::new();
        let mut last = 0;
        let mut n = 0;

        let mut matches = self.finditer(haystack)?;
        while max_splits == 0 || n < max_splits {
            let Some(m) = matches.pull_next()? else {
                break;
            };
            let Some((start, end)) = m.byte_span(0)? else {
                break;
            };

            pieces.push(Some(&bytes[last..start]));
            pieces.extend(m.groups());
            last = end;
            n += 1;
        }
        pieces.push(Some(&bytes[last..]));

        Ok(pieces)
    }
}
