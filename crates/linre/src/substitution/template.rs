//! # Replacement Templates
//!
//! Template syntax:
//!
//! * `\N`, `\NN` - group `N` (one or two decimal digits);
//! * `\g<N>`, `\g<name>` - group by number or name;
//! * `\0`, `\0o`, `\0oo`, and three-digit `\ooo` - an octal byte;
//! * `\\` - a backslash;
//! * `\a \b \f \n \r \t \v` - control bytes;
//! * `\` before any other letter - kept as written;
//! * `\` before any other byte - that byte.

use crate::{
    compiler::GroupNames,
    errors::{LRResult, LinreError},
    matching::MatchResult,
};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Piece {
    Literal(Vec<u8>),
    Group(usize),
}

/// A parsed, validated substitution template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplacementTemplate {
    pieces: Vec<Piece>,
}

fn is_octal(b: u8) -> bool {
    matches!(b, b'0'..=b'7')
}

fn template_error(msg: impl core::fmt::Display) -> LinreError {
    LinreError::Replacement(msg.to_string())
}

impl ReplacementTemplate {
    /// Parse a template, validating every group reference.
    ///
    /// ## Arguments
    /// * `template` - the template source.
    /// * `names` - the pattern's named groups.
    /// * `group_count` - the pattern's group count, excluding group 0.
    ///
    /// ## Returns
    /// The template; or [`LinreError::Replacement`].
    pub fn parse(
        template: &[u8],
        names: &GroupNames,
        group_count: usize,
    ) -> LRResult<Self> {
        let mut pieces = Vec::new();
        let mut lit = Vec::new();

        let check_group = |idx: usize| -> LRResult<usize> {
            if idx > group_count {
                return Err(template_error(format_args!("invalid group reference {idx}")));
            }
            Ok(idx)
        };

        let mut i = 0;
        while i < template.len() {
            let b = template[i];
            if b != b'\\' {
                lit.push(b);
                i += 1;
                continue;
            }

            let Some(&c) = template.get(i + 1) else {
                return Err(template_error("bad escape (end of template)"));
            };
            i += 2;

            let group = match c {
                b'g' => {
                    let rest = &template[i..];
                    let close = rest.iter().position(|&b| b == b'>');
                    let (Some(b'<'), Some(close)) = (rest.first(), close) else {
                        return Err(template_error("missing group name in \\g<...>"));
                    };
                    let name = &rest[1..close];
                    i += close + 1;

                    let name = core::str::from_utf8(name)
                        .map_err(|_| template_error("bad character in group name"))?;
                    if name.is_empty() {
                        return Err(template_error("missing group name in \\g<...>"));
                    }
                    if name.bytes().all(|b| b.is_ascii_digit()) {
                        let idx = name
                            .parse::<usize>()
                            .map_err(|_| template_error(format_args!("invalid group reference {name}")))?;
                        Some(check_group(idx)?)
                    } else {
                        let idx = names
                            .get(name)
                            .ok_or_else(|| template_error(format_args!("unknown group name {name:?}")))?;
                        Some(idx)
                    }
                }
                b'0' => {
                    let mut value = 0u32;
                    let mut digits = 0;
                    while digits < 2 && template.get(i).copied().is_some_and(is_octal) {
                        value = value * 8 + u32::from(template[i] - b'0');
                        i += 1;
                        digits += 1;
                    }
                    lit.push(value as u8);
                    None
                }
                b'1'..=b'9' => {
                    let d2 = template.get(i).copied().filter(u8::is_ascii_digit);
                    let d3 = template.get(i + 1).copied().filter(|&b| is_octal(b));
                    match (d2, d3) {
                        (Some(d2), Some(d3)) if is_octal(c) && is_octal(d2) => {
                            let value = u32::from(c - b'0') * 64
                                + u32::from(d2 - b'0') * 8
                                + u32::from(d3 - b'0');
                            if value > 0o377 {
                                return Err(template_error(format_args!(
                                    "octal escape value \\{}{}{} outside of range 0-0o377",
                                    c as char, d2 as char, d3 as char
                                )));
                            }
                            lit.push(value as u8);
                            i += 2;
                            None
                        }
                        (Some(d2), _) => {
                            i += 1;
                            Some(check_group(usize::from(c - b'0') * 10 + usize::from(d2 - b'0'))?)
                        }
                        (None, _) => Some(check_group(usize::from(c - b'0'))?),
                    }
                }
                b'\\' => {
                    lit.push(b'\\');
                    None
                }
                b'a' => {
                    lit.push(0x07);
                    None
                }
                b'b' => {
                    lit.push(0x08);
                    None
                }
                b'f' => {
                    lit.push(0x0c);
                    None
                }
                b'n' => {
                    lit.push(b'\n');
                    None
                }
                b'r' => {
                    lit.push(b'\r');
                    None
                }
                b't' => {
                    lit.push(b'\t');
                    None
                }
                b'v' => {
                    lit.push(0x0b);
                    None
                }
                c if c.is_ascii_alphabetic() => {
                    lit.extend_from_slice(&[b'\\', c]);
                    None
                }
                c => {
                    lit.push(c);
                    None
                }
            };

            if let Some(idx) = group {
                if !lit.is_empty() {
                    pieces.push(Piece::Literal(core::mem::take(&mut lit)));
                }
                pieces.push(Piece::Group(idx));
            }
        }
        if !lit.is_empty() {
            pieces.push(Piece::Literal(lit));
        }

        Ok(Self { pieces })
    }

    /// The expansion, if the template has no group references.
    pub fn literal(&self) -> Option<&[u8]> {
        match self.pieces.as_slice() {
            [] => Some(&[]),
            [Piece::Literal(lit)] => Some(lit.as_slice()),
            _ => None,
        }
    }

    /// Append the expansion for `m` to `dst`.
    ///
    /// Non-participating groups expand to nothing.
    pub fn expand_into(
        &self,
        m: &MatchResult<'_>,
        dst: &mut Vec<u8>,
    ) {
        let haystack = m.haystack();
        for piece in &self.pieces {
            match piece {
                Piece::Literal(lit) => dst.extend_from_slice(lit),
                Piece::Group(idx) => {
                    if let Some(span) = m.spans().get(*idx).copied().flatten() {
                        dst.extend_from_slice(haystack.slice(span));
                    }
                }
            }
        }
    }
}
