//! # Pattern Flags
//!
//! Flag bit values follow the host regex-module convention, so host
//! bindings can pass flag integers straight through.

use core::{
    fmt,
    ops::{BitOr, BitOrAssign},
};

use crate::errors::{LRResult, LinreError};

/// A validated set of compile flags.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct FlagSet(u32);

impl FlagSet {
    /// No flags.
    pub const NONE: Self = Self(0);

    /// Case-insensitive matching.
    pub const IGNORECASE: Self = Self(2);

    /// `^` and `$` match at line boundaries.
    pub const MULTILINE: Self = Self(8);

    /// `.` matches `\n`.
    pub const DOTALL: Self = Self(16);

    /// Unicode-aware classes and case folding.
    pub const UNICODE: Self = Self(32);

    /// Whitespace and `#` comments in the pattern are ignored.
    pub const VERBOSE: Self = Self(64);

    const ALL: u32 = 2 | 8 | 16 | 32 | 64;

    const NAMES: [(Self, &'static str); 5] = [
        (Self::IGNORECASE, "IGNORECASE"),
        (Self::MULTILINE, "MULTILINE"),
        (Self::DOTALL, "DOTALL"),
        (Self::UNICODE, "UNICODE"),
        (Self::VERBOSE, "VERBOSE"),
    ];

    /// Validate raw flag bits.
    ///
    /// ## Arguments
    /// * `bits` - the raw flag bits.
    ///
    /// ## Returns
    /// The `FlagSet`, or [`LinreError::InvalidFlags`] naming the unknown bits.
    pub fn from_bits(bits: u32) -> LRResult<Self> {
        let unknown = bits & !Self::ALL;
        if unknown != 0 {
            return Err(LinreError::InvalidFlags { bits: unknown });
        }
        Ok(Self(bits))
    }

    /// The raw flag bits.
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Does this set contain every flag in `other`?
    pub const fn contains(
        self,
        other: Self,
    ) -> bool {
        self.0 & other.0 == other.0
    }

    /// Is the set empty?
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Return a copy with `other` added.
    pub const fn with(
        self,
        other: Self,
    ) -> Self {
        Self(self.0 | other.0)
    }

    /// The inline-flag group (`(?imsx)`) for this set; empty if no inline flags apply.
    ///
    /// `UNICODE` has no inline form here; it is handled by engine configuration.
    pub(crate) fn inline_prefix(self) -> String {
        let mut letters = String::new();
        for (flag, letter) in [
            (Self::IGNORECASE, 'i'),
            (Self::MULTILINE, 'm'),
            (Self::DOTALL, 's'),
            (Self::VERBOSE, 'x'),
        ] {
            if self.contains(flag) {
                letters.push(letter);
            }
        }
        if letters.is_empty() {
            letters
        } else {
            format!("(?{letters})")
        }
    }
}

impl BitOr for FlagSet {
    type Output = Self;

    fn bitor(
        self,
        rhs: Self,
    ) -> Self::Output {
        self.with(rhs)
    }
}

impl BitOrAssign for FlagSet {
    fn bitor_assign(
        &mut self,
        rhs: Self,
    ) {
        *self = self.with(rhs);
    }
}

impl TryFrom<u32> for FlagSet {
    type Error = LinreError;

    fn try_from(bits: u32) -> LRResult<Self> {
        Self::from_bits(bits)
    }
}

impl fmt::Debug for FlagSet {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "FlagSet(NONE)");
        }
        let names = Self::NAMES
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect::<Vec<_>>();
        write!(f, "FlagSet({})", names.join(" | "))
    }
}
