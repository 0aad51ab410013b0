//! # Haystack Adapter

use std::borrow::Cow;

use crate::errors::{LRResult, LinreError};

/// A caller-supplied subject, in the caller's native representation.
///
/// Both engines scan bytes; `Text` subjects are scanned as their UTF-8
/// bytes, and their offsets are reported to callers in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Haystack<'h> {
    /// Text; caller offsets count characters.
    Text(&'h str),

    /// Raw bytes; caller offsets count bytes.
    Bytes(&'h [u8]),
}

impl<'h> From<&'h str> for Haystack<'h> {
    fn from(text: &'h str) -> Self {
        Self::Text(text)
    }
}

impl<'h> From<&'h String> for Haystack<'h> {
    fn from(text: &'h String) -> Self {
        Self::Text(text.as_str())
    }
}

impl<'h> From<&'h [u8]> for Haystack<'h> {
    fn from(bytes: &'h [u8]) -> Self {
        Self::Bytes(bytes)
    }
}

impl<'h, const N: usize> From<&'h [u8; N]> for Haystack<'h> {
    fn from(bytes: &'h [u8; N]) -> Self {
        Self::Bytes(bytes.as_slice())
    }
}

impl<'h> From<&'h Vec<u8>> for Haystack<'h> {
    fn from(bytes: &'h Vec<u8>) -> Self {
        Self::Bytes(bytes.as_slice())
    }
}

impl<'h> Haystack<'h> {
    /// The engine view of the subject.
    pub fn as_bytes(&self) -> &'h [u8] {
        match *self {
            Self::Text(text) => text.as_bytes(),
            Self::Bytes(bytes) => bytes,
        }
    }

    /// Length of the engine view, in bytes.
    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    /// Is the subject empty?
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Is this a `Text` subject?
    pub fn is_text(&self) -> bool {
        matches!(self, Self::Text(_))
    }

    /// The subject as UTF-8 text, for the backtracking delegate.
    ///
    /// ## Returns
    /// The text; or [`LinreError::Encoding`] for non-UTF-8 bytes.
    pub fn as_text(&self) -> LRResult<&'h str> {
        match *self {
            Self::Text(text) => Ok(text),
            Self::Bytes(bytes) => core::str::from_utf8(bytes).map_err(|e| {
                LinreError::Encoding(format!(
                    "the backtracking engine requires UTF-8 subjects: {e}"
                ))
            }),
        }
    }

    /// Map an engine byte offset to a caller offset.
    ///
    /// ## Arguments
    /// * `offset` - a byte offset into [`Haystack::as_bytes`].
    ///
    /// ## Returns
    /// The identical offset for `Bytes`; the character index for `Text`.
    pub fn from_engine_offset(
        &self,
        offset: usize,
    ) -> LRResult<usize> {
        self.from_engine_offset_after((0, 0), offset)
    }

    /// Map an engine byte offset to a caller offset, counting from a
    /// known `(engine, caller)` offset pair.
    ///
    /// Text offsets are counted from `origin` when `offset` is at or past
    /// it, so mapping successive matches costs the distance between them.
    pub fn from_engine_offset_after(
        &self,
        origin: (usize, usize),
        offset: usize,
    ) -> LRResult<usize> {
        match self {
            Self::Bytes(bytes) => {
                if offset > bytes.len() {
                    return Err(offset_error(offset, bytes.len()));
                }
                Ok(offset)
            }
            Self::Text(text) => {
                let (from, base) = if origin.0 <= offset { origin } else { (0, 0) };
                match text.get(from..offset) {
                    Some(gap) => Ok(base + gap.chars().count()),
                    None => Err(offset_error(offset, text.len())),
                }
            }
        }
    }

    /// Map a caller offset to an engine byte offset.
    ///
    /// Offsets past the end clamp to the subject length.
    pub fn to_engine_offset(
        &self,
        offset: usize,
    ) -> usize {
        match self {
            Self::Bytes(bytes) => offset.min(bytes.len()),
            Self::Text(text) => text
                .char_indices()
                .nth(offset)
                .map_or(text.len(), |(idx, _)| idx),
        }
    }

    /// The scan start following an empty match at `offset`.
    ///
    /// Advances one byte for `Bytes` and one character for `Text`.
    pub fn advance_past_empty(
        &self,
        offset: usize,
    ) -> usize {
        match self {
            Self::Bytes(_) => offset + 1,
            Self::Text(text) => match text.get(offset..).and_then(|rest| rest.chars().next()) {
                Some(c) => offset + c.len_utf8(),
                None => offset + 1,
            },
        }
    }

    /// The bytes of `span`.
    pub(crate) fn slice(
        &self,
        span: (usize, usize),
    ) -> &'h [u8] {
        let bytes = self.as_bytes();
        bytes.get(span.0..span.1).unwrap_or_default()
    }
}

fn offset_error(
    offset: usize,
    len: usize,
) -> LinreError {
    LinreError::Encoding(format!(
        "offset {offset} is not a boundary in a subject of {len} bytes"
    ))
}

/// Decode pattern bytes into the pattern text both engines parse.
///
/// UTF-8 passes through unchanged. Each byte of an invalid sequence becomes
/// `(?-u:\xNN)`, or `\xNN` within a class, which matches that byte; a
/// backslash escaping such a byte is dropped.
pub fn pattern_text(pattern: &[u8]) -> Cow<'_, str> {
    if let Ok(text) = core::str::from_utf8(pattern) {
        return Cow::Borrowed(text);
    }
    Cow::Owned(escape_pattern_bytes(pattern, false))
}

/// As [`pattern_text`], but every non-ASCII byte is escaped; the pattern
/// then matches the bytes it was written with, as the linear-time engine
/// reads patterns without `UNICODE`.
///
/// Characters of group names are kept.
pub fn byte_pattern_text(pattern: &[u8]) -> Cow<'_, str> {
    match core::str::from_utf8(pattern) {
        Ok(text) if text.is_ascii() => Cow::Borrowed(text),
        _ => Cow::Owned(escape_pattern_bytes(pattern, true)),
    }
}

fn escape_pattern_bytes(
    pattern: &[u8],
    bytewise: bool,
) -> String {
    let mut out = String::with_capacity(pattern.len() + 16);
    let mut scan = ClassScan::default();

    for chunk in pattern.utf8_chunks() {
        for c in chunk.valid().chars() {
            if bytewise && !c.is_ascii() && !scan.in_name {
                let mut buf = [0; 4];
                for &b in c.encode_utf8(&mut buf).as_bytes() {
                    push_byte(&mut out, &mut scan, b);
                }
                continue;
            }
            scan.step(c);
            out.push(c);
        }
        for &b in chunk.invalid() {
            push_byte(&mut out, &mut scan, b);
        }
    }
    out
}

/// Append the escape which matches byte `b`.
fn push_byte(
    out: &mut String,
    scan: &mut ClassScan,
    b: u8,
) {
    if scan.escaped {
        out.pop();
    }
    scan.step('\0');
    if scan.depth > 0 {
        // Within a class; a `(?-u:..)` group is not allowed there.
        out.push_str(&format!("\\x{b:02X}"));
    } else {
        out.push_str(&format!("(?-u:\\x{b:02X})"));
    }
}

/// Tracks escapes, class nesting, and group names through pattern text.
#[derive(Debug, Default)]
struct ClassScan {
    escaped: bool,
    depth: usize,

    /// A `]` here is a literal; directly after `[` or `[^`.
    open: bool,

    /// Within the name of `(?P<name>` or `(?<name>`.
    in_name: bool,

    /// The last three unescaped characters outside classes.
    recent: [char; 3],
}

impl ClassScan {
    fn step(
        &mut self,
        c: char,
    ) {
        if self.escaped {
            self.escaped = false;
            self.open = false;
            self.recent = ['\0'; 3];
            return;
        }
        let open = self.open;
        self.open = false;
        if self.in_name {
            self.in_name = c != '>';
            return;
        }
        match c {
            '\\' => self.escaped = true,
            '[' => {
                self.depth += 1;
                self.open = true;
            }
            '^' if open => self.open = true,
            ']' if self.depth > 0 && !open => self.depth -= 1,
            // `(?<=` and `(?<!` are look-behinds, not names.
            '=' | '!' if self.depth == 0 && self.recent[1..] == ['?', '<'] => (),
            c if self.depth == 0
                && (self.recent[1..] == ['?', '<'] || self.recent == ['?', 'P', '<']) =>
            {
                self.in_name = c != '>';
            }
            _ => (),
        }
        if self.depth == 0 {
            self.recent = [self.recent[1], self.recent[2], c];
        }
    }
}

/// Bytes `0x80..=0xFF` read as `U+E080..=U+E0FF`, in the private use area.
///
/// Private use characters are in no class but their own, and have no case
/// mappings, so Unicode-aware `\w`, `\s`, `\d`, `\b` and case folding treat
/// them as ASCII-only engines treat high bytes.
const BYTE_CHAR_BASE: u32 = 0xE000;

/// The character which stands for byte `b` in [`byte_text`].
pub fn byte_char(b: u8) -> char {
    if b.is_ascii() {
        char::from(b)
    } else {
        char::from_u32(BYTE_CHAR_BASE + u32::from(b)).unwrap_or(char::REPLACEMENT_CHARACTER)
    }
}

/// Decode bytes one character per byte; see [`byte_char`].
///
/// ASCII input is borrowed as-is.
pub fn byte_text(bytes: &[u8]) -> Cow<'_, str> {
    match core::str::from_utf8(bytes) {
        Ok(text) if bytes.is_ascii() => Cow::Borrowed(text),
        _ => Cow::Owned(bytes.iter().map(|&b| byte_char(b)).collect()),
    }
}

/// Read pattern bytes the way [`byte_text`] reads subjects.
///
/// Each byte is read with [`byte_char`], and `\xNN` / `\x{NN}` escapes
/// naming a byte above `0x7F` are rewritten to name its stand-in character.
/// Group names are kept as they are. The source is borrowed when nothing
/// changes.
pub fn byte_pattern_source(pattern: &[u8]) -> Cow<'_, str> {
    let needs_rewrite = !pattern.is_ascii() || pattern.windows(2).any(|w| w == b"\\x");
    if !needs_rewrite {
        if let Ok(text) = core::str::from_utf8(pattern) {
            return Cow::Borrowed(text);
        }
    }

    let mut out = String::with_capacity(pattern.len() + 16);
    let mut i = 0;
    while i < pattern.len() {
        if let Some(len) = group_name_len(&pattern[i..]) {
            out.push_str(&String::from_utf8_lossy(&pattern[i..i + len]));
            i += len;
            continue;
        }
        let b = pattern[i];
        if b != b'\\' {
            out.push(byte_char(b));
            i += 1;
            continue;
        }
        if let Some((value, len)) = hex_escape(&pattern[i..]) {
            if value > 0x7F {
                out.push_str(&format!("\\x{{{:X}}}", BYTE_CHAR_BASE + value));
            } else {
                out.extend(pattern[i..i + len].iter().map(|&b| char::from(b)));
            }
            i += len;
            continue;
        }
        match pattern.get(i + 1) {
            // An escaped high byte is that byte, literally.
            Some(&next) if !next.is_ascii() => out.push(byte_char(next)),
            Some(&next) => {
                out.push('\\');
                out.push(char::from(next));
            }
            None => out.push('\\'),
        }
        i += 2;
    }
    Cow::Owned(out)
}

/// The length of the group name syntax, `(?P<name>` and the like, at the
/// start of `src`.
fn group_name_len(src: &[u8]) -> Option<usize> {
    const OPENERS: [(&[u8], u8); 5] = [
        (b"(?P<", b'>'),
        (b"(?P=", b')'),
        (b"(?'", b'\''),
        (b"\\k<", b'>'),
        (b"(?<", b'>'),
    ];
    if src.starts_with(b"(?<=") || src.starts_with(b"(?<!") {
        return None;
    }
    let (prefix, close) = OPENERS.iter().find(|(prefix, _)| src.starts_with(prefix))?;
    let rest = &src[prefix.len()..];
    let end = rest.iter().position(|b| b == close)?;
    Some(prefix.len() + end + 1)
}

/// Parse a `\xNN` or `\x{N..}` escape at the start of `src`.
///
/// ## Returns
/// `(value, escape length)`; `None` if `src` does not start with one, or
/// its value is not a byte.
fn hex_escape(src: &[u8]) -> Option<(u32, usize)> {
    let rest = src.strip_prefix(b"\\x")?;
    let (digits, len) = match rest.strip_prefix(b"{") {
        Some(braced) => {
            let close = braced.iter().position(|&b| b == b'}')?;
            (&braced[..close], close + 4)
        }
        None => (rest.get(..2)?, 4),
    };
    if digits.is_empty() || !digits.iter().all(u8::is_ascii_hexdigit) {
        return None;
    }
    let value = u32::from_str_radix(core::str::from_utf8(digits).ok()?, 16).ok()?;
    (value <= 0xFF).then_some((value, len))
}

/// A byte subject decoded with [`byte_text`], so that a text engine can
/// scan it; one character stands for each byte.
#[derive(Debug)]
pub(crate) struct ByteTextView<'h> {
    bytes: &'h [u8],
    text: Cow<'h, str>,
}

impl<'h> ByteTextView<'h> {
    pub(crate) fn new(bytes: &'h [u8]) -> Self {
        Self {
            bytes,
            text: byte_text(bytes),
        }
    }

    pub(crate) fn as_str(&self) -> &str {
        &self.text
    }

    /// Map a subject byte offset into the decoded text.
    pub(crate) fn to_text_offset(
        &self,
        offset: usize,
    ) -> usize {
        match &self.text {
            Cow::Borrowed(_) => offset,
            Cow::Owned(_) => {
                let prefix = self.bytes.get(..offset).unwrap_or(self.bytes);
                // Stand-in characters are 3 bytes of UTF-8.
                prefix.len() + 2 * prefix.iter().filter(|b| !b.is_ascii()).count()
            }
        }
    }

    /// Map a decoded text offset back to a subject byte offset.
    pub(crate) fn to_byte_offset(
        &self,
        offset: usize,
    ) -> usize {
        match &self.text {
            Cow::Borrowed(_) => offset,
            Cow::Owned(text) => text
                .get(..offset)
                .map_or(self.bytes.len(), |prefix| prefix.chars().count()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bytes_offsets() {
        let h = Haystack::from(b"abc");
        assert_eq!(h.len(), 3);
        assert!(!h.is_text());
        assert_eq!(h.from_engine_offset(2).unwrap(), 2);
        assert_eq!(h.from_engine_offset(3).unwrap(), 3);
        assert!(h.from_engine_offset(4).is_err());

        assert_eq!(h.to_engine_offset(1), 1);
        assert_eq!(h.to_engine_offset(99), 3);
        assert_eq!(h.advance_past_empty(1), 2);
    }

    #[test]
    fn test_text_offsets() {
        // 'é' is 2 bytes, '你' is 3.
        let h = Haystack::from("aé你b");
        assert_eq!(h.len(), 7);
        assert!(h.is_text());

        assert_eq!(h.from_engine_offset(0).unwrap(), 0);
        assert_eq!(h.from_engine_offset(1).unwrap(), 1);
        assert_eq!(h.from_engine_offset(3).unwrap(), 2);
        assert_eq!(h.from_engine_offset(6).unwrap(), 3);
        assert_eq!(h.from_engine_offset(7).unwrap(), 4);
        assert!(h.from_engine_offset(2).is_err());

        assert_eq!(h.to_engine_offset(2), 3);
        assert_eq!(h.to_engine_offset(4), 7);
        assert_eq!(h.to_engine_offset(40), 7);

        assert_eq!(h.advance_past_empty(1), 3);
        assert_eq!(h.advance_past_empty(3), 6);
        assert_eq!(h.advance_past_empty(7), 8);
    }

    #[test]
    fn test_as_text() {
        assert_eq!(Haystack::from(b"abc").as_text().unwrap(), "abc");
        let bad: &[u8] = &[0x61, 0xff];
        assert!(matches!(
            Haystack::from(bad).as_text(),
            Err(LinreError::Encoding(_))
        ));
    }

    #[test]
    fn test_checkpointed_offsets() {
        let h = Haystack::from("aé你b");
        assert_eq!(h.from_engine_offset_after((3, 2), 6).unwrap(), 3);
        assert_eq!(h.from_engine_offset_after((3, 2), 3).unwrap(), 2);
        // Before the origin; counted from the start.
        assert_eq!(h.from_engine_offset_after((6, 3), 1).unwrap(), 1);
        assert!(h.from_engine_offset_after((3, 2), 4).is_err());

        let h = Haystack::from(b"abc");
        assert_eq!(h.from_engine_offset_after((1, 1), 2).unwrap(), 2);
    }

    #[test]
    fn test_pattern_text() {
        assert_eq!(pattern_text(br"\d+"), r"\d+");
        assert!(matches!(pattern_text("é".as_bytes()), Cow::Borrowed(_)));

        assert_eq!(pattern_text(b"\xff\xd8"), r"(?-u:\xFF)(?-u:\xD8)");
        assert_eq!(pattern_text(b"a\\\xffb"), r"a(?-u:\xFF)b");
        assert_eq!(pattern_text(b"[a\xff]"), r"[a\xFF]");
        assert_eq!(pattern_text(b"[]\xff]\xfe"), r"[]\xFF](?-u:\xFE)");
        assert_eq!(pattern_text(b"\\[\xff"), r"\[(?-u:\xFF)");
    }

    #[test]
    fn test_byte_pattern_text() {
        assert!(matches!(byte_pattern_text(br"\d+"), Cow::Borrowed(_)));
        assert_eq!(byte_pattern_text("é+".as_bytes()), r"(?-u:\xC3)(?-u:\xA9)+");
        assert_eq!(byte_pattern_text("[é]".as_bytes()), r"[\xC3\xA9]");
        assert_eq!(byte_pattern_text(b"a\xff"), r"a(?-u:\xFF)");
        assert_eq!(
            byte_pattern_text("(?P<café>é)".as_bytes()),
            r"(?P<café>(?-u:\xC3)(?-u:\xA9))"
        );
        assert_eq!(
            byte_pattern_text("(?<=é)(?<n>x)".as_bytes()),
            r"(?<=(?-u:\xC3)(?-u:\xA9))(?<n>x)"
        );
    }

    #[test]
    fn test_byte_text_view() {
        let v = ByteTextView::new(b"abc");
        assert_eq!(v.as_str(), "abc");
        assert_eq!(v.to_text_offset(2), 2);
        assert_eq!(v.to_byte_offset(2), 2);

        let v = ByteTextView::new(b"\xffa\xe9b");
        assert_eq!(v.as_str(), "\u{e0ff}a\u{e0e9}b");
        assert_eq!(v.to_text_offset(1), 3);
        assert_eq!(v.to_text_offset(3), 7);
        assert_eq!(v.to_text_offset(4), 8);
        assert_eq!(v.to_byte_offset(3), 1);
        assert_eq!(v.to_byte_offset(7), 3);
        assert_eq!(v.to_byte_offset(8), 4);
    }

    #[test]
    fn test_byte_chars_have_no_classes() {
        for b in 0x80..=0xFFu8 {
            let c = byte_char(b);
            assert!(!c.is_alphanumeric() && !c.is_whitespace(), "{b:#x}");
            assert_eq!(c.to_lowercase().next(), Some(c), "{b:#x}");
            assert_eq!(c.to_uppercase().next(), Some(c), "{b:#x}");
        }
        assert_eq!(byte_char(b'a'), 'a');
    }

    #[test]
    fn test_byte_pattern_source() {
        assert!(matches!(byte_pattern_source(br"(\w)\1"), Cow::Borrowed(_)));
        assert_eq!(byte_pattern_source(br"\x41\x{7f}"), r"\x41\x{7f}");

        assert_eq!(byte_pattern_source(br"(\xe9)\1"), r"(\x{E0E9})\1");
        assert_eq!(byte_pattern_source(br"[\x80-\x{FF}]"), r"[\x{E080}-\x{E0FF}]");
        assert_eq!(byte_pattern_source(br"\x41\xe9"), r"\x41\x{E0E9}");
        assert_eq!(byte_pattern_source(br"[\x80\x9f]"), r"[\x{E080}\x{E09F}]");
        assert_eq!(byte_pattern_source(b"\\\xe9"), "\u{e0e9}");
        assert_eq!(byte_pattern_source(b"(\xff)"), "(\u{e0ff})");
        assert_eq!(byte_pattern_source("é".as_bytes()), "\u{e0c3}\u{e0a9}");
        assert_eq!(byte_pattern_source(br"\\xe9"), r"\\xe9");
        assert_eq!(byte_pattern_source(br"\x{100}"), r"\x{100}");

        assert_eq!(
            byte_pattern_source("(?P<año>é)(?P=año)\\k<año>".as_bytes()),
            "(?P<año>\u{e0c3}\u{e0a9})(?P=año)\\k<año>"
        );
        assert_eq!(byte_pattern_source(b"(?<=\xe9)"), "(?<=\u{e0e9})");
    }
}
