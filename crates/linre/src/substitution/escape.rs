//! # Escape

/// Bytes which are escaped with a backslash.
const SPECIAL: &[u8] = b"()[]{}?*+-|^$\\.&~# ";

/// Escape a literal for use in a pattern, or in a replacement template.
///
/// Every byte of `()[]{}?*+-|^$\.&~#` and space gains a backslash;
/// `\t \n \r \v \f` become their letter escapes; other bytes pass through.
pub fn escape<B>(literal: B) -> Vec<u8>
where
    B: AsRef<[u8]>,
{
    let literal = literal.as_ref();
    let mut out = Vec::with_capacity(literal.len() * 2);
    for &b in literal {
        match b {
            b'\t' => out.extend_from_slice(br"\t"),
            b'\n' => out.extend_from_slice(br"\n"),
            b'\r' => out.extend_from_slice(br"\r"),
            0x0b => out.extend_from_slice(br"\v"),
            0x0c => out.extend_from_slice(br"\f"),
            b if SPECIAL.contains(&b) => out.extend_from_slice(&[b'\\', b]),
            b => out.push(b),
        }
    }
    out
}
