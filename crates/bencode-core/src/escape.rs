//! Reversible text escaping for raw byte strings.
//!
//! Byte strings are arbitrary binary data but JSON strings must be text. Every
//! byte in the printable ASCII range `0x20..=0x7E` except `%` is written as
//! itself; every other byte, `%` included, becomes `%` followed by exactly two
//! lowercase hex digits. This is not URL percent-encoding: the escape is
//! applied to raw bytes, never to UTF-8 sequences, and always has two digits.

use crate::error::{BencodeError, Result};

const HEX_DIGITS: &[u8; 16] = b"0123456789abcdef";

/// Escape raw bytes into display text.
///
/// ```
/// use bencode_core::from_raw_string;
/// assert_eq!(from_raw_string(b"100%"), "100%25");
/// assert_eq!(from_raw_string(&[0x00, b'A', 0xff]), "%00A%ff");
/// ```
pub fn from_raw_string(raw: &[u8]) -> String {
    let mut out = String::with_capacity(raw.len());
    for &byte in raw {
        if is_plain(byte) {
            out.push(byte as char);
        } else {
            out.push('%');
            out.push(HEX_DIGITS[usize::from(byte >> 4)] as char);
            out.push(HEX_DIGITS[usize::from(byte & 0x0f)] as char);
        }
    }
    out
}

/// Invert [`from_raw_string`].
///
/// Each `%` must be followed by two hex digits (either case). Characters
/// outside the escape are emitted as their UTF-8 bytes, so hand-written JSON
/// containing non-ASCII text converts to its UTF-8 encoding.
///
/// ```
/// use bencode_core::to_raw_string;
/// assert_eq!(to_raw_string("100%25").unwrap(), b"100%");
/// assert!(to_raw_string("50%").is_err());
/// ```
pub fn to_raw_string(text: &str) -> Result<Vec<u8>> {
    let bytes = text.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let high = bytes.get(i + 1).copied().and_then(hex_value);
            let low = bytes.get(i + 2).copied().and_then(hex_value);
            match (high, low) {
                (Some(high), Some(low)) => out.push((high << 4) | low),
                _ => return Err(BencodeError::InvalidEscape { position: i }),
            }
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    Ok(out)
}

fn is_plain(byte: u8) -> bool {
    (0x20..=0x7e).contains(&byte) && byte != b'%'
}

fn hex_value(digit: u8) -> Option<u8> {
    match digit {
        b'0'..=b'9' => Some(digit - b'0'),
        b'a'..=b'f' => Some(digit - b'a' + 10),
        b'A'..=b'F' => Some(digit - b'A' + 10),
        _ => None,
    }
}
