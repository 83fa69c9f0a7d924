//! Bencode decoder: converts raw bytes into a [`Bencode`] tree.
//!
//! Recursive descent over a byte cursor. Dispatch is on the current byte:
//!
//! - `i`: integer `i<digits>e`, optional single leading `-`
//! - `0`..`9`: byte string `<length>:<bytes>`
//! - `l`: list `l<items>e`
//! - `d`: dictionary `d(<string key><value>)*e`
//!
//! # Key design decisions
//!
//! - **All or nothing**: the first malformed item aborts the whole parse with a
//!   [`BencodeError::Syntax`] carrying the byte offset. No partial tree escapes.
//! - **Empty input is not an error**: it yields `Ok(None)`, so an empty file can
//!   be told apart from a malformed one.
//! - **Dictionaries are re-sorted on load**: entries are placed at their sorted
//!   position by bisection regardless of the order in the input. Duplicate keys
//!   are rejected.
//! - **Integers are range-checked**: literals outside `i64` are syntax errors.
//!   Leading zeros and `-0` are accepted and normalize to their numeric value.
//! - **Trailing bytes** after the top-level value are rejected.
//! - **Nesting** is bounded by [`Options::max_depth`].

use tracing::{debug, trace};

use crate::error::{BencodeError, Result};
use crate::escape::from_raw_string;
use crate::options::Options;
use crate::types::Bencode;

/// Parse `raw` with the default [`Options`].
///
/// ```
/// use bencode_core::parse;
/// let value = parse(b"d3:cow3:moo4:spam4:eggse").unwrap().unwrap();
/// assert_eq!(value.child_by_key(b"cow").and_then(|v| v.as_bytes()), Some(&b"moo"[..]));
/// assert!(parse(b"").unwrap().is_none());
/// assert!(parse(b"i5-3e").is_err());
/// ```
pub fn parse(raw: &[u8]) -> Result<Option<Bencode>> {
    parse_with(raw, &Options::default())
}

/// Parse `raw`, marking values under the configured hex keys for hex display.
pub fn parse_with(raw: &[u8], options: &Options) -> Result<Option<Bencode>> {
    if raw.is_empty() {
        debug!("empty bencode input");
        return Ok(None);
    }

    let mut parser = Parser {
        raw,
        pos: 0,
        options,
    };
    let value = parser.parse_item(0)?;
    if parser.pos != raw.len() {
        return Err(BencodeError::syntax(
            parser.pos,
            format!(
                "{} trailing bytes after top-level value",
                raw.len() - parser.pos
            ),
        ));
    }

    debug!(
        bytes = raw.len(),
        nodes = value.subtree_len(),
        kind = %value.kind(),
        "bencode parsed"
    );
    Ok(Some(value))
}

struct Parser<'a> {
    raw: &'a [u8],
    pos: usize,
    options: &'a Options,
}

impl Parser<'_> {
    fn peek(&self) -> Option<u8> {
        self.raw.get(self.pos).copied()
    }

    fn parse_item(&mut self, depth: usize) -> Result<Bencode> {
        match self.peek() {
            Some(b'i') => self.parse_integer(),
            Some(b'0'..=b'9') => self.parse_string().map(Bencode::string),
            Some(b'l') => self.parse_list(depth),
            Some(b'd') => self.parse_dictionary(depth),
            Some(byte) => Err(BencodeError::syntax(
                self.pos,
                format!("unexpected byte 0x{byte:02x}"),
            )),
            None => Err(BencodeError::syntax(self.pos, "unexpected end of input")),
        }
    }

    fn parse_integer(&mut self) -> Result<Bencode> {
        let start = self.pos;
        self.pos += 1;

        let literal_start = self.pos;
        if self.peek() == Some(b'-') {
            self.pos += 1;
        }
        self.skip_digits();
        let literal = &self.raw[literal_start..self.pos];

        match self.peek() {
            Some(b'e') => {}
            Some(byte) => {
                return Err(BencodeError::syntax(
                    self.pos,
                    format!("unexpected byte 0x{byte:02x} in integer"),
                ))
            }
            None => return Err(BencodeError::syntax(start, "unterminated integer")),
        }
        if literal.is_empty() || literal == b"-" {
            return Err(BencodeError::syntax(start, "integer has no digits"));
        }

        let value = std::str::from_utf8(literal)
            .ok()
            .and_then(|digits| digits.parse::<i64>().ok())
            .ok_or_else(|| {
                BencodeError::syntax(
                    start,
                    format!(
                        "integer {} out of 64-bit range",
                        String::from_utf8_lossy(literal)
                    ),
                )
            })?;
        self.pos += 1;

        trace!(start, value, "integer parsed");
        Ok(Bencode::integer(value))
    }

    fn parse_string(&mut self) -> Result<Vec<u8>> {
        let start = self.pos;
        self.skip_digits();
        if self.pos == start {
            return Err(BencodeError::syntax(start, "expected string length"));
        }
        if self.peek() != Some(b':') {
            return Err(BencodeError::syntax(
                self.pos,
                "expected ':' after string length",
            ));
        }

        let len = std::str::from_utf8(&self.raw[start..self.pos])
            .ok()
            .and_then(|digits| digits.parse::<usize>().ok())
            .ok_or_else(|| BencodeError::syntax(start, "string length out of range"))?;
        self.pos += 1;

        let end = self
            .pos
            .checked_add(len)
            .filter(|&end| end <= self.raw.len())
            .ok_or_else(|| {
                BencodeError::syntax(
                    start,
                    format!(
                        "string of {len} bytes exceeds the {} remaining",
                        self.raw.len() - self.pos
                    ),
                )
            })?;
        let bytes = self.raw[self.pos..end].to_vec();
        self.pos = end;

        trace!(start, len, "byte string parsed");
        Ok(bytes)
    }

    fn parse_list(&mut self, depth: usize) -> Result<Bencode> {
        let start = self.pos;
        self.enter(depth)?;
        self.pos += 1;

        let mut list = Bencode::list();
        loop {
            match self.peek() {
                Some(b'e') => break,
                Some(_) => list.append_child(self.parse_item(depth + 1)?),
                None => return Err(BencodeError::syntax(start, "unterminated list")),
            }
        }
        self.pos += 1;

        trace!(start, end = self.pos, items = list.child_count(), "list parsed");
        Ok(list)
    }

    fn parse_dictionary(&mut self, depth: usize) -> Result<Bencode> {
        let start = self.pos;
        self.enter(depth)?;
        self.pos += 1;

        let mut dict = Bencode::dictionary();
        loop {
            match self.peek() {
                Some(b'e') => break,
                Some(b'0'..=b'9') => {
                    let key_pos = self.pos;
                    let key = self.parse_string()?;
                    let value = self.parse_item(depth + 1)?;
                    let row = match dict.sorted_position(&key) {
                        Ok(_) => {
                            return Err(BencodeError::syntax(
                                key_pos,
                                format!("duplicate dictionary key '{}'", from_raw_string(&key)),
                            ))
                        }
                        Err(row) => row,
                    };
                    let hex = self.options.is_hex_key(&key);
                    dict.insert_child(row, value.with_key(key).with_hex(hex));
                }
                Some(byte) => {
                    return Err(BencodeError::syntax(
                        self.pos,
                        format!("dictionary key must be a byte string, found 0x{byte:02x}"),
                    ))
                }
                None => return Err(BencodeError::syntax(start, "unterminated dictionary")),
            }
        }
        self.pos += 1;

        trace!(start, end = self.pos, entries = dict.child_count(), "dictionary parsed");
        Ok(dict)
    }

    fn skip_digits(&mut self) {
        while matches!(self.peek(), Some(b'0'..=b'9')) {
            self.pos += 1;
        }
    }

    fn enter(&self, depth: usize) -> Result<()> {
        if depth >= self.options.max_depth() {
            return Err(BencodeError::syntax(
                self.pos,
                format!("nesting deeper than {} levels", self.options.max_depth()),
            ));
        }
        Ok(())
    }
}
