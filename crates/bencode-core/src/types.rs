//! Bencode value tree.
//!
//! A [`Bencode`] is a [`TreeNode`] whose payload is an [`Entry`]: the value's
//! [`Payload`] plus its dictionary key and hex-display flag. Only `List` and
//! `Dictionary` payloads may own children, and the children of a `Dictionary`
//! always stay in strictly ascending byte order of their keys.
//!
//! Keys of dictionary children change only through the owning dictionary
//! ([`Bencode::insert_keyed`], [`Bencode::rename_child`]), which re-sorts as
//! needed. Detached nodes may be keyed freely with [`Bencode::with_key`].

use std::fmt;

use crate::escape::from_raw_string;
use crate::error::{BencodeError, Result};
use crate::tree::{NodeValue, TreeNode};

/// Longest summary produced by [`Bencode::to_display_string`], in characters.
pub const DISPLAY_STRING_LIMIT: usize = 300;

/// Longest text produced by [`Bencode::display_value`], in characters.
pub const DISPLAY_VALUE_LIMIT: usize = 150;

/// The four bencode shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Kind {
    Integer,
    String,
    List,
    Dictionary,
}

impl Kind {
    /// Human-readable label, for display only.
    pub fn name(self) -> &'static str {
        match self {
            Kind::Integer => "integer",
            Kind::String => "string",
            Kind::List => "list",
            Kind::Dictionary => "dictionary",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Human-readable label of a bencode shape.
pub fn type_name(kind: Kind) -> &'static str {
    kind.name()
}

/// Scalar payload or container tag of a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Integer(i64),
    String(Vec<u8>),
    List,
    Dictionary,
}

impl Payload {
    fn empty(kind: Kind) -> Self {
        match kind {
            Kind::Integer => Payload::Integer(0),
            Kind::String => Payload::String(Vec::new()),
            Kind::List => Payload::List,
            Kind::Dictionary => Payload::Dictionary,
        }
    }

    pub fn kind(&self) -> Kind {
        match self {
            Payload::Integer(_) => Kind::Integer,
            Payload::String(_) => Kind::String,
            Payload::List => Kind::List,
            Payload::Dictionary => Kind::Dictionary,
        }
    }
}

/// Per-node data of a bencode tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    key: Option<Vec<u8>>,
    hex: bool,
    payload: Payload,
}

impl Entry {
    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn key(&self) -> Option<&[u8]> {
        self.key.as_deref()
    }

    pub fn hex(&self) -> bool {
        self.hex
    }

    /// Toggle hex display. Purely presentational; never affects encoding.
    pub fn set_hex(&mut self, hex: bool) {
        self.hex = hex;
    }
}

impl NodeValue for Entry {
    fn is_container(&self) -> bool {
        matches!(self.payload, Payload::List | Payload::Dictionary)
    }

    fn key(&self) -> Option<&[u8]> {
        self.key.as_deref()
    }

    fn orders_children(&self) -> bool {
        matches!(self.payload, Payload::Dictionary)
    }
}

/// A node of a bencode value tree.
pub type Bencode = TreeNode<Entry>;

impl TreeNode<Entry> {
    fn from_payload(payload: Payload) -> Self {
        TreeNode::new(Entry {
            key: None,
            hex: false,
            payload,
        })
    }

    pub fn integer(value: i64) -> Self {
        Self::from_payload(Payload::Integer(value))
    }

    pub fn string(bytes: impl Into<Vec<u8>>) -> Self {
        Self::from_payload(Payload::String(bytes.into()))
    }

    pub fn list() -> Self {
        Self::from_payload(Payload::List)
    }

    pub fn dictionary() -> Self {
        Self::from_payload(Payload::Dictionary)
    }

    /// A node of `kind` with the default payload (`0`, empty bytes, no children).
    pub fn empty(kind: Kind) -> Self {
        Self::from_payload(Payload::empty(kind))
    }

    /// Set the key of a detached node.
    pub fn with_key(mut self, key: impl Into<Vec<u8>>) -> Self {
        self.value_mut().key = Some(key.into());
        self
    }

    /// Drop the key of a detached node.
    pub fn without_key(mut self) -> Self {
        self.value_mut().key = None;
        self
    }

    pub fn with_hex(mut self, hex: bool) -> Self {
        self.value_mut().hex = hex;
        self
    }

    pub fn kind(&self) -> Kind {
        self.value().payload.kind()
    }

    pub fn key(&self) -> Option<&[u8]> {
        self.value().key.as_deref()
    }

    pub fn hex(&self) -> bool {
        self.value().hex
    }

    pub fn set_hex(&mut self, hex: bool) {
        self.value_mut().hex = hex;
    }

    pub fn is_integer(&self) -> bool {
        self.kind() == Kind::Integer
    }

    pub fn is_string(&self) -> bool {
        self.kind() == Kind::String
    }

    pub fn is_list(&self) -> bool {
        self.kind() == Kind::List
    }

    pub fn is_dictionary(&self) -> bool {
        self.kind() == Kind::Dictionary
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self.value().payload {
            Payload::Integer(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match &self.value().payload {
            Payload::String(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// Change the node's type. A different type discards the payload and all
    /// children; the key and hex flag are kept.
    pub fn set_type(&mut self, kind: Kind) {
        if self.kind() == kind {
            return;
        }
        self.clear_children();
        self.value_mut().payload = Payload::empty(kind);
    }

    /// Store an integer, turning the node into an `Integer` first if needed.
    pub fn set_integer(&mut self, value: i64) {
        self.set_type(Kind::Integer);
        self.value_mut().payload = Payload::Integer(value);
    }

    /// Store a byte string, turning the node into a `String` first if needed.
    pub fn set_string(&mut self, bytes: impl Into<Vec<u8>>) {
        self.set_type(Kind::String);
        self.value_mut().payload = Payload::String(bytes.into());
    }

    /// Append `node` to a list. Any key on `node` is dropped.
    ///
    /// # Panics
    ///
    /// When `self` is not a list.
    pub fn push(&mut self, node: Bencode) {
        assert!(self.is_list(), "precondition violated: push on a {}", self.kind());
        self.append_child(node.without_key());
    }

    /// Iterate over `(key, value)` pairs of a dictionary in sorted order.
    pub fn entries(&self) -> impl Iterator<Item = (&[u8], &Bencode)> {
        self.children()
            .iter()
            .map(|child| (child.key().unwrap_or_default(), child))
    }

    /// Insert `node` under `key` at its sorted position and return the entry
    /// it replaced, if any. Returns the row of the inserted entry as well.
    ///
    /// # Panics
    ///
    /// When `self` is not a dictionary.
    pub fn insert_keyed(
        &mut self,
        key: impl Into<Vec<u8>>,
        node: Bencode,
    ) -> (usize, Option<Bencode>) {
        assert!(
            self.is_dictionary(),
            "precondition violated: keyed insert into a {}",
            self.kind()
        );
        let node = node.with_key(key);
        let key = node.key().unwrap_or_default();
        match self.sorted_position(key) {
            Ok(index) => {
                let old = std::mem::replace(&mut self[index], node);
                (index, Some(old))
            }
            Err(index) => {
                self.insert_child(index, node);
                (index, None)
            }
        }
    }

    /// Rename the dictionary child at `index` and move it to its sorted row.
    /// Returns the new row.
    ///
    /// # Panics
    ///
    /// When `self` is not a dictionary or `index` is out of range.
    pub fn rename_child(&mut self, index: usize, key: impl Into<Vec<u8>>) -> Result<usize> {
        assert!(
            self.is_dictionary(),
            "precondition violated: rename inside a {}",
            self.kind()
        );
        let key = key.into();
        if self[index].key() == Some(key.as_slice()) {
            return Ok(index);
        }
        if self.sorted_position(&key).is_ok() {
            return Err(BencodeError::DuplicateKey(from_raw_string(&key)));
        }
        let Some(mut node) = self.remove_child(index) else {
            unreachable!("index was checked above");
        };
        let (Ok(row) | Err(row)) = self.sorted_position(&key);
        node.value_mut().key = Some(key);
        self.insert_child(row, node);
        Ok(row)
    }

    /// Return the child under `key`, replacing it with an empty node of `kind`
    /// when it is missing or has a different type.
    ///
    /// # Panics
    ///
    /// When `self` is not a dictionary.
    pub fn check_and_create(&mut self, kind: Kind, key: &[u8]) -> &mut Bencode {
        match self.position_of_key(key) {
            Some(index) if self[index].kind() == kind => &mut self[index],
            _ => {
                let (index, _) = self.insert_keyed(key, Bencode::empty(kind));
                &mut self[index]
            }
        }
    }

    /// Return the list item at `index`, padding the list with empty strings
    /// up to `index` and replacing the item when it has a different type.
    ///
    /// # Panics
    ///
    /// When `self` is not a list.
    pub fn check_and_create_at(&mut self, kind: Kind, index: usize) -> &mut Bencode {
        assert!(
            self.is_list(),
            "precondition violated: indexed create inside a {}",
            self.kind()
        );
        while self.child_count() < index {
            self.push(Bencode::string(Vec::new()));
        }
        if self.child_count() == index {
            self.push(Bencode::empty(kind));
        } else if self[index].kind() != kind {
            self[index] = Bencode::empty(kind);
        }
        &mut self[index]
    }

    /// Deep structural equality.
    ///
    /// Types and scalar payloads must match, containers must match child by
    /// child in order, and dictionary children must carry equal keys. The hex
    /// flag and the keys of `self` and `other` themselves are ignored.
    pub fn compare(&self, other: &Bencode) -> bool {
        compare_nodes(self, other)
    }

    /// Single-line debug summary, truncated to [`DISPLAY_STRING_LIMIT`] characters.
    pub fn to_display_string(&self) -> String {
        let mut out = String::new();
        if let Some(key) = self.key().filter(|key| !key.is_empty()) {
            out.push_str("key ");
            out.push_str(&from_raw_string(key));
            out.push_str(" | ");
        }
        match &self.value().payload {
            Payload::Integer(value) => out.push_str(&format!("integer {value}")),
            Payload::String(bytes) => {
                out.push_str("string ");
                out.push_str(&from_raw_string(bytes));
            }
            Payload::List => out.push_str("list"),
            Payload::Dictionary => out.push_str("dictionary"),
        }
        truncate_chars(out, DISPLAY_STRING_LIMIT)
    }

    /// Value column text: decimal integers, hex dumps for `hex` strings and
    /// lossy UTF-8 for other strings, truncated to [`DISPLAY_VALUE_LIMIT`]
    /// characters. Containers have no value text.
    pub fn display_value(&self) -> Option<String> {
        let text = match &self.value().payload {
            Payload::Integer(value) => value.to_string(),
            Payload::String(bytes) if self.hex() => hex::encode(bytes),
            Payload::String(bytes) => String::from_utf8_lossy(bytes).into_owned(),
            Payload::List | Payload::Dictionary => return None,
        };
        Some(truncate_chars(text, DISPLAY_VALUE_LIMIT))
    }
}

impl Default for TreeNode<Entry> {
    fn default() -> Self {
        Self::dictionary()
    }
}

impl From<i64> for Bencode {
    fn from(value: i64) -> Self {
        Bencode::integer(value)
    }
}

impl From<&str> for Bencode {
    fn from(value: &str) -> Self {
        Bencode::string(value.as_bytes())
    }
}

impl From<Vec<u8>> for Bencode {
    fn from(value: Vec<u8>) -> Self {
        Bencode::string(value)
    }
}

fn compare_nodes(a: &Bencode, b: &Bencode) -> bool {
    match (&a.value().payload, &b.value().payload) {
        (Payload::Integer(x), Payload::Integer(y)) => x == y,
        (Payload::String(x), Payload::String(y)) => x == y,
        (Payload::List, Payload::List) => {
            a.child_count() == b.child_count()
                && a.children()
                    .iter()
                    .zip(b.children())
                    .all(|(x, y)| compare_nodes(x, y))
        }
        (Payload::Dictionary, Payload::Dictionary) => {
            a.child_count() == b.child_count()
                && a.children()
                    .iter()
                    .zip(b.children())
                    .all(|(x, y)| x.key() == y.key() && compare_nodes(x, y))
        }
        _ => false,
    }
}

fn truncate_chars(text: String, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((cut, _)) => text[..cut].to_string(),
        None => text,
    }
}
