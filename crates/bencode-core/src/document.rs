//! Editing model over a bencode tree.
//!
//! [`Document`] owns the tree being edited together with an origin snapshot
//! used for change detection. Every edit is addressed by an index path and is
//! reported to an optional [`ChangeObserver`] before and after it is applied,
//! which is how a view keeps itself in sync without the tree knowing about it.
//!
//! Editors never bypass the dictionary sort invariant: new entries are
//! inserted at their sorted row, renames move the entry, and manual reordering
//! is only offered inside lists.

use std::fmt;

use serde_json::Value;

use crate::decoder::parse_with;
use crate::encoder::encode;
use crate::error::{BencodeError, Result};
use crate::escape::from_raw_string;
use crate::info_hash::info_hash_hex;
use crate::json::{from_json_with, to_json};
use crate::options::Options;
use crate::types::{Bencode, Kind};

/// A structural or value change about to be, or just, applied to a document.
///
/// Paths are index paths from the document root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    /// The whole tree is replaced.
    Reset,
    /// A child appears at `row` under `parent`.
    Insert { parent: Vec<usize>, row: usize },
    /// The child at `row` under `parent` disappears.
    Remove { parent: Vec<usize>, row: usize },
    /// The child at `from` under `parent` ends up at `to`.
    Move {
        parent: Vec<usize>,
        from: usize,
        to: usize,
    },
    /// The node's key, value or hex flag changes in place.
    Update { path: Vec<usize> },
    /// The node's type changes and its children are discarded.
    Retype { path: Vec<usize> },
}

/// Receives notifications around every document edit.
pub trait ChangeObserver {
    fn before_change(&mut self, change: &Change) {
        let _ = change;
    }

    fn after_change(&mut self, change: &Change) {
        let _ = change;
    }
}

/// A bencode tree under edit.
pub struct Document {
    root: Bencode,
    origin: Bencode,
    options: Options,
    observer: Option<Box<dyn ChangeObserver>>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("root", &self.root)
            .field("options", &self.options)
            .field("modified", &self.is_modified())
            .finish_non_exhaustive()
    }
}

impl Document {
    /// An unmodified document holding an empty dictionary.
    pub fn new() -> Self {
        Self::with_options(Options::default())
    }

    pub fn with_options(options: Options) -> Self {
        Self {
            root: Bencode::dictionary(),
            origin: Bencode::dictionary(),
            options,
            observer: None,
        }
    }

    pub fn set_observer(&mut self, observer: Box<dyn ChangeObserver>) {
        self.observer = Some(observer);
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn root(&self) -> &Bencode {
        &self.root
    }

    pub fn node(&self, path: &[usize]) -> Option<&Bencode> {
        self.root.node(path)
    }

    pub fn child_count(&self, path: &[usize]) -> Option<usize> {
        self.node(path).map(Bencode::child_count)
    }

    /// Replace the tree with the decoding of `raw`. Empty input yields an
    /// empty dictionary. Loading a tree equal to the current one is a no-op.
    pub fn load_raw(&mut self, raw: &[u8]) -> Result<()> {
        let root = parse_with(raw, &self.options)?.unwrap_or_default();
        self.replace_root(root);
        Ok(())
    }

    /// Replace the tree with one built from `json`.
    pub fn load_json(&mut self, json: &Value) -> Result<()> {
        let root = from_json_with(json, &self.options)?;
        self.replace_root(root);
        Ok(())
    }

    pub fn to_raw(&self) -> Vec<u8> {
        encode(&self.root)
    }

    pub fn to_json(&self) -> Value {
        to_json(&self.root)
    }

    /// Whether the tree differs structurally from the last snapshot.
    pub fn is_modified(&self) -> bool {
        !self.root.compare(&self.origin)
    }

    /// Take a new snapshot of the current tree.
    pub fn reset_modified(&mut self) {
        self.origin = self.root.clone();
    }

    /// Infohash of the current tree, when it has an `info` dictionary.
    pub fn info_hash(&self) -> Option<String> {
        info_hash_hex(&self.root)
    }

    /// Value column text of the node at `path`.
    pub fn display_value(&self, path: &[usize]) -> Option<String> {
        self.node(path).and_then(Bencode::display_value)
    }

    /// Swap a list item with its predecessor. Returns whether it moved.
    pub fn move_up(&mut self, path: &[usize]) -> bool {
        match self.list_row(path) {
            Some((parent, row)) if row > 0 => {
                self.move_within(parent, row, row - 1);
                true
            }
            _ => false,
        }
    }

    /// Swap a list item with its successor. Returns whether it moved.
    pub fn move_down(&mut self, path: &[usize]) -> bool {
        let Some((parent, row)) = self.list_row(path) else {
            return false;
        };
        let len = self.child_count(parent).unwrap_or_default();
        if row + 1 >= len {
            return false;
        }
        self.move_within(parent, row, row + 1);
        true
    }

    /// Add an `Integer(0)` child: at the end of a list, or under the empty
    /// key of a dictionary (which sorts first). Returns the new row.
    pub fn append_row(&mut self, parent: &[usize]) -> Result<usize> {
        let node = self
            .node(parent)
            .ok_or_else(|| BencodeError::InvalidPath(parent.to_vec()))?;
        match node.kind() {
            Kind::List => {
                let row = node.child_count();
                self.insert_list_item(parent, row, Bencode::integer(0))?;
                Ok(row)
            }
            Kind::Dictionary => self.insert_entry(parent, Vec::new(), Bencode::integer(0)),
            Kind::Integer | Kind::String => Err(BencodeError::NotAContainer(parent.to_vec())),
        }
    }

    /// Insert `item` into the list at `parent`, before position `row`.
    pub fn insert_list_item(&mut self, parent: &[usize], row: usize, item: Bencode) -> Result<()> {
        let node = self
            .node(parent)
            .ok_or_else(|| BencodeError::InvalidPath(parent.to_vec()))?;
        if !node.is_list() {
            return Err(BencodeError::NotAContainer(parent.to_vec()));
        }
        if row > node.child_count() {
            return Err(BencodeError::InvalidPath(child_path(parent, row)));
        }

        let change = Change::Insert {
            parent: parent.to_vec(),
            row,
        };
        self.apply(change, parent, |list| list.insert_child(row, item.without_key()));
        Ok(())
    }

    /// Insert `item` under `key` into the dictionary at `parent`, at its
    /// sorted row. Existing keys are rejected. Returns the row.
    pub fn insert_entry(
        &mut self,
        parent: &[usize],
        key: impl Into<Vec<u8>>,
        item: Bencode,
    ) -> Result<usize> {
        let key = key.into();
        let node = self
            .node(parent)
            .ok_or_else(|| BencodeError::InvalidPath(parent.to_vec()))?;
        if !node.is_dictionary() {
            return Err(BencodeError::NotAContainer(parent.to_vec()));
        }
        let row = match node.sorted_position(&key) {
            Ok(_) => return Err(BencodeError::DuplicateKey(from_raw_string(&key))),
            Err(row) => row,
        };

        let change = Change::Insert {
            parent: parent.to_vec(),
            row,
        };
        self.apply(change, parent, |dict| {
            dict.insert_keyed(key, item);
        });
        Ok(row)
    }

    /// Detach the node at `path` and return it. The root cannot be removed.
    pub fn remove(&mut self, path: &[usize]) -> Result<Bencode> {
        let (parent, row) = split_path(path).ok_or_else(|| BencodeError::InvalidPath(Vec::new()))?;
        if self.node(path).is_none() {
            return Err(BencodeError::InvalidPath(path.to_vec()));
        }

        let change = Change::Remove {
            parent: parent.to_vec(),
            row,
        };
        self.apply(change, parent, |node| node.remove_child(row))
            .flatten()
            .ok_or_else(|| BencodeError::InvalidPath(path.to_vec()))
    }

    /// Rename a dictionary entry; it moves to the row its new key sorts at.
    /// Returns the new row.
    pub fn rename_key(&mut self, path: &[usize], key: impl Into<Vec<u8>>) -> Result<usize> {
        let key = key.into();
        let (parent, row) = split_path(path)
            .filter(|(parent, _)| self.node(parent).is_some_and(Bencode::is_dictionary))
            .ok_or_else(|| BencodeError::NotADictionaryEntry(path.to_vec()))?;
        let dict = self
            .node(parent)
            .filter(|dict| row < dict.child_count())
            .ok_or_else(|| BencodeError::InvalidPath(path.to_vec()))?;

        if dict[row].key() == Some(key.as_slice()) {
            return Ok(row);
        }
        let to = match dict.sorted_position(&key) {
            Ok(_) => return Err(BencodeError::DuplicateKey(from_raw_string(&key))),
            Err(insert_at) if insert_at > row => insert_at - 1,
            Err(insert_at) => insert_at,
        };

        let change = if to == row {
            Change::Update {
                path: path.to_vec(),
            }
        } else {
            Change::Move {
                parent: parent.to_vec(),
                from: row,
                to,
            }
        };
        self.apply(change, parent, |dict| dict.rename_child(row, key))
            .unwrap_or_else(|| Err(BencodeError::InvalidPath(path.to_vec())))
    }

    /// Change the type of the node at `path`, discarding its payload and
    /// children. Returns whether the type changed.
    pub fn change_type(&mut self, path: &[usize], kind: Kind) -> Result<bool> {
        let current = self
            .node(path)
            .ok_or_else(|| BencodeError::InvalidPath(path.to_vec()))?
            .kind();
        if current == kind {
            return Ok(false);
        }
        let change = Change::Retype {
            path: path.to_vec(),
        };
        self.apply(change, path, |node| node.set_type(kind));
        Ok(true)
    }

    pub fn set_integer(&mut self, path: &[usize], value: i64) -> Result<()> {
        self.update(path, |node| node.set_integer(value))
    }

    pub fn set_string(&mut self, path: &[usize], bytes: impl Into<Vec<u8>>) -> Result<()> {
        let bytes = bytes.into();
        self.update(path, |node| node.set_string(bytes))
    }

    pub fn set_hex(&mut self, path: &[usize], hex: bool) -> Result<()> {
        self.update(path, |node| node.set_hex(hex))
    }

    /// Store text typed into the value column: a decimal integer for integer
    /// nodes, hex digits for hex strings, UTF-8 text for other strings.
    pub fn set_value_text(&mut self, path: &[usize], text: &str) -> Result<()> {
        let node = self
            .node(path)
            .ok_or_else(|| BencodeError::InvalidPath(path.to_vec()))?;
        match node.kind() {
            Kind::Integer => {
                let value = text
                    .trim()
                    .parse::<i64>()
                    .map_err(|_| BencodeError::InvalidValueText(text.to_string()))?;
                self.set_integer(path, value)
            }
            Kind::String if node.hex() => {
                let bytes = hex::decode(text.trim())
                    .map_err(|_| BencodeError::InvalidValueText(text.to_string()))?;
                self.set_string(path, bytes)
            }
            Kind::String => self.set_string(path, text.as_bytes()),
            Kind::List | Kind::Dictionary => Err(BencodeError::InvalidValueText(format!(
                "a {} has no value text",
                node.kind()
            ))),
        }
    }

    fn update(&mut self, path: &[usize], edit: impl FnOnce(&mut Bencode)) -> Result<()> {
        if self.node(path).is_none() {
            return Err(BencodeError::InvalidPath(path.to_vec()));
        }
        let change = Change::Update {
            path: path.to_vec(),
        };
        self.apply(change, path, edit);
        Ok(())
    }

    fn replace_root(&mut self, root: Bencode) {
        if root.compare(&self.root) {
            return;
        }
        self.apply(Change::Reset, &[], |current| *current = root);
    }

    /// Parent path and row of a list item.
    fn list_row<'p>(&self, path: &'p [usize]) -> Option<(&'p [usize], usize)> {
        let (parent, row) = split_path(path)?;
        let list = self.node(parent).filter(|node| node.is_list())?;
        (row < list.child_count()).then_some((parent, row))
    }

    fn move_within(&mut self, parent: &[usize], from: usize, to: usize) {
        let change = Change::Move {
            parent: parent.to_vec(),
            from,
            to,
        };
        self.apply(change, parent, |list| list.move_child(from, to));
    }

    /// Run `edit` on the node at `target`, bracketed by observer callbacks.
    /// Returns `None` when `target` does not exist.
    fn apply<R>(
        &mut self,
        change: Change,
        target: &[usize],
        edit: impl FnOnce(&mut Bencode) -> R,
    ) -> Option<R> {
        if let Some(observer) = self.observer.as_mut() {
            observer.before_change(&change);
        }
        let result = self.root.node_mut(target).map(edit);
        if let Some(observer) = self.observer.as_mut() {
            observer.after_change(&change);
        }
        result
    }
}

fn split_path(path: &[usize]) -> Option<(&[usize], usize)> {
    path.split_last().map(|(row, parent)| (parent, *row))
}

fn child_path(parent: &[usize], row: usize) -> Vec<usize> {
    let mut path = parent.to_vec();
    path.push(row);
    path
}
