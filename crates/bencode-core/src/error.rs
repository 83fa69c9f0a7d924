//! Error types for bencode parsing, JSON conversion and tree editing.

use thiserror::Error;

/// Errors that can occur while decoding, converting or editing bencode data.
#[derive(Error, Debug)]
pub enum BencodeError {
    /// The input bytes were not valid bencode.
    /// `position` is the byte offset where the problem was detected.
    #[error("bencode syntax error at byte {position}: {message}")]
    Syntax { position: usize, message: String },

    /// `from_json` received a JSON shape with no bencode counterpart
    /// (booleans and null).
    #[error("unsupported JSON value: {0}")]
    UnsupportedJson(String),

    /// A JSON number does not fit into a signed 64-bit integer.
    #[error("JSON number out of integer range: {0}")]
    IntegerOutOfRange(String),

    /// An escaped string contained a `%` not followed by two hex digits.
    #[error("invalid escape sequence at offset {position}")]
    InvalidEscape { position: usize },

    /// Two entries of one dictionary would share the same raw key.
    #[error("duplicate dictionary key: {0}")]
    DuplicateKey(String),

    /// An index path does not address a node of the tree.
    #[error("no node at path {0:?}")]
    InvalidPath(Vec<usize>),

    /// The addressed node is not a child of a dictionary.
    #[error("node at path {0:?} is not a dictionary entry")]
    NotADictionaryEntry(Vec<usize>),

    /// The addressed node cannot own children.
    #[error("node at path {0:?} is not a list or dictionary")]
    NotAContainer(Vec<usize>),

    /// Text entered for a node's value could not be converted.
    #[error("invalid value text: {0}")]
    InvalidValueText(String),

    /// The input string was not valid JSON.
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),
}

impl BencodeError {
    pub(crate) fn syntax(position: usize, message: impl Into<String>) -> Self {
        BencodeError::Syntax {
            position,
            message: message.into(),
        }
    }
}

/// Convenience alias used throughout bencode-core.
pub type Result<T> = std::result::Result<T, BencodeError>;
