//! # bencode-core
//!
//! Pure-Rust codec and editable tree for **bencode**, the serialization format
//! of BitTorrent metainfo (`.torrent`) files.
//!
//! Bencode has four shapes: integers (`i42e`), byte strings (`4:spam`), lists
//! (`l…e`) and dictionaries (`d…e`) whose keys are sorted by raw bytes. This
//! crate parses them into a mutable tree that keeps dictionaries sorted through
//! every edit, re-encodes that tree byte-exactly, and converts it to and from
//! JSON losslessly by escaping non-printable bytes.
//!
//! ## Quick start
//!
//! ```rust
//! use bencode_core::{encode, parse, to_json};
//!
//! // bencode → tree → JSON
//! let raw = b"d3:cow3:moo4:spaml1:a1:bee";
//! let tree = parse(raw).unwrap().expect("input is not empty");
//! assert_eq!(to_json(&tree).to_string(), r#"{"cow":"moo","spam":["a","b"]}"#);
//!
//! // tree → bencode (roundtrip)
//! assert_eq!(encode(&tree), raw);
//! ```
//!
//! ## Modules
//!
//! - [`tree`]: generic owned N-ary tree with keyed, order-preserving children
//! - [`types`]: the bencode value tree built on [`tree`]
//! - [`decoder`]: raw bytes → tree
//! - [`encoder`]: tree → raw bytes
//! - [`json`]: tree ↔ `serde_json::Value`
//! - [`escape`]: reversible byte ↔ text escaping used for JSON and display
//! - [`document`]: editing model with change tracking and observer callbacks
//! - [`info_hash`]: SHA-1 infohash of the `info` dictionary
//! - [`options`]: codec configuration (hex-display keys, nesting limit)
//! - [`error`]: error types

pub mod decoder;
pub mod document;
pub mod encoder;
pub mod error;
pub mod escape;
pub mod info_hash;
pub mod json;
pub mod options;
pub mod tree;
pub mod types;

pub use decoder::{parse, parse_with};
pub use document::{Change, ChangeObserver, Document};
pub use encoder::{encode, encode_into};
pub use error::{BencodeError, Result};
pub use escape::{from_raw_string, to_raw_string};
pub use info_hash::{info_hash, info_hash_hex};
pub use json::{from_json, from_json_with, json_to_raw, raw_to_json, to_json};
pub use options::Options;
pub use tree::{NodeValue, TreeNode};
pub use types::{type_name, Bencode, Entry, Kind, Payload};
