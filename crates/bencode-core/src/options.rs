//! Codec configuration.
//!
//! The parser and the JSON builder both consult an [`Options`] value instead of
//! ambient global state, so two documents can use different hex-key sets.

use std::collections::BTreeSet;

/// Keys whose string values are conventionally binary and default to hex display.
pub const DEFAULT_HEX_KEYS: [&str; 4] = ["pieces", "originator", "certificate", "signature"];

/// Default nesting limit of the recursive parser.
pub const DEFAULT_MAX_DEPTH: usize = 512;

/// Settings shared by [`parse_with`](crate::parse_with) and
/// [`from_json_with`](crate::from_json_with).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    hex_keys: BTreeSet<Vec<u8>>,
    max_depth: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            hex_keys: DEFAULT_HEX_KEYS
                .iter()
                .map(|k| k.as_bytes().to_vec())
                .collect(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl Options {
    /// Add a key to the hex-display whitelist.
    pub fn with_hex_key(mut self, key: impl AsRef<[u8]>) -> Self {
        self.hex_keys.insert(key.as_ref().to_vec());
        self
    }

    /// Clear the hex-display whitelist, including the defaults.
    pub fn without_hex_keys(mut self) -> Self {
        self.hex_keys.clear();
        self
    }

    /// Set the maximum container nesting accepted by the parser.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn is_hex_key(&self, key: &[u8]) -> bool {
        self.hex_keys.contains(key)
    }

    pub fn hex_keys(&self) -> impl Iterator<Item = &[u8]> {
        self.hex_keys.iter().map(Vec::as_slice)
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }
}
