//! Bencode encoder: converts a [`Bencode`] tree into raw bytes.
//!
//! The exact structural mirror of the decoder:
//!
//! - **Integer**: `i<decimal>e`, `-` only when negative, no leading zeros
//! - **String**: `<byte length>:<bytes>`
//! - **List**: `l` + items + `e`
//! - **Dictionary**: `d` + `<keylen>:<key><value>` per entry + `e`
//!
//! Dictionary entries are emitted in their stored order. The tree keeps them
//! sorted at every mutation point, so the encoder never re-sorts and the output
//! for an unchanged subtree is byte-stable (the infohash depends on this).
//!
//! # Example
//! ```
//! use bencode_core::{encode, Bencode};
//! let mut dict = Bencode::dictionary();
//! dict.insert_keyed("z", Bencode::integer(1));
//! dict.insert_keyed("a", Bencode::string("x"));
//! assert_eq!(encode(&dict), b"d1:a1:x1:zi1ee");
//! ```

use tracing::debug;

use crate::types::{Bencode, Payload};

/// Encode a value tree into canonical bencode.
pub fn encode(value: &Bencode) -> Vec<u8> {
    let mut out = Vec::new();
    encode_into(value, &mut out);
    debug!(bytes = out.len(), kind = %value.kind(), "bencode encoded");
    out
}

/// Append the encoding of `value` to `out`.
pub fn encode_into(value: &Bencode, out: &mut Vec<u8>) {
    match value.value().payload() {
        Payload::Integer(integer) => {
            out.push(b'i');
            out.extend_from_slice(integer.to_string().as_bytes());
            out.push(b'e');
        }
        Payload::String(bytes) => encode_bytes(bytes, out),
        Payload::List => {
            out.push(b'l');
            for item in value.children() {
                encode_into(item, out);
            }
            out.push(b'e');
        }
        Payload::Dictionary => {
            out.push(b'd');
            for (key, item) in value.entries() {
                encode_bytes(key, out);
                encode_into(item, out);
            }
            out.push(b'e');
        }
    }
}

fn encode_bytes(bytes: &[u8], out: &mut Vec<u8>) {
    out.extend_from_slice(bytes.len().to_string().as_bytes());
    out.push(b':');
    out.extend_from_slice(bytes);
}
