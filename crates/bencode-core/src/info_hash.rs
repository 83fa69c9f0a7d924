//! Infohash of a metainfo tree: SHA-1 over the encoded `info` dictionary.

use sha1::{Digest, Sha1};

use crate::encoder::encode;
use crate::types::Bencode;

/// SHA-1 of `encode(root["info"])`, or `None` when `root` is not a dictionary
/// or has no `info` dictionary.
pub fn info_hash(root: &Bencode) -> Option<[u8; 20]> {
    if !root.is_dictionary() {
        return None;
    }
    let info = root.child_by_key(b"info").filter(|info| info.is_dictionary())?;

    let mut hasher = Sha1::new();
    hasher.update(encode(info));
    let mut hash = [0u8; 20];
    hash.copy_from_slice(&hasher.finalize());
    Some(hash)
}

/// [`info_hash`] as 40 lowercase hex digits.
pub fn info_hash_hex(root: &Bencode) -> Option<String> {
    info_hash(root).map(hex::encode)
}
