//! Hashing primitives for WorkChain

use crate::error::Result;
use serde::Serialize;
use sha2::{Digest, Sha256};

/// Lowercase hex encoding of a SHA-256 digest (64 characters).
pub type Hash = String;

/// SHA-256 of arbitrary bytes, hex encoded.
pub fn sha256_hex(data: &[u8]) -> Hash {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Serialize `value` to JSON with object keys sorted at every depth, so the
/// output does not depend on struct field order or map insertion order.
///
/// Relies on `serde_json::Map` being ordered by key, which holds while the
/// `preserve_order` feature stays off.
pub fn canonical_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string(&serde_json::to_value(value)?)?)
}

/// SHA-256 over the canonical JSON encoding of `value`.
pub fn canonical_hash<T: Serialize + ?Sized>(value: &T) -> Result<Hash> {
    Ok(sha256_hex(canonical_json(value)?.as_bytes()))
}

/// True when the first `difficulty` characters of `hash` are all `'0'`.
pub fn meets_difficulty(hash: &str, difficulty: usize) -> bool {
    hash.len() >= difficulty && hash.bytes().take(difficulty).all(|b| b == b'0')
}
