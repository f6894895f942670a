//! Canonical JSON serialization and content hashing.
//!
//! The reproducibility contract hashes the heartbeat list, not file bytes:
//! any serializer may pretty-print the package files, but the hash is always
//! computed over the canonical form (sorted keys, no trailing newline, UTF-8).
//!
//! Key ordering comes from `serde_json::Value` objects, which are backed by a
//! sorted map when the `preserve_order` feature is off. Do not enable that
//! feature: it would silently change every content hash.

use serde::Serialize;
use sha2::{Digest, Sha256};

/// Serialize a value to its canonical JSON string.
pub fn canonical_json<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    let tree = serde_json::to_value(value)?;
    serde_json::to_string(&tree)
}

/// SHA-256 hex digest of a value's canonical JSON.
pub fn content_hash<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    let json = canonical_json(value)?;
    let mut hasher = Sha256::new();
    hasher.update(json.as_bytes());
    Ok(format!("{:x}", hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Unordered {
        zeta: u32,
        alpha: u32,
    }

    #[test]
    fn canonical_json_sorts_keys() {
        let json = canonical_json(&Unordered { zeta: 1, alpha: 2 }).unwrap();
        assert_eq!(json, r#"{"alpha":2,"zeta":1}"#);
    }

    #[test]
    fn content_hash_is_lowercase_hex() {
        let hash = content_hash(&vec![1, 2, 3]).unwrap();
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn content_hash_is_stable_across_calls() {
        let a = content_hash(&"same input").unwrap();
        let b = content_hash(&"same input").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn content_hash_changes_with_input() {
        let a = content_hash(&vec!["x"]).unwrap();
        let b = content_hash(&vec!["y"]).unwrap();
        assert_ne!(a, b);
    }
}
