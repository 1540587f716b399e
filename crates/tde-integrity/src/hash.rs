//! # Ruleset Fingerprints
//!
//! Each audited file is hashed over its canonical JSON form; the composite
//! hash is the SHA-256 of the canonical `{file name: file hash}` map. Key
//! order and whitespace in the files never change either digest.

use std::collections::BTreeMap;

use serde_json::{Map, Value};
use tde_core::{canonical_sha256_hex, CanonicalizationError};

/// File name to hex digest, ordered by file name.
pub type FileHashes = BTreeMap<String, String>;

pub fn file_hash(payload: &Map<String, Value>) -> Result<String, CanonicalizationError> {
    canonical_sha256_hex(payload)
}

pub fn composite_hash(hashes: &FileHashes) -> Result<String, CanonicalizationError> {
    canonical_sha256_hex(hashes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("fixture must be an object"),
        }
    }

    #[test]
    fn key_order_does_not_change_file_hash() {
        let a: Map<String, Value> =
            serde_json::from_str(r#"{"irpj": 0.15, "csll": 0.09}"#).unwrap();
        let b: Map<String, Value> =
            serde_json::from_str(r#"{ "csll":0.09,"irpj":0.15 }"#).unwrap();
        assert_eq!(file_hash(&a).unwrap(), file_hash(&b).unwrap());
    }

    #[test]
    fn composite_tracks_every_file() {
        let mut hashes = FileHashes::new();
        hashes.insert("real_params.json".into(), file_hash(&object(json!({"irpj": 0.15}))).unwrap());
        let one = composite_hash(&hashes).unwrap();
        hashes.insert("thresholds.json".into(), file_hash(&object(json!({}))).unwrap());
        assert_ne!(one, composite_hash(&hashes).unwrap());
        assert_eq!(one.len(), 64);
    }
}
