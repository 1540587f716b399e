//! # Ruleset Fingerprints — JCS bytes and SHA-256
//!
//! Rule files are hashed over their RFC 8785 (JSON Canonicalization Scheme)
//! form, so a live file and its baseline hash the same whenever they hold
//! the same values, whatever the key order or whitespace. JCS writes
//! numbers the ECMAScript way: `4800000` and `4800000.0` are the same bytes.

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::error::CanonicalizationError;

/// JCS-canonical JSON bytes. Construct with [`CanonicalBytes::new`] only.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalBytes(Vec<u8>);

impl CanonicalBytes {
    pub fn new(obj: &impl Serialize) -> Result<Self, CanonicalizationError> {
        let value = serde_json::to_value(obj)?;
        Ok(Self(serde_jcs::to_string(&value)?.into_bytes()))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Lowercase hex SHA-256 of the canonical bytes.
    pub fn sha256_hex(&self) -> String {
        Sha256::digest(&self.0)
            .iter()
            .map(|b| format!("{b:02x}"))
            .collect()
    }
}

/// Canonicalize `obj` and fingerprint it.
pub fn canonical_sha256_hex(obj: &impl Serialize) -> Result<String, CanonicalizationError> {
    Ok(CanonicalBytes::new(obj)?.sha256_hex())
}
