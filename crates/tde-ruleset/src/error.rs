//! Ruleset store errors.
//!
//! These cover the physical layer: a missing ruleset directory, a missing
//! file, unreadable bytes, invalid JSON, or a payload that is not a JSON
//! object. Missing or malformed keys *inside* a well-formed file are
//! reported as [`tde_core::RulesetIntegrityError`] by the typed views.
//!
//! [`RulesetBundle::load`](crate::RulesetBundle::load) wraps those in
//! [`RulesetError::Integrity`] so one `?` covers both layers.
//!
//! Every variant is fatal for the request that triggered the load.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while locating, reading, or parsing rule files.
#[derive(Debug, Error)]
pub enum RulesetError {
    /// The directory for the requested ruleset id does not exist.
    #[error("ruleset {ruleset_id:?} not found at {path}")]
    RulesetNotFound { ruleset_id: String, path: PathBuf },

    /// A required rule file is absent from the ruleset directory.
    #[error("required rule file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// The file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The file is not valid JSON.
    #[error("failed to parse JSON at {path}: {source}")]
    JsonParse {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// The file parsed, but the top-level value is not an object.
    #[error("rule file {path} must contain a JSON object, found {found}")]
    NotAnObject { path: PathBuf, found: &'static str },

    /// A well-formed file failed its typed-view validation while a whole
    /// bundle was being assembled.
    #[error(transparent)]
    Integrity(#[from] tde_core::RulesetIntegrityError),
}

/// Convenience alias for ruleset store operations.
pub type RulesetResult<T> = Result<T, RulesetError>;
