//! # Audit Errors
//!
//! An audit only errors when it cannot run at all: a rule file or baseline
//! is missing or unreadable, or a report cannot be written. Defects inside
//! readable files are never errors here; they are failed checks.

use std::path::PathBuf;

use tde_core::{CanonicalizationError, RulesetIntegrityError};
use tde_ruleset::RulesetError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IntegrityError {
    #[error(transparent)]
    Ruleset(#[from] RulesetError),

    #[error(transparent)]
    Metadata(#[from] RulesetIntegrityError),

    #[error("canonicalization failed while hashing {file}: {source}")]
    Canonicalization {
        file: String,
        #[source]
        source: CanonicalizationError,
    },

    #[error("failed to write audit report {path}: {source}")]
    ReportWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type IntegrityResult<T> = Result<T, IntegrityError>;
