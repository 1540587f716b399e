//! # Engine Errors
//!
//! [`EngineError`] is what a diagnostic request can fail with. Every variant
//! aborts the request; per-regime problems that only degrade one comparison
//! row never reach this type.
//!
//! A [`RulesetError::Integrity`] raised while loading a bundle is unwrapped
//! into [`EngineError::Ruleset`], so the structured
//! `ruleset_id=… | arquivo=… | …` failure always surfaces under one variant.

use std::path::PathBuf;

use tde_core::{CalculationDomainError, InputValidationError, RulesetIntegrityError};
use tde_integrity::IntegrityError;
use tde_regimes::CalculationError;
use tde_ruleset::RulesetError;
use thiserror::Error;

use crate::config::ConfigError;

#[derive(Error, Debug)]
pub enum EngineError {
    /// The request is malformed; nothing was computed.
    #[error(transparent)]
    Input(#[from] InputValidationError),

    /// A required rule-table key is missing or malformed.
    #[error(transparent)]
    Ruleset(#[from] RulesetIntegrityError),

    /// A rule file could not be located, read, or parsed.
    #[error(transparent)]
    Store(RulesetError),

    /// The regime selected by the user cannot be computed with its inputs.
    #[error(transparent)]
    Domain(#[from] CalculationDomainError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The integrity audit could not run (missing baseline, unreadable file).
    #[error(transparent)]
    Integrity(#[from] IntegrityError),

    #[error(transparent)]
    History(#[from] HistoryError),
}

impl From<RulesetError> for EngineError {
    fn from(err: RulesetError) -> Self {
        match err {
            RulesetError::Integrity(inner) => Self::Ruleset(inner),
            other => Self::Store(other),
        }
    }
}

impl From<CalculationError> for EngineError {
    fn from(err: CalculationError) -> Self {
        match err {
            CalculationError::Ruleset(inner) => Self::Ruleset(inner),
            CalculationError::Domain(inner) => Self::Domain(inner),
        }
    }
}

/// Errors from the JSONL history file.
#[derive(Error, Debug)]
pub enum HistoryError {
    #[error("history I/O failed at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to serialize history event: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("history event {0} not found")]
    NotFound(String),
}

pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn integrity_error() -> RulesetIntegrityError {
        RulesetIntegrityError {
            ruleset_id: "BR_TAX_2026_V1".into(),
            file: "real_params.json".into(),
            key: "irpj".into(),
            regime: "Lucro Real".into(),
            impact: "Nao e possivel calcular IRPJ".into(),
            detail: "chave ausente".into(),
        }
    }

    #[test]
    fn bundle_integrity_failure_is_not_a_store_error() {
        let err = EngineError::from(RulesetError::Integrity(integrity_error()));
        assert!(matches!(err, EngineError::Ruleset(_)));
        assert!(err.to_string().starts_with("ruleset_id=BR_TAX_2026_V1 | arquivo=real_params.json"));
    }

    #[test]
    fn calculation_errors_keep_their_kind() {
        let fatal = EngineError::from(CalculationError::Ruleset(integrity_error()));
        assert!(matches!(fatal, EngineError::Ruleset(_)));

        let domain = CalculationDomainError::new("Lucro Real", "impacto", "detalhe");
        let recoverable = EngineError::from(CalculationError::Domain(domain));
        assert!(matches!(recoverable, EngineError::Domain(_)));
    }

    #[test]
    fn missing_store_file_stays_a_store_error() {
        let err = EngineError::from(RulesetError::FileNotFound {
            path: PathBuf::from("rulesets/X/metadata.json"),
        });
        assert!(matches!(err, EngineError::Store(_)));
    }
}
