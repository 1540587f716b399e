//! # Regime Vocabulary — Single Source of Truth
//!
//! `RegimeCode` is the closed set of fiscal regimes the engine compares.
//! Every `match` on it is exhaustive, so adding a regime forces every
//! calculator, eligibility rule and report section to handle it.
//!
//! Free text coming from a request (`"Lucro Presumido"`, `"simples"`,
//! `"LUCRO REAL"`) is resolved once through [`RegimeCode::parse`] and its
//! alias table. Nothing downstream dispatches on strings.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::InputValidationError;

/// The three mutually exclusive regimes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RegimeCode {
    /// Simples Nacional (unified DAS payment, annex/bracket tables).
    Simples,
    /// Lucro Presumido (presumed-profit base).
    Presumido,
    /// Lucro Real (actual profit, non-cumulative PIS/COFINS).
    Real,
}

/// Aliases accepted by [`RegimeCode::parse`], compared after accent folding
/// and lowercasing.
const REGIME_ALIASES: &[(&str, RegimeCode)] = &[
    ("simples", RegimeCode::Simples),
    ("simples nacional", RegimeCode::Simples),
    ("presumido", RegimeCode::Presumido),
    ("lucro presumido", RegimeCode::Presumido),
    ("real", RegimeCode::Real),
    ("lucro real", RegimeCode::Real),
];

impl RegimeCode {
    /// Comparison order used by every comparator run.
    pub fn all() -> &'static [RegimeCode] {
        &[Self::Simples, Self::Presumido, Self::Real]
    }

    /// Machine code (`SIMPLES`, `PRESUMIDO`, `REAL`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Simples => "SIMPLES",
            Self::Presumido => "PRESUMIDO",
            Self::Real => "REAL",
        }
    }

    /// Human label used in reports and structured errors.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Simples => "Simples Nacional",
            Self::Presumido => "Lucro Presumido",
            Self::Real => "Lucro Real",
        }
    }

    /// Resolve a free-text regime name through the alias table.
    pub fn parse(raw: &str) -> Result<Self, InputValidationError> {
        let folded = fold_text(raw);
        REGIME_ALIASES
            .iter()
            .find(|(alias, _)| *alias == folded)
            .map(|(_, code)| *code)
            .ok_or_else(|| InputValidationError::UnknownRegime(raw.to_string()))
    }
}

impl std::fmt::Display for RegimeCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RegimeCode {
    type Err = InputValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Ruleset-driven eligibility verdict for one regime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EligibilityStatus {
    Ok,
    Warning,
    Blocked,
}

impl EligibilityStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::Warning => "WARNING",
            Self::Blocked => "BLOCKED",
        }
    }
}

impl std::fmt::Display for EligibilityStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Recommendation policy requested by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisMode {
    /// Only OK rows are candidates.
    #[default]
    Conservador,
    /// OK and WARNING rows are scored and ranked.
    Estrategico,
}

impl AnalysisMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Conservador => "conservador",
            Self::Estrategico => "estrategico",
        }
    }

    pub fn parse(raw: &str) -> Result<Self, InputValidationError> {
        match fold_text(raw).as_str() {
            "" | "conservador" => Ok(Self::Conservador),
            "estrategico" => Ok(Self::Estrategico),
            _ => Err(InputValidationError::UnknownAnalysisMode(raw.to_string())),
        }
    }
}

impl std::fmt::Display for AnalysisMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trim, lowercase and strip Portuguese diacritics.
///
/// Used by every alias table so that `"Serviços"` and `"servicos"` resolve
/// to the same entry.
pub fn fold_text(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'á' | 'à' | 'ã' | 'â' | 'ä' => 'a',
            'é' | 'ê' | 'è' | 'ë' => 'e',
            'í' | 'î' | 'ì' | 'ï' => 'i',
            'ó' | 'ô' | 'õ' | 'ò' | 'ö' => 'o',
            'ú' | 'û' | 'ù' | 'ü' => 'u',
            'ç' => 'c',
            other => other,
        })
        .collect()
}
