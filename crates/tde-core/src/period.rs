//! # Period Metadata — Periodicity and Competência
//!
//! The periodicity selects the surtax threshold used by Lucro Presumido.
//! The competência is descriptive metadata whose accepted format depends on
//! the periodicity:
//!
//! | Periodicity | Format | Example |
//! |-------------|--------|---------|
//! | mensal | `YYYY-MM` | `2026-03` |
//! | trimestral | `YYYY-T[1-4]` | `2026-T2` |
//! | anual | `YYYY` | `2026` |

use serde::{Deserialize, Serialize};

use crate::error::InputValidationError;
use crate::regime::fold_text;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Periodicity {
    Mensal,
    Trimestral,
    #[default]
    Anual,
}

impl Periodicity {
    pub fn all() -> &'static [Periodicity] {
        &[Self::Mensal, Self::Trimestral, Self::Anual]
    }

    /// Key used in rule tables (`limites_adicional_irpj.<key>`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mensal => "mensal",
            Self::Trimestral => "trimestral",
            Self::Anual => "anual",
        }
    }

    /// Parse a periodicity. Blank input means `anual`.
    pub fn parse(raw: &str) -> Result<Self, InputValidationError> {
        match fold_text(raw).as_str() {
            "" | "anual" => Ok(Self::Anual),
            "mensal" => Ok(Self::Mensal),
            "trimestral" => Ok(Self::Trimestral),
            _ => Err(InputValidationError::InvalidPeriodicity(raw.to_string())),
        }
    }
}

impl std::fmt::Display for Periodicity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validate a competência against its periodicity.
///
/// Returns the normalized (trimmed, uppercased) value, or the user-facing
/// message explaining the expected format.
pub fn validate_competencia(periodicity: Periodicity, raw: &str) -> Result<String, String> {
    let value = raw.trim().to_uppercase();
    let ok = match periodicity {
        Periodicity::Mensal => is_monthly(&value),
        Periodicity::Trimestral => is_quarterly(&value),
        Periodicity::Anual => is_year(&value),
    };
    if ok {
        return Ok(value);
    }
    Err(match periodicity {
        Periodicity::Mensal => {
            "Competência inválida para periodicidade mensal. Use formato YYYY-MM.".to_string()
        }
        Periodicity::Trimestral => {
            "Competência inválida para periodicidade trimestral. Use formato YYYY-T1..T4."
                .to_string()
        }
        Periodicity::Anual => {
            "Competência inválida para periodicidade anual. Use formato YYYY.".to_string()
        }
    })
}

fn is_year(s: &str) -> bool {
    s.len() == 4 && s.bytes().all(|b| b.is_ascii_digit())
}

fn is_monthly(s: &str) -> bool {
    match s.split_once('-') {
        Some((year, month)) => {
            is_year(year)
                && month.len() == 2
                && month
                    .parse::<u8>()
                    .map(|m| (1..=12).contains(&m))
                    .unwrap_or(false)
        }
        None => false,
    }
}

fn is_quarterly(s: &str) -> bool {
    match s.split_once("-T") {
        Some((year, quarter)) => is_year(year) && matches!(quarter, "1" | "2" | "3" | "4"),
        None => false,
    }
}
