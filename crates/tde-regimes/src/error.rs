//! Calculation errors.
//!
//! Two kinds, kept apart by type so callers never need to inspect message
//! text:
//!
//! - [`CalculationError::Ruleset`]: rule data cannot be trusted. Fatal; the
//!   whole request aborts.
//! - [`CalculationError::Domain`]: this regime cannot be computed with the
//!   supplied inputs. The comparator turns it into a BLOCKED row.

use tde_core::{CalculationDomainError, RulesetIntegrityError};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CalculationError {
    #[error(transparent)]
    Ruleset(#[from] RulesetIntegrityError),

    #[error(transparent)]
    Domain(#[from] CalculationDomainError),
}

impl CalculationError {
    /// Whether the error must abort the request.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Ruleset(_))
    }
}

pub type CalculationResult<T> = Result<T, CalculationError>;
