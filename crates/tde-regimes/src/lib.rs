//! # tde-regimes — Regime Calculators
//!
//! Three pure, independent calculators:
//!
//! - **Simples Nacional** (`simples.rs`): annex/bracket lookup by RBT12,
//!   Fator R resolution of III/V, DAS split across seven taxes.
//! - **Lucro Presumido** (`presumido.rs`): presumed-profit base by activity,
//!   surtax threshold by periodicity, cumulative PIS/COFINS.
//! - **Lucro Real** (`real.rs`): margin-based IRPJ/CSLL plus non-cumulative
//!   PIS/COFINS with the credit clamped to the debit.
//!
//! `calculation.rs` dispatches on [`tde_core::RegimeCode`].
//!
//! ## Error Policy
//!
//! A missing or malformed rule key is a [`CalculationError::Ruleset`] and
//! must abort the request. A bad regime-specific input is a
//! [`CalculationError::Domain`] that callers may isolate to one regime.
//!
//! Calculators never round. Values are `f64` end to end.

pub mod calculation;
pub mod error;
pub mod presumido;
pub mod real;
pub mod simples;

#[cfg(test)]
mod testing;

pub use calculation::{calculate, CalculationRequest, RegimeCalculation, RegimeDetail};
pub use error::{CalculationError, CalculationResult};
pub use presumido::{PresumidoDetail, PresumidoInput};
pub use real::{CreditCriterion, PisCofinsBase, RealDetail, RealInput, CREDIT_CLAMP_ALERT};
pub use simples::{SimplesDetail, SimplesInput};
