//! # tde-core — Foundational Types for the Tax Diagnostic Engine
//!
//! Every other crate in the workspace depends on `tde-core`; it depends on
//! nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Closed regime vocabulary.** `RegimeCode` is the single definition of
//!    {SIMPLES, PRESUMIDO, REAL}. Free-text regime names are resolved once,
//!    through an explicit alias table, and never dispatched on again.
//!
//! 2. **Fatal vs recoverable errors are distinct types.** A
//!    `RulesetIntegrityError` means the rule data cannot be trusted and must
//!    abort the request. A `CalculationDomainError` only degrades one regime.
//!    Neither is ever recovered by inspecting message text.
//!
//! 3. **Canonical fingerprints.** Ruleset and baseline hashes are taken over
//!    JCS bytes, so key order and whitespace never affect a hash.
//!
//! 4. **UTC-only timestamps.** `Timestamp` is truncated to seconds so that
//!    audit records are stable and comparable.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `tde-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod error;
pub mod fingerprint;
pub mod money;
pub mod period;
pub mod regime;
pub mod temporal;

pub use error::{
    CalculationDomainError, CanonicalizationError, InputValidationError, RulesetIntegrityError,
};
pub use fingerprint::{canonical_sha256_hex, CanonicalBytes};
pub use money::{format_brl, format_decimal_br, format_percent_br};
pub use period::{validate_competencia, Periodicity};
pub use regime::{fold_text, AnalysisMode, EligibilityStatus, RegimeCode};
pub use temporal::Timestamp;

/// Ruleset used when neither the request nor the environment names one.
pub const DEFAULT_RULESET_ID: &str = "BR_TAX_2026_V1";
