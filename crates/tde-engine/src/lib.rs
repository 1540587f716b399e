//! # tde-engine — Diagnostic Orchestration
//!
//! Turns one [`DiagnosticInput`] into a self-contained
//! [`DiagnosticOutput`]: the selected regime's tax, a three-row regime
//! comparison, a recommendation, an audit trail, post-reform scenarios and
//! the rendered narrative.
//!
//! ## Modules
//!
//! - `profile`: request normalization with recorded defaults.
//! - `eligibility`: OK / WARNING / BLOCKED per regime.
//! - `comparator`: calculators plus eligibility, one row per regime.
//! - `recommendation`: conservative and strategic policies.
//! - `audit_record`: sources, references, assumptions, alerts.
//! - `scenarios`: flat-rate reform simulation.
//! - `report`: plain-text narrative.
//! - `service`: [`DiagnosticService`], the pipeline.
//! - `history`: JSONL event log with report refresh.
//! - `config`: environment configuration and storage targets.
//!
//! ## Crate Policy
//!
//! - Never installs a tracing subscriber.
//! - A ruleset integrity error is never downgraded. Only calculator domain
//!   errors on non-selected regimes are absorbed, as BLOCKED rows.
//! - Reads the filesystem through `tde-ruleset` and `tde-integrity`; writes
//!   only in `history`.

pub mod audit_record;
pub mod comparator;
pub mod config;
pub mod eligibility;
pub mod error;
pub mod history;
pub mod output;
pub mod profile;
pub mod recommendation;
pub mod report;
pub mod scenarios;
pub mod service;

#[cfg(test)]
mod testing;

pub use audit_record::{AuditRecord, CalculationKind};
pub use comparator::{compare_regimes, ComparisonRow};
pub use config::{ConfigError, EngineConfig, StorageTargets};
pub use eligibility::{evaluate_eligibility, EligibilityResult};
pub use error::{EngineError, EngineResult, HistoryError};
pub use history::{EventKind, HistoryEvent, JsonlHistoryStore};
pub use output::DiagnosticOutput;
pub use profile::{CompanyProfile, DiagnosticInput};
pub use recommendation::{
    recommend, CandidatePolicy, Recommendation, RecommendationStatus, RankingEntry,
};
pub use report::{render_narrative, INTEGRITY_BANNER};
pub use scenarios::{ImpactClass, ScenarioResult};
pub use service::DiagnosticService;
