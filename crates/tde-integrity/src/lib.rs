//! # tde-integrity — Ruleset Integrity Auditor
//!
//! Decides whether the rule data of a ruleset can be trusted. The audit
//! never stops at the first defect: it returns a complete list of named
//! checks, every divergent JSON path against the frozen baseline, and the
//! canonical hashes of both sets.
//!
//! ## Modules
//!
//! - `check`: the `IntegrityCheck` record (`[PASS] <Section>: <what>`).
//! - `structural`: per-file contracts on raw payloads.
//! - `sentinel`: pinned Simples bracket constants from `metadata.json`.
//! - `hash`: per-file and composite SHA-256 over canonical JSON.
//! - `diff`: recursive baseline/live diff with `$.file.key[i]` paths.
//! - `audit`: orchestration, overall status and the short summary.
//! - `report`: plain-text report and file writer.
//!
//! ## Crate Policy
//!
//! - A FAIL status is data, not an error. `IntegrityError` is reserved for
//!   audits that cannot run (missing files, unwritable report directory).
//! - Only `metadata.json` and the six audited files are read; the live
//!   files are never modified.

pub mod audit;
pub mod check;
pub mod diff;
pub mod error;
pub mod hash;
pub mod report;
pub mod sentinel;
pub mod structural;

pub use audit::{audit_ruleset, audit_ruleset_at, IntegrityAudit, IntegrityStatus, IntegritySummary};
pub use check::{CheckStatus, IntegrityCheck};
pub use diff::{diff_json, DiffKind, JsonDifference};
pub use error::{IntegrityError, IntegrityResult};
pub use hash::{composite_hash, file_hash, FileHashes};
pub use report::{render_report, write_report, REPORT_TITLE};
