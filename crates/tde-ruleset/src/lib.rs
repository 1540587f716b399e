//! # tde-ruleset — Versioned Rule Packs
//!
//! A ruleset is a directory of JSON rule files named after its id:
//!
//! ```text
//! rulesets/BR_TAX_2026_V1/
//!   metadata.json
//!   simples_tables.json      presumido_params.json   real_params.json
//!   eligibility_rules.json   regime_catalog.json     thresholds.json
//!   evidence/baseline_<file>.json   (frozen mirror of each audited file)
//! ```
//!
//! ## Layers
//!
//! - [`RulesetStore`] (`store.rs`): cached, copy-on-read access to raw
//!   [`RuleTable`]s and their baselines. Construct once, clone to share.
//! - [`RuleContext`] (`table.rs`): required-key accessors that turn a missing
//!   or mistyped entry into a [`tde_core::RulesetIntegrityError`].
//! - Typed views (`simples.rs`, `presumido.rs`, `real.rs`,
//!   `eligibility.rs`, `metadata.rs`): validated parameter structs the
//!   calculators consume. [`RulesetBundle`] loads all of them at once.
//!
//! ## Crate Policy
//!
//! - Depends only on `tde-core` internally.
//! - Never installs a tracing subscriber; emits `debug!` on cache misses.

pub mod bundle;
pub mod eligibility;
pub mod error;
pub mod file;
pub mod metadata;
pub mod parser;
pub mod presumido;
pub mod real;
pub mod simples;
pub mod store;
pub mod table;

pub use bundle::RulesetBundle;
pub use eligibility::EligibilityRules;
pub use error::{RulesetError, RulesetResult};
pub use file::RuleFile;
pub use metadata::{MetadataSubset, RulesetMetadata, SimplesSentinel};
pub use presumido::{ActivityResolution, ActivitySource, ActivityType, PresumidoParams};
pub use real::RealParams;
pub use simples::{
    normalize_annex_code, Annex, AnnexSelection, Bracket, SimplesTables, TaxShares, Tributo,
    SHARE_SUM_TOLERANCE,
};
pub use store::{BaselineSnapshot, RulesetStore};
pub use table::{RuleContext, RuleTable};
