//! # tde-cli — Command-Line Front End
//!
//! Provides the `tde` binary on top of `tde-engine`.
//!
//! ## Subcommands
//!
//! - `tde diagnose`: Run one diagnostic from a JSON request.
//! - `tde audit`: Ruleset integrity audit with a written report.
//! - `tde history`: List, show and refresh stored diagnostics.
//!
//! ```bash
//! tde diagnose request.json --report
//! tde --demo audit
//! tde history list --limit 5
//! ```

pub mod audit;
pub mod diagnose;
pub mod history;

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use tde_engine::{DiagnosticService, EngineConfig, JsonlHistoryStore, StorageTargets};
use tde_ruleset::RulesetStore;

/// Options shared by every subcommand. Each one overrides its
/// environment variable.
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Rulesets root directory (overrides TDE_RULESETS_DIR).
    #[arg(long, global = true)]
    pub rulesets_dir: Option<PathBuf>,

    /// Ruleset used when a request names none (overrides TDE_RULESET_ID).
    #[arg(long, global = true)]
    pub ruleset_id: Option<String>,

    /// Use the demo history and output folders.
    #[arg(long, global = true)]
    pub demo: bool,

    /// Directory for written reports.
    #[arg(long, global = true)]
    pub output_dir: Option<PathBuf>,
}

/// Resolved configuration for one invocation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub engine: EngineConfig,
    pub storage: StorageTargets,
}

impl Settings {
    pub fn resolve(args: &GlobalArgs) -> Result<Self> {
        Ok(Self::resolve_with(args, EngineConfig::from_env()?))
    }

    /// Apply command-line overrides on top of `engine`.
    pub fn resolve_with(args: &GlobalArgs, mut engine: EngineConfig) -> Self {
        if let Some(dir) = &args.rulesets_dir {
            engine.rulesets_dir = dir.clone();
        }
        if let Some(id) = &args.ruleset_id {
            engine.default_ruleset_id = id.clone();
        }
        engine.demo |= args.demo;

        let mut storage = engine.storage();
        if let Some(dir) = &args.output_dir {
            storage.outputs_dir = dir.clone();
        }
        Self { engine, storage }
    }

    pub fn store(&self) -> RulesetStore {
        RulesetStore::new(self.engine.rulesets_dir.clone())
    }

    pub fn service(&self) -> DiagnosticService {
        DiagnosticService::from_config(&self.engine)
    }

    pub fn history(&self) -> JsonlHistoryStore {
        JsonlHistoryStore::new(self.storage.history_file.clone())
    }
}
