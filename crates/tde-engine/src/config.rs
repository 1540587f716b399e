//! Engine configuration.
//!
//! Defaults suit a checkout of this repository. Override via environment
//! variables or explicit construction for tests and demos.

use std::path::{Path, PathBuf};

use tde_core::DEFAULT_RULESET_ID;

/// Where rulesets live and which one a request gets by default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Root directory holding one sub-directory per ruleset id.
    pub rulesets_dir: PathBuf,
    /// Ruleset used when the request names none.
    pub default_ruleset_id: String,
    /// Route history and report files to the demo folders.
    pub demo: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            rulesets_dir: PathBuf::from("rulesets"),
            default_ruleset_id: DEFAULT_RULESET_ID.to_string(),
            demo: false,
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `TDE_RULESETS_DIR` (default: `rulesets`)
    /// - `TDE_RULESET_ID` (default: `BR_TAX_2026_V1`)
    /// - `TDE_DEMO` (default: off; `1`, `true`, `yes`, `on` enable it)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let non_blank = |var: &str| lookup(var).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let demo = match lookup("TDE_DEMO") {
            Some(raw) => parse_flag("TDE_DEMO", &raw)?,
            None => defaults.demo,
        };

        Ok(Self {
            rulesets_dir: non_blank("TDE_RULESETS_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.rulesets_dir),
            default_ruleset_id: non_blank("TDE_RULESET_ID").unwrap_or(defaults.default_ruleset_id),
            demo,
        })
    }

    pub fn storage(&self) -> StorageTargets {
        StorageTargets::resolve(self.demo)
    }
}

/// Files written outside the ruleset tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageTargets {
    pub history_file: PathBuf,
    pub outputs_dir: PathBuf,
}

impl StorageTargets {
    pub fn resolve(demo: bool) -> Self {
        let (data, outputs) = if demo {
            ("data_demo", "outputs_demo")
        } else {
            ("data", "outputs")
        };
        Self {
            history_file: Path::new(data).join("history.jsonl"),
            outputs_dir: PathBuf::from(outputs),
        }
    }

    /// Re-root both targets under `base`.
    pub fn under(&self, base: &Path) -> Self {
        Self {
            history_file: base.join(&self.history_file),
            outputs_dir: base.join(&self.outputs_dir),
        }
    }
}

fn parse_flag(var: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "" | "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidFlag {
            var: var.to_string(),
            value: raw.to_string(),
        }),
    }
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid boolean for {var}: {value:?} (use 1/0, true/false, yes/no, on/off)")]
    InvalidFlag { var: String, value: String },
}
