//! Rule file catalog.
//!
//! A ruleset is a directory named after its id. Each [`RuleFile`] variant is
//! one JSON file in that directory; the six audited files also have a frozen
//! mirror under `evidence/baseline_<file>`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleFile {
    Metadata,
    SimplesTables,
    PresumidoParams,
    RealParams,
    EligibilityRules,
    RegimeCatalog,
    Thresholds,
}

impl RuleFile {
    pub fn all() -> &'static [RuleFile] {
        &[
            Self::Metadata,
            Self::SimplesTables,
            Self::PresumidoParams,
            Self::RealParams,
            Self::EligibilityRules,
            Self::RegimeCatalog,
            Self::Thresholds,
        ]
    }

    /// Files covered by baseline parity, in audit order.
    pub fn audited() -> &'static [RuleFile] {
        &[
            Self::SimplesTables,
            Self::PresumidoParams,
            Self::RealParams,
            Self::EligibilityRules,
            Self::RegimeCatalog,
            Self::Thresholds,
        ]
    }

    pub fn file_name(&self) -> &'static str {
        match self {
            Self::Metadata => "metadata.json",
            Self::SimplesTables => "simples_tables.json",
            Self::PresumidoParams => "presumido_params.json",
            Self::RealParams => "real_params.json",
            Self::EligibilityRules => "eligibility_rules.json",
            Self::RegimeCatalog => "regime_catalog.json",
            Self::Thresholds => "thresholds.json",
        }
    }

    /// Path of the frozen mirror, relative to the ruleset directory.
    pub fn baseline_path(&self) -> String {
        format!("evidence/baseline_{}", self.file_name())
    }
}

impl std::fmt::Display for RuleFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.file_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn audited_files_exclude_metadata() {
        assert_eq!(RuleFile::audited().len(), 6);
        assert!(!RuleFile::audited().contains(&RuleFile::Metadata));
    }

    #[test]
    fn baseline_path_mirrors_file_name() {
        assert_eq!(
            RuleFile::SimplesTables.baseline_path(),
            "evidence/baseline_simples_tables.json"
        );
    }
}
