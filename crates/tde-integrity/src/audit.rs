//! # Ruleset Audit — Structure, Sentinels and Baseline Parity
//!
//! [`audit_ruleset`] runs two independent passes over one ruleset:
//!
//! 1. Structural validation of each audited file plus the metadata
//!    sentinels.
//! 2. Baseline parity: per-file canonical hashes, composite hashes, and a
//!    full structural diff of every live file against its
//!    `evidence/baseline_*.json` mirror.
//!
//! The overall status is PASS only when every check passes and the diff
//! list is empty. A FAIL is not an error: callers keep computing and
//! surface it as an alert.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tde_core::Timestamp;
use tde_ruleset::{MetadataSubset, RuleFile, RuleTable, RulesetMetadata, RulesetStore};

use crate::check::IntegrityCheck;
use crate::diff::{diff_json, JsonDifference};
use crate::error::{IntegrityError, IntegrityResult};
use crate::hash::{composite_hash, file_hash, FileHashes};
use crate::sentinel::check_simples_sentinels;
use crate::structural::{
    validate_eligibility, validate_real_ranges, validate_regime_catalog, validate_required_keys,
    validate_simples, validate_thresholds, PRESUMIDO_REQUIRED_KEYS, REAL_REQUIRED_KEYS,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum IntegrityStatus {
    Pass,
    Fail,
}

impl IntegrityStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pass => "PASS",
            Self::Fail => "FAIL",
        }
    }

    pub fn is_pass(&self) -> bool {
        matches!(self, Self::Pass)
    }
}

impl std::fmt::Display for IntegrityStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Full result of one audit run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntegrityAudit {
    pub ruleset_id: String,
    pub timestamp: Timestamp,
    pub metadata: MetadataSubset,
    pub checked_files: Vec<String>,
    pub ruleset_file_hashes: FileHashes,
    pub baseline_file_hashes: FileHashes,
    pub ruleset_hash: String,
    pub baseline_hash: String,
    pub status: IntegrityStatus,
    pub checks: Vec<IntegrityCheck>,
    pub json_differences: Vec<JsonDifference>,
    pub warnings: Vec<String>,
}

impl IntegrityAudit {
    pub fn failures(&self) -> impl Iterator<Item = &IntegrityCheck> {
        self.checks.iter().filter(|c| !c.passed())
    }

    pub fn summary(&self) -> IntegritySummary {
        IntegritySummary {
            status: self.status,
            ruleset_hash: self.ruleset_hash.clone(),
            baseline_hash: self.baseline_hash.clone(),
            checked_files: self.checked_files.clone(),
            difference_count: self.json_differences.len(),
            failed_checks: self.failures().count(),
            warning_count: self.warnings.len(),
        }
    }
}

/// Short form attached to every diagnostic audit record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegritySummary {
    pub status: IntegrityStatus,
    pub ruleset_hash: String,
    pub baseline_hash: String,
    pub checked_files: Vec<String>,
    pub difference_count: usize,
    pub failed_checks: usize,
    pub warning_count: usize,
}

/// Audit `ruleset_id`, stamped with the current time.
pub fn audit_ruleset(store: &RulesetStore, ruleset_id: &str) -> IntegrityResult<IntegrityAudit> {
    audit_ruleset_at(store, ruleset_id, Timestamp::now())
}

/// Audit `ruleset_id` with an explicit timestamp.
pub fn audit_ruleset_at(
    store: &RulesetStore,
    ruleset_id: &str,
    timestamp: Timestamp,
) -> IntegrityResult<IntegrityAudit> {
    let metadata = RulesetMetadata::try_from(store.load(ruleset_id, RuleFile::Metadata)?)?;
    let (live, baseline) = store.load_audit_pair(ruleset_id)?;

    let empty = Map::new();
    let live_payload = |file: RuleFile| live.get(&file).map(RuleTable::payload).unwrap_or(&empty);

    let mut checks = Vec::new();
    let mut warnings = Vec::new();

    let simples = live_payload(RuleFile::SimplesTables);
    checks.extend(validate_simples(simples));
    match metadata.simples_sentinels() {
        Ok(sentinels) => checks.extend(check_simples_sentinels(&sentinels, simples)),
        Err(e) => checks.push(IntegrityCheck::fail_with_detail(
            "Sentinela Simples: estrutura",
            e.to_string(),
        )),
    }
    checks.extend(validate_required_keys(
        live_payload(RuleFile::PresumidoParams),
        "Presumido",
        PRESUMIDO_REQUIRED_KEYS,
    ));
    let real = live_payload(RuleFile::RealParams);
    checks.extend(validate_required_keys(real, "Real", REAL_REQUIRED_KEYS));
    let (range_checks, real_warnings) = validate_real_ranges(real);
    checks.extend(range_checks);
    warnings.extend(real_warnings);
    checks.extend(validate_eligibility(live_payload(RuleFile::EligibilityRules)));
    checks.extend(validate_regime_catalog(live_payload(RuleFile::RegimeCatalog)));
    checks.extend(validate_thresholds(live_payload(RuleFile::Thresholds)));

    let mut json_differences = Vec::new();
    let mut ruleset_file_hashes = FileHashes::new();
    let mut baseline_file_hashes = FileHashes::new();
    for &file in RuleFile::audited() {
        let name = file.file_name();
        let live_map = live_payload(file);
        let base_map = baseline
            .files
            .get(&file)
            .map(RuleTable::payload)
            .unwrap_or(&empty);

        let hash = |payload: &Map<String, Value>| {
            file_hash(payload).map_err(|source| IntegrityError::Canonicalization {
                file: name.to_string(),
                source,
            })
        };
        ruleset_file_hashes.insert(name.to_string(), hash(live_map)?);
        baseline_file_hashes.insert(name.to_string(), hash(base_map)?);

        let diffs = diff_json(
            &Value::Object(base_map.clone()),
            &Value::Object(live_map.clone()),
            &format!("$.{name}"),
        );
        let check_name = format!("Baseline parity: {name}");
        if diffs.is_empty() {
            checks.push(IntegrityCheck::pass(check_name));
        } else {
            checks.push(IntegrityCheck::fail(
                check_name,
                "igual ao baseline",
                format!("{} divergencia(s)", diffs.len()),
            ));
            json_differences.extend(diffs);
        }
    }

    let composite = |hashes: &FileHashes, label: &str| {
        composite_hash(hashes).map_err(|source| IntegrityError::Canonicalization {
            file: label.to_string(),
            source,
        })
    };
    let ruleset_hash = composite(&ruleset_file_hashes, "<composite ruleset>")?;
    let baseline_hash = composite(&baseline_file_hashes, "<composite baseline>")?;

    let status = if checks.iter().all(IntegrityCheck::passed) && json_differences.is_empty() {
        IntegrityStatus::Pass
    } else {
        IntegrityStatus::Fail
    };

    let audit = IntegrityAudit {
        ruleset_id: ruleset_id.to_string(),
        timestamp,
        metadata: metadata.subset(),
        checked_files: RuleFile::audited()
            .iter()
            .map(|f| f.file_name().to_string())
            .collect(),
        ruleset_file_hashes,
        baseline_file_hashes,
        ruleset_hash,
        baseline_hash,
        status,
        checks,
        json_differences,
        warnings,
    };

    tracing::info!(
        ruleset_id,
        status = %audit.status,
        differences = audit.json_differences.len(),
        checks = audit.checks.len(),
        "ruleset integrity audit completed"
    );
    if !status.is_pass() {
        tracing::warn!(
            ruleset_id,
            failed_checks = audit.failures().count(),
            differences = audit.json_differences.len(),
            "ruleset integrity FAIL"
        );
    }
    Ok(audit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn seed_ruleset(root: &std::path::Path) {
        let dir = root.join("T1");
        std::fs::create_dir_all(dir.join("evidence")).unwrap();
        std::fs::write(dir.join("metadata.json"), r#"{"ruleset_id": "T1"}"#).unwrap();
        for &file in RuleFile::audited() {
            std::fs::write(dir.join(file.file_name()), "{}").unwrap();
            std::fs::write(dir.join(file.baseline_path()), "{}").unwrap();
        }
    }

    #[test]
    fn empty_files_audit_as_fail_without_error() {
        let tmp = tempfile::tempdir().unwrap();
        seed_ruleset(tmp.path());
        let store = RulesetStore::new(tmp.path());
        let audit = audit_ruleset(&store, "T1").unwrap();
        assert_eq!(audit.status, IntegrityStatus::Fail);
        assert!(audit.json_differences.is_empty());
        assert_eq!(audit.ruleset_hash, audit.baseline_hash);
        assert_eq!(audit.checked_files.len(), 6);
        assert!(audit
            .failures()
            .any(|c| c.name == "Presumido: chave obrigatoria 'pis'"));
        assert!(audit
            .checks
            .iter()
            .filter(|c| c.name.starts_with("Baseline parity"))
            .all(IntegrityCheck::passed));
    }

    #[test]
    fn missing_baseline_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        seed_ruleset(tmp.path());
        std::fs::remove_file(tmp.path().join("T1/evidence/baseline_thresholds.json")).unwrap();
        let store = RulesetStore::new(tmp.path());
        assert!(matches!(
            audit_ruleset(&store, "T1"),
            Err(IntegrityError::Ruleset(_))
        ));
    }

    #[test]
    fn summary_counts() {
        let tmp = tempfile::tempdir().unwrap();
        seed_ruleset(tmp.path());
        std::fs::write(tmp.path().join("T1/real_params.json"), r#"{"irpj": 0.15}"#).unwrap();
        let store = RulesetStore::new(tmp.path());
        let audit = audit_ruleset(&store, "T1").unwrap();
        let summary = audit.summary();
        assert_eq!(summary.difference_count, 1);
        assert_eq!(summary.status, IntegrityStatus::Fail);
        assert_ne!(summary.ruleset_hash, summary.baseline_hash);
        assert_eq!(
            serde_json::to_value(&summary).unwrap()["status"],
            json!("FAIL")
        );
    }
}
