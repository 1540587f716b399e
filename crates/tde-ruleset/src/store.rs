//! # Ruleset Store — Cached, Copy-on-Read Rule Packs
//!
//! One store is constructed per process and injected wherever rule data is
//! needed. It owns a cache keyed by `(ruleset_id, file, snapshot)`.
//!
//! ## Invariants
//!
//! - Cache entries are immutable once inserted.
//! - Every read returns an independent deep copy. No caller can corrupt the
//!   cached instance.
//! - A cold miss performs exactly one local file read. Concurrent misses
//!   for the same key may both read the file; the first insert wins and
//!   both callers receive a copy of the same cached value.
//! - Baseline snapshots are cached separately from live files and are
//!   never handed to calculators.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::{Map, Value};

use crate::error::{RulesetError, RulesetResult};
use crate::file::RuleFile;
use crate::parser::load_json_object;
use crate::table::RuleTable;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Snapshot {
    Live,
    Baseline,
}

type CacheKey = (String, RuleFile, Snapshot);

/// Filesystem-backed rule pack store.
///
/// Cloning is cheap; clones share the cache.
#[derive(Debug, Clone)]
pub struct RulesetStore {
    root: PathBuf,
    cache: Arc<RwLock<HashMap<CacheKey, Arc<Map<String, Value>>>>>,
}

impl RulesetStore {
    /// Create a store rooted at a directory holding one sub-directory per
    /// ruleset id.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            cache: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory of a ruleset. Does not check existence.
    pub fn ruleset_dir(&self, ruleset_id: &str) -> PathBuf {
        self.root.join(ruleset_id)
    }

    /// Load a live rule file.
    pub fn load(&self, ruleset_id: &str, file: RuleFile) -> RulesetResult<RuleTable> {
        self.fetch(ruleset_id, file, Snapshot::Live)
    }

    /// Load the frozen baseline mirror of a rule file.
    pub fn load_baseline(&self, ruleset_id: &str, file: RuleFile) -> RulesetResult<RuleTable> {
        self.fetch(ruleset_id, file, Snapshot::Baseline)
    }

    /// Load every audited file from both the live set and the baseline set.
    pub fn load_audit_pair(
        &self,
        ruleset_id: &str,
    ) -> RulesetResult<(BTreeMap<RuleFile, RuleTable>, BaselineSnapshot)> {
        let mut live = BTreeMap::new();
        let mut baseline = BTreeMap::new();
        for &file in RuleFile::audited() {
            live.insert(file, self.load(ruleset_id, file)?);
            baseline.insert(file, self.load_baseline(ruleset_id, file)?);
        }
        Ok((
            live,
            BaselineSnapshot {
                ruleset_id: ruleset_id.to_string(),
                files: baseline,
            },
        ))
    }

    /// Ids of every directory under the root that contains a `metadata.json`.
    pub fn list_rulesets(&self) -> RulesetResult<Vec<String>> {
        let entries = std::fs::read_dir(&self.root).map_err(|e| RulesetError::Io {
            path: self.root.clone(),
            source: e,
        })?;
        let mut ids: Vec<String> = entries
            .filter_map(Result::ok)
            .filter(|entry| entry.path().join(RuleFile::Metadata.file_name()).is_file())
            .filter_map(|entry| entry.file_name().to_str().map(str::to_string))
            .collect();
        ids.sort();
        Ok(ids)
    }

    /// Drop every cached entry. Subsequent reads go back to disk.
    pub fn clear(&self) {
        self.cache.write().clear();
    }

    /// Number of cached entries (live and baseline).
    pub fn cached_entries(&self) -> usize {
        self.cache.read().len()
    }

    fn fetch(
        &self,
        ruleset_id: &str,
        file: RuleFile,
        snapshot: Snapshot,
    ) -> RulesetResult<RuleTable> {
        let key: CacheKey = (ruleset_id.to_string(), file, snapshot);
        if let Some(cached) = self.cache.read().get(&key) {
            return Ok(RuleTable::new(ruleset_id, file, (**cached).clone()));
        }

        let dir = self.resolve_dir(ruleset_id)?;
        let path = match snapshot {
            Snapshot::Live => dir.join(file.file_name()),
            Snapshot::Baseline => dir.join(file.baseline_path()),
        };
        tracing::debug!(ruleset_id, file = %file, ?snapshot, path = %path.display(), "ruleset cache miss");
        let payload = Arc::new(load_json_object(&path)?);

        let mut cache = self.cache.write();
        let entry = cache.entry(key).or_insert(payload);
        Ok(RuleTable::new(ruleset_id, file, (**entry).clone()))
    }

    fn resolve_dir(&self, ruleset_id: &str) -> RulesetResult<PathBuf> {
        let dir = self.ruleset_dir(ruleset_id);
        let well_formed = !ruleset_id.is_empty()
            && !ruleset_id.contains(|c: char| c == '/' || c == '\\')
            && ruleset_id != "."
            && ruleset_id != "..";
        if !well_formed || !dir.is_dir() {
            return Err(RulesetError::RulesetNotFound {
                ruleset_id: ruleset_id.to_string(),
                path: dir,
            });
        }
        Ok(dir)
    }
}

/// Frozen copy of each audited rule file. Used only for integrity
/// comparison, never for computation.
#[derive(Debug, Clone)]
pub struct BaselineSnapshot {
    pub ruleset_id: String,
    pub files: BTreeMap<RuleFile, RuleTable>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn seed(dir: &Path, id: &str) {
        let rs = dir.join(id);
        std::fs::create_dir_all(rs.join("evidence")).unwrap();
        std::fs::write(rs.join("metadata.json"), r#"{"ruleset_id": "T1"}"#).unwrap();
        std::fs::write(rs.join("real_params.json"), r#"{"irpj": 0.15}"#).unwrap();
        std::fs::write(
            rs.join("evidence/baseline_real_params.json"),
            r#"{"irpj": 0.15}"#,
        )
        .unwrap();
    }

    #[test]
    fn load_returns_independent_copies() {
        let tmp = tempfile::tempdir().unwrap();
        seed(tmp.path(), "T1");
        let store = RulesetStore::new(tmp.path());

        let mut first = store.load("T1", RuleFile::RealParams).unwrap();
        first.payload_mut().insert("irpj".into(), json!(0.99));

        let second = store.load("T1", RuleFile::RealParams).unwrap();
        assert_eq!(second.get("irpj"), Some(&json!(0.15)));
    }

    #[test]
    fn cache_serves_second_read_without_disk() {
        let tmp = tempfile::tempdir().unwrap();
        seed(tmp.path(), "T1");
        let store = RulesetStore::new(tmp.path());

        store.load("T1", RuleFile::RealParams).unwrap();
        std::fs::remove_file(tmp.path().join("T1/real_params.json")).unwrap();
        assert!(store.load("T1", RuleFile::RealParams).is_ok());

        store.clear();
        assert!(matches!(
            store.load("T1", RuleFile::RealParams),
            Err(RulesetError::FileNotFound { .. })
        ));
    }

    #[test]
    fn baseline_and_live_are_cached_separately() {
        let tmp = tempfile::tempdir().unwrap();
        seed(tmp.path(), "T1");
        let store = RulesetStore::new(tmp.path());
        store.load("T1", RuleFile::RealParams).unwrap();
        store.load_baseline("T1", RuleFile::RealParams).unwrap();
        assert_eq!(store.cached_entries(), 2);
    }

    #[test]
    fn unknown_ruleset_is_not_found() {
        let tmp = tempfile::tempdir().unwrap();
        let store = RulesetStore::new(tmp.path());
        assert!(matches!(
            store.load("NOPE", RuleFile::Metadata),
            Err(RulesetError::RulesetNotFound { .. })
        ));
        assert!(matches!(
            store.load("../etc", RuleFile::Metadata),
            Err(RulesetError::RulesetNotFound { .. })
        ));
    }

    #[test]
    fn list_rulesets_requires_metadata() {
        let tmp = tempfile::tempdir().unwrap();
        seed(tmp.path(), "T1");
        std::fs::create_dir_all(tmp.path().join("scratch")).unwrap();
        let store = RulesetStore::new(tmp.path());
        assert_eq!(store.list_rulesets().unwrap(), vec!["T1".to_string()]);
    }

    #[test]
    fn concurrent_readers_share_one_entry() {
        let tmp = tempfile::tempdir().unwrap();
        seed(tmp.path(), "T1");
        let store = RulesetStore::new(tmp.path());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                std::thread::spawn(move || store.load("T1", RuleFile::RealParams).unwrap())
            })
            .collect();
        for h in handles {
            assert_eq!(h.join().unwrap().get("irpj"), Some(&json!(0.15)));
        }
        assert_eq!(store.cached_entries(), 1);
    }
}
