//! Every typed view of one ruleset, loaded together.

use crate::eligibility::EligibilityRules;
use crate::error::RulesetResult;
use crate::file::RuleFile;
use crate::metadata::RulesetMetadata;
use crate::presumido::PresumidoParams;
use crate::real::RealParams;
use crate::simples::SimplesTables;
use crate::store::RulesetStore;

/// Validated parameters of one ruleset. Built per request from store
/// copies, so nothing here aliases the cache.
#[derive(Debug, Clone)]
pub struct RulesetBundle {
    pub ruleset_id: String,
    pub metadata: RulesetMetadata,
    pub simples: SimplesTables,
    pub presumido: PresumidoParams,
    pub real: RealParams,
    pub eligibility: EligibilityRules,
}

impl RulesetBundle {
    pub fn load(store: &RulesetStore, ruleset_id: &str) -> RulesetResult<Self> {
        let metadata = RulesetMetadata::try_from(store.load(ruleset_id, RuleFile::Metadata)?)?;
        let simples = SimplesTables::from_table(&store.load(ruleset_id, RuleFile::SimplesTables)?)?;
        let presumido =
            PresumidoParams::from_table(&store.load(ruleset_id, RuleFile::PresumidoParams)?)?;
        let real = RealParams::from_table(&store.load(ruleset_id, RuleFile::RealParams)?)?;
        let eligibility =
            EligibilityRules::from_table(&store.load(ruleset_id, RuleFile::EligibilityRules)?)?;
        tracing::debug!(ruleset_id, "ruleset bundle loaded");
        Ok(Self {
            ruleset_id: ruleset_id.to_string(),
            metadata,
            simples,
            presumido,
            real,
            eligibility,
        })
    }
}
