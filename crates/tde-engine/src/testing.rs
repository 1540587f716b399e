//! Fixtures backed by the ruleset shipped in `rulesets/`.

use tde_core::DEFAULT_RULESET_ID;
use tde_ruleset::{Annex, RuleFile, RulesetBundle, RulesetStore, SimplesTables};

pub fn store() -> RulesetStore {
    RulesetStore::new(concat!(env!("CARGO_MANIFEST_DIR"), "/../../rulesets"))
}

pub fn bundle() -> RulesetBundle {
    RulesetBundle::load(&store(), DEFAULT_RULESET_ID).unwrap()
}

/// Shipped Simples tables minus annex I, valid to load but unusable for it.
pub fn simples_without_annex_i() -> SimplesTables {
    let mut table = store()
        .load(DEFAULT_RULESET_ID, RuleFile::SimplesTables)
        .unwrap();
    table
        .payload_mut()
        .get_mut("anexos")
        .and_then(|v| v.as_object_mut())
        .unwrap()
        .remove(Annex::I.as_str());
    SimplesTables::from_table(&table).unwrap()
}
