//! Fixtures backed by the ruleset shipped in `rulesets/`.

use tde_core::DEFAULT_RULESET_ID;
use tde_ruleset::{
    Annex, PresumidoParams, RealParams, RuleFile, RuleTable, RulesetStore, SimplesTables,
};

pub fn store() -> RulesetStore {
    RulesetStore::new(concat!(env!("CARGO_MANIFEST_DIR"), "/../../rulesets"))
}

fn load(file: RuleFile) -> RuleTable {
    store().load(DEFAULT_RULESET_ID, file).unwrap()
}

pub fn simples_tables() -> SimplesTables {
    SimplesTables::from_table(&load(RuleFile::SimplesTables)).unwrap()
}

pub fn simples_tables_without(annex: Annex) -> SimplesTables {
    let mut table = load(RuleFile::SimplesTables);
    table
        .payload_mut()
        .get_mut("anexos")
        .and_then(|v| v.as_object_mut())
        .unwrap()
        .remove(annex.as_str());
    SimplesTables::from_table(&table).unwrap()
}

pub fn presumido_params() -> PresumidoParams {
    PresumidoParams::from_table(&load(RuleFile::PresumidoParams)).unwrap()
}

pub fn real_params() -> RealParams {
    RealParams::from_table(&load(RuleFile::RealParams)).unwrap()
}
