//! Full diagnostics against the shipped ruleset and scratch copies of it.

use std::path::{Path, PathBuf};

use serde_json::Value;
use tde_core::{EligibilityStatus, RegimeCode, Timestamp, DEFAULT_RULESET_ID};
use tde_engine::{
    DiagnosticInput, DiagnosticService, EngineError, EventKind, JsonlHistoryStore,
    RecommendationStatus, INTEGRITY_BANNER,
};
use tde_integrity::IntegrityStatus;
use tde_regimes::RegimeDetail;
use tde_ruleset::RulesetStore;

fn rulesets_root() -> PathBuf {
    PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/../../rulesets"))
}

fn copy_dir(from: &Path, to: &Path) {
    std::fs::create_dir_all(to).unwrap();
    for entry in std::fs::read_dir(from).unwrap() {
        let entry = entry.unwrap();
        let target = to.join(entry.file_name());
        if entry.file_type().unwrap().is_dir() {
            copy_dir(&entry.path(), &target);
        } else {
            std::fs::copy(entry.path(), target).unwrap();
        }
    }
}

/// Scratch rulesets root holding a copy of the shipped ruleset.
fn scratch() -> (tempfile::TempDir, PathBuf) {
    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path().join(DEFAULT_RULESET_ID);
    copy_dir(&rulesets_root().join(DEFAULT_RULESET_ID), &dir);
    (tmp, dir)
}

fn edit_json(path: &Path, f: impl FnOnce(&mut serde_json::Map<String, Value>)) {
    let mut value: Value = serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
    f(value.as_object_mut().unwrap());
    std::fs::write(path, serde_json::to_string_pretty(&value).unwrap()).unwrap();
}

fn service_at(root: &Path) -> DiagnosticService {
    DiagnosticService::new(RulesetStore::new(root), DEFAULT_RULESET_ID)
}

fn at() -> Timestamp {
    Timestamp::parse("2026-05-10T09:30:00Z").unwrap()
}

fn real_input() -> DiagnosticInput {
    DiagnosticInput {
        nome_empresa: "Industria Exemplo".into(),
        receita_anual: 1_000_000.0,
        regime: "Lucro Real".into(),
        margem_lucro: Some(0.10),
        ..Default::default()
    }
}

#[test]
fn simples_annex_i_reference_scenario() {
    let out = service_at(&rulesets_root())
        .run_at(
            &DiagnosticInput {
                nome_empresa: "Loja".into(),
                receita_anual: 360_000.0,
                regime: "SIMPLES".into(),
                anexo_simples: Some("i".into()),
                ..Default::default()
            },
            at(),
        )
        .unwrap();

    let RegimeDetail::Simples(detail) = &out.detalhes_regime else {
        panic!("expected Simples detail");
    };
    assert!((detail.aliquota_efetiva - 0.0565).abs() < 1e-9);
    assert!((out.imposto_atual - 20_340.0).abs() < 1e-6);
    let das_total: f64 = detail.breakdown_das.values().sum();
    assert!((das_total - out.imposto_atual).abs() < 1e-6);

    assert_eq!(out.regime, RegimeCode::Simples);
    assert_eq!(out.comparison[0].eligibility_status, EligibilityStatus::Ok);
    assert_eq!(out.recommendation.status, RecommendationStatus::Recomendada);
    assert_eq!(out.recommendation.regime_recomendado, Some(RegimeCode::Simples));
}

#[test]
fn real_reference_scenario_and_audit_trail() {
    let out = service_at(&rulesets_root()).run_at(&real_input(), at()).unwrap();
    assert!((out.imposto_atual - 116_500.0).abs() < 1e-6);
    assert_eq!(out.audit.integrity.status, IntegrityStatus::Pass);
    assert_eq!(out.audit.integrity.difference_count, 0);
    assert!(!out.audit.references.is_empty());
    assert!(!out.relatorio_texto.contains(INTEGRITY_BANNER));
    assert!(out
        .relatorio_texto
        .contains("Relatório gerado em: 10/05/2026 09:30:00"));
}

#[test]
fn edited_leaf_fails_integrity_but_diagnostic_continues() {
    let (tmp, dir) = scratch();
    edit_json(&dir.join("real_params.json"), |m| {
        m.insert("irpj".into(), Value::from(0.16));
    });

    let out = service_at(tmp.path()).run_at(&real_input(), at()).unwrap();
    assert_eq!(out.audit.integrity.status, IntegrityStatus::Fail);
    assert_eq!(out.audit.integrity.difference_count, 1);
    assert!((out.imposto_atual - 117_500.0).abs() < 1e-6);
    assert!(out.relatorio_texto.starts_with(INTEGRITY_BANNER));
    assert!(out
        .audit
        .alerts
        .iter()
        .any(|a| a.starts_with("Integridade do ruleset/baseline em FAIL")));
}

#[test]
fn missing_rule_key_aborts_with_structured_error() {
    let (tmp, dir) = scratch();
    edit_json(&dir.join("real_params.json"), |m| {
        m.remove("csll");
    });

    let err = service_at(tmp.path()).run_at(&real_input(), at()).unwrap_err();
    assert!(matches!(err, EngineError::Ruleset(_)));
    let msg = err.to_string();
    assert!(msg.starts_with("ruleset_id=BR_TAX_2026_V1 | arquivo=real_params.json | chave=csll"));
}

#[test]
fn missing_reform_scenarios_are_fatal_without_custom_rates() {
    let (tmp, dir) = scratch();
    edit_json(&dir.join("metadata.json"), |m| {
        m.remove("cenarios_reforma");
    });
    let service = service_at(tmp.path());

    let err = service.run_at(&real_input(), at()).unwrap_err();
    assert!(matches!(err, EngineError::Ruleset(ref e) if e.key == "cenarios_reforma"));

    let mut custom = real_input();
    custom.cenarios = Some([("Proprio".to_string(), 0.2)].into_iter().collect());
    assert_eq!(service.run_at(&custom, at()).unwrap().resultados.len(), 1);
}

#[test]
fn history_round_trip_with_refresh() {
    let tmp = tempfile::tempdir().unwrap();
    let history = JsonlHistoryStore::new(tmp.path().join("data/history.jsonl"));
    let out = service_at(&rulesets_root()).run_at(&real_input(), at()).unwrap();
    let stored = history.append(&out).unwrap();

    let mut file = std::fs::OpenOptions::new()
        .append(true)
        .open(history.path())
        .unwrap();
    std::io::Write::write_all(&mut file, b"{not json}\n").unwrap();

    let listed = history.list(None).unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].uuid, out.id);
    assert_eq!(listed[0].output.relatorio_texto, out.relatorio_texto);

    let refreshed = history.refresh(&stored.uuid, at()).unwrap();
    assert_eq!(refreshed.evento_tipo, EventKind::ReportRefresh);
    assert_eq!(refreshed.origem, Some(stored.uuid));
    assert_eq!(refreshed.output.relatorio_texto, out.relatorio_texto);
    assert!((refreshed.output.imposto_atual - out.imposto_atual).abs() < 1e-6);

    let listed = history.list(None).unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].uuid, refreshed.uuid);
}
