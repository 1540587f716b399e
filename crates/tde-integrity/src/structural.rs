//! # Structural Validation
//!
//! Per-file contracts checked on the raw JSON payloads. Unlike the typed
//! views in `tde-ruleset`, which stop at the first defect with a fatal
//! error, every function here keeps going and reports each defect as a
//! failed [`IntegrityCheck`].
//!
//! ## Contracts
//!
//! | File | Checked |
//! |------|---------|
//! | `simples_tables.json` | eligibility ceiling, share base, Fator R threshold, five annexes of six brackets, non-negative values, strictly increasing ceilings, shares summing to 1 |
//! | `presumido_params.json` | required top-level keys |
//! | `real_params.json` | required top-level keys, rates in [0, 1] |
//! | `eligibility_rules.json` | one section per regime, positive ceilings, warnings list |
//! | `regime_catalog.json` | item keys, unique codes, the three mandatory codes |
//! | `thresholds.json` | tier keys, integer order > 0, limits strictly increasing by order |

use std::collections::BTreeSet;

use serde_json::{json, Map, Value};
use tde_core::RegimeCode;
use tde_ruleset::{Annex, Tributo, SHARE_SUM_TOLERANCE};

use crate::check::{type_label, IntegrityCheck};

/// Brackets every Simples annex must declare.
pub const BRACKETS_PER_ANNEX: usize = 6;

/// Combined non-cumulative PIS+COFINS above this is reported as a warning.
pub const PIS_COFINS_WARNING_LEVEL: f64 = 0.2;

pub const PRESUMIDO_REQUIRED_KEYS: &[&str] = &[
    "pis",
    "cofins",
    "irpj",
    "adicional_irpj",
    "csll",
    "limites_adicional_irpj",
    "percentual_presuncao",
];

pub const REAL_REQUIRED_KEYS: &[&str] = &[
    "irpj",
    "csll",
    "pis_nao_cumulativo",
    "cofins_nao_cumulativo",
];

const CATALOG_ITEM_KEYS: &[&str] = &[
    "regime_code",
    "display_name",
    "enabled",
    "requires_fields",
    "notes",
];

const THRESHOLD_ITEM_KEYS: &[&str] = &["porte", "ordem", "limite_receita_anual"];

fn non_negative(value: Option<&Value>) -> Option<f64> {
    value.and_then(Value::as_f64).filter(|v| *v >= 0.0)
}

fn shown(value: Option<&Value>) -> Value {
    value.cloned().unwrap_or(Value::Null)
}

fn strictly_increasing(values: &[f64]) -> bool {
    values.windows(2).all(|w| w[1] > w[0])
}

/// Validate `simples_tables.json`.
pub fn validate_simples(payload: &Map<String, Value>) -> Vec<IntegrityCheck> {
    let Some(annexes) = payload.get("anexos").and_then(Value::as_object) else {
        return vec![IntegrityCheck::fail(
            "Simples: estrutura anexos",
            "objeto",
            type_label(payload.get("anexos")),
        )];
    };
    let mut checks = Vec::new();

    let name = "Simples: limite_elegibilidade_simples presente e valido";
    checks.push(match non_negative(payload.get("limite_elegibilidade_simples")) {
        Some(_) => IntegrityCheck::pass(name),
        None => IntegrityCheck::fail(name, "numero >= 0", shown(payload.get("limite_elegibilidade_simples"))),
    });

    let name = "Simples: partilha_percentual_base definido como decimal_0_1";
    let base = payload.get("partilha_percentual_base");
    checks.push(if base.and_then(Value::as_str) == Some("decimal_0_1") {
        IntegrityCheck::pass(name)
    } else {
        IntegrityCheck::fail(name, "decimal_0_1", shown(base))
    });

    let name = "Simples: fator_r_limite presente e valido";
    checks.push(match non_negative(payload.get("fator_r_limite")) {
        Some(v) if v <= 1.0 => IntegrityCheck::pass(name),
        _ => IntegrityCheck::fail(name, "numero >= 0 e <= 1", shown(payload.get("fator_r_limite"))),
    });

    for annex in Annex::all() {
        validate_annex(annex.as_str(), annexes.get(annex.as_str()), &mut checks);
    }
    checks
}

fn validate_annex(code: &str, raw: Option<&Value>, checks: &mut Vec<IntegrityCheck>) {
    let Some(brackets) = raw.and_then(Value::as_array) else {
        checks.push(IntegrityCheck::fail(
            format!("Simples: anexo {code} existe"),
            format!("lista de {BRACKETS_PER_ANNEX} faixas"),
            type_label(raw),
        ));
        return;
    };

    checks.push(IntegrityCheck::compare(
        format!("Simples: anexo {code} possui {BRACKETS_PER_ANNEX} faixas"),
        brackets.len() == BRACKETS_PER_ANNEX,
        BRACKETS_PER_ANNEX,
        brackets.len(),
    ));

    let mut ceilings = Vec::with_capacity(brackets.len());
    let mut all_valid = true;
    for (idx, bracket) in brackets.iter().enumerate() {
        let n = idx + 1;
        let field = |key: &str| bracket.as_object().and_then(|b| b.get(key));

        for (key, label) in [
            ("limite_superior", "limite valido"),
            ("aliquota_nominal", "aliquota nominal valida"),
            ("parcela_deduzir", "parcela deduzir valida"),
        ] {
            match non_negative(field(key)) {
                Some(v) if key == "limite_superior" => ceilings.push(v),
                Some(_) => {}
                None => {
                    all_valid = false;
                    checks.push(IntegrityCheck::fail(
                        format!("Simples: anexo {code} faixa {n} {label}"),
                        "numero >= 0",
                        shown(field(key)),
                    ));
                }
            }
        }

        let shares = field("percentuais_partilha");
        let Some(shares) = shares.and_then(Value::as_object) else {
            all_valid = false;
            checks.push(IntegrityCheck::fail(
                format!("Simples: anexo {code} faixa {n} percentuais_partilha valido"),
                "objeto com IRPJ/CSLL/PIS/COFINS/CPP/ICMS/ISS",
                type_label(shares),
            ));
            continue;
        };

        let mut sum = 0.0;
        let mut shares_valid = true;
        for tributo in Tributo::all() {
            match non_negative(shares.get(tributo.as_str())) {
                Some(v) => sum += v,
                None => {
                    shares_valid = false;
                    checks.push(IntegrityCheck::fail(
                        format!("Simples: anexo {code} faixa {n} partilha.{tributo} valida"),
                        "numero >= 0",
                        shown(shares.get(tributo.as_str())),
                    ));
                }
            }
        }
        if shares_valid {
            checks.push(IntegrityCheck::compare(
                format!("Simples: anexo {code} faixa {n} partilha soma 1"),
                (sum - 1.0).abs() <= SHARE_SUM_TOLERANCE,
                1.0,
                sum,
            ));
        } else {
            all_valid = false;
        }
    }

    if all_valid {
        checks.push(IntegrityCheck::pass(format!(
            "Simples: anexo {code} valores nao negativos"
        )));
    }

    let name = format!("Simples: anexo {code} limites crescentes");
    if ceilings.len() == brackets.len() && strictly_increasing(&ceilings) {
        checks.push(IntegrityCheck::pass(name));
    } else {
        checks.push(IntegrityCheck::fail(name, "estritamente crescente", json!(ceilings)));
    }
}

/// One check per required top-level key.
pub fn validate_required_keys(
    payload: &Map<String, Value>,
    section: &str,
    keys: &[&str],
) -> Vec<IntegrityCheck> {
    keys.iter()
        .map(|key| {
            let name = format!("{section}: chave obrigatoria '{key}'");
            if payload.contains_key(*key) {
                IntegrityCheck::pass(name)
            } else {
                IntegrityCheck::fail(name, "presente", "ausente")
            }
        })
        .collect()
}

/// Rate ranges of `real_params.json`, plus advisory warnings.
pub fn validate_real_ranges(payload: &Map<String, Value>) -> (Vec<IntegrityCheck>, Vec<String>) {
    let checks = REAL_REQUIRED_KEYS
        .iter()
        .map(|key| {
            let name = format!("Real: faixa valida para '{key}'");
            match payload.get(*key).and_then(Value::as_f64) {
                Some(v) if (0.0..=1.0).contains(&v) => IntegrityCheck::pass(name),
                _ => IntegrityCheck::fail(name, "numero entre 0 e 1", shown(payload.get(*key))),
            }
        })
        .collect();

    let mut warnings = Vec::new();
    let pis = payload.get("pis_nao_cumulativo").and_then(Value::as_f64);
    let cofins = payload.get("cofins_nao_cumulativo").and_then(Value::as_f64);
    if let (Some(pis), Some(cofins)) = (pis, cofins) {
        let sum = pis + cofins;
        if sum > PIS_COFINS_WARNING_LEVEL {
            warnings.push(format!(
                "WARNING: Real params com soma de PIS+COFINS acima de {PIS_COFINS_WARNING_LEVEL} ({sum})."
            ));
        }
    }
    (checks, warnings)
}

/// Validate `eligibility_rules.json`.
pub fn validate_eligibility(payload: &Map<String, Value>) -> Vec<IntegrityCheck> {
    let mut checks = Vec::new();
    for section in ["simples", "presumido", "real"] {
        let name = format!("Eligibility: secao '{section}'");
        checks.push(match payload.get(section) {
            Some(Value::Object(_)) => IntegrityCheck::pass(name),
            other => IntegrityCheck::fail(name, "objeto presente", type_label(other)),
        });
    }

    let positive = |section: &str, key: &str, label: &str, checks: &mut Vec<IntegrityCheck>| {
        let Some(obj) = payload.get(section).and_then(Value::as_object) else {
            return;
        };
        let name = format!("Eligibility {label}: {key} valido");
        checks.push(match obj.get(key).and_then(Value::as_f64) {
            Some(v) if v > 0.0 => IntegrityCheck::pass(name),
            _ => IntegrityCheck::fail(name, "numero > 0", shown(obj.get(key))),
        });
    };
    positive("simples", "rbt12_max", "Simples", &mut checks);
    positive("presumido", "receita_anual_max", "Presumido", &mut checks);

    if let Some(real) = payload.get("real").and_then(Value::as_object) {
        let name = "Eligibility Real: warnings em lista";
        checks.push(match real.get("warnings") {
            Some(Value::Array(_)) => IntegrityCheck::pass(name),
            other => IntegrityCheck::fail(name, "lista", type_label(other)),
        });
    }
    checks
}

/// Validate `regime_catalog.json`.
pub fn validate_regime_catalog(payload: &Map<String, Value>) -> Vec<IntegrityCheck> {
    let items = match payload.get("regimes") {
        Some(Value::Array(items)) if !items.is_empty() => items,
        Some(Value::Array(_)) => {
            return vec![IntegrityCheck::fail("Regime catalog: regimes nao vazio", ">=1 item", 0)]
        }
        other => return vec![IntegrityCheck::fail("Regime catalog: regimes", "lista", type_label(other))],
    };

    let mut checks = Vec::new();
    let mut found = BTreeSet::new();
    let mut duplicates = BTreeSet::new();

    for (idx, item) in items.iter().enumerate() {
        let n = idx + 1;
        let Some(item) = item.as_object() else {
            checks.push(IntegrityCheck::fail(
                format!("Regime catalog: item {n} tipo"),
                "objeto",
                type_label(Some(item)),
            ));
            continue;
        };
        checks.extend(validate_required_keys(item, &format!("Regime catalog: item {n}"), CATALOG_ITEM_KEYS));

        match item.get("regime_code").and_then(Value::as_str).map(str::trim) {
            Some(code) if !code.is_empty() => {
                let code = code.to_uppercase();
                if !found.insert(code.clone()) {
                    duplicates.insert(code);
                }
            }
            _ => checks.push(IntegrityCheck::fail(
                format!("Regime catalog: item {n} regime_code valido"),
                "texto nao vazio",
                shown(item.get("regime_code")),
            )),
        }
        if !matches!(item.get("enabled"), Some(Value::Bool(_))) {
            checks.push(IntegrityCheck::fail(
                format!("Regime catalog: item {n} enabled valido"),
                "bool",
                type_label(item.get("enabled")),
            ));
        }
        if !matches!(item.get("requires_fields"), Some(Value::Array(_))) {
            checks.push(IntegrityCheck::fail(
                format!("Regime catalog: item {n} requires_fields valido"),
                "lista",
                type_label(item.get("requires_fields")),
            ));
        }
    }

    let required: BTreeSet<String> = RegimeCode::all().iter().map(|r| r.as_str().to_string()).collect();
    let missing: Vec<&String> = required.difference(&found).collect();
    let name = "Regime catalog: codigos obrigatorios";
    if missing.is_empty() {
        checks.push(IntegrityCheck::pass(name));
    } else {
        checks.push(
            IntegrityCheck::fail(name, json!(required), json!(found))
                .with_detail(format!("ausentes: {missing:?}")),
        );
    }

    let name = "Regime catalog: codigos duplicados";
    if duplicates.is_empty() {
        checks.push(IntegrityCheck::pass(name));
    } else {
        checks.push(IntegrityCheck::fail(name, "sem duplicidade", json!(duplicates)));
    }
    checks
}

/// Validate `thresholds.json`.
pub fn validate_thresholds(payload: &Map<String, Value>) -> Vec<IntegrityCheck> {
    let tiers = match payload.get("portes") {
        Some(Value::Array(tiers)) if !tiers.is_empty() => tiers,
        Some(Value::Array(_)) => {
            return vec![IntegrityCheck::fail("Thresholds: portes nao vazio", ">=1 item", 0)]
        }
        other => return vec![IntegrityCheck::fail("Thresholds: portes", "lista", type_label(other))],
    };

    let mut checks = Vec::new();
    let mut ordered: Vec<(u64, f64)> = Vec::new();
    for (idx, tier) in tiers.iter().enumerate() {
        let n = idx + 1;
        let Some(tier) = tier.as_object() else {
            checks.push(IntegrityCheck::fail(
                format!("Thresholds: item {n} tipo"),
                "objeto",
                type_label(Some(tier)),
            ));
            continue;
        };
        checks.extend(validate_required_keys(tier, &format!("Thresholds: item {n}"), THRESHOLD_ITEM_KEYS));

        let Some(order) = tier.get("ordem").and_then(Value::as_u64).filter(|o| *o > 0) else {
            checks.push(IntegrityCheck::fail(
                format!("Thresholds: item {n} ordem valida"),
                "inteiro > 0",
                shown(tier.get("ordem")),
            ));
            continue;
        };
        let Some(limit) = non_negative(tier.get("limite_receita_anual")) else {
            checks.push(IntegrityCheck::fail(
                format!("Thresholds: item {n} limite valido"),
                "numero >= 0",
                shown(tier.get("limite_receita_anual")),
            ));
            continue;
        };
        ordered.push((order, limit));
    }

    if !ordered.is_empty() {
        ordered.sort_by_key(|(order, _)| *order);
        let limits: Vec<f64> = ordered.iter().map(|(_, limit)| *limit).collect();
        let name = "Thresholds: limites crescentes por ordem";
        checks.push(if strictly_increasing(&limits) {
            IntegrityCheck::pass(name)
        } else {
            IntegrityCheck::fail(name, "estritamente crescente", json!(limits))
        });
    }
    checks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("fixture must be an object"),
        }
    }

    fn failures(checks: &[IntegrityCheck]) -> Vec<&str> {
        checks
            .iter()
            .filter(|c| !c.passed())
            .map(|c| c.name.as_str())
            .collect()
    }

    fn bracket(ceiling: f64, cpp: f64) -> Value {
        json!({
            "limite_superior": ceiling,
            "aliquota_nominal": 0.04,
            "parcela_deduzir": 0,
            "percentuais_partilha": {
                "IRPJ": 0.055, "CSLL": 0.035, "PIS": 0.0276, "COFINS": 0.1274,
                "CPP": cpp, "ICMS": 0.34, "ISS": 0
            }
        })
    }

    fn simples(annex_i: Value) -> Map<String, Value> {
        let good: Vec<Value> = (1..=6).map(|i| bracket(f64::from(i) * 1000.0, 0.415)).collect();
        object(json!({
            "limite_elegibilidade_simples": 4_800_000,
            "partilha_percentual_base": "decimal_0_1",
            "fator_r_limite": 0.28,
            "anexos": {"I": annex_i, "II": good, "III": good, "IV": good, "V": good}
        }))
    }

    #[test]
    fn well_formed_simples_passes() {
        let good: Vec<Value> = (1..=6).map(|i| bracket(f64::from(i) * 1000.0, 0.415)).collect();
        let checks = validate_simples(&simples(json!(good)));
        assert!(failures(&checks).is_empty(), "{:?}", failures(&checks));
        assert!(checks
            .iter()
            .any(|c| c.name == "Simples: anexo III faixa 4 partilha soma 1"));
    }

    #[test]
    fn bad_share_sum_and_descending_ceiling_reported() {
        let mut brackets: Vec<Value> = (1..=6).map(|i| bracket(f64::from(i) * 1000.0, 0.415)).collect();
        brackets[2] = bracket(3000.0, 0.5);
        brackets[4] = bracket(100.0, 0.415);
        let checks = validate_simples(&simples(json!(brackets)));
        assert_eq!(
            failures(&checks),
            vec![
                "Simples: anexo I faixa 3 partilha soma 1",
                "Simples: anexo I limites crescentes"
            ]
        );
    }

    #[test]
    fn missing_annex_and_short_table() {
        let mut payload = simples(json!([bracket(1000.0, 0.415)]));
        payload["anexos"].as_object_mut().unwrap().remove("IV");
        let names = failures(&validate_simples(&payload)).join(";");
        assert!(names.contains("Simples: anexo I possui 6 faixas"));
        assert!(names.contains("Simples: anexo IV existe"));
    }

    #[test]
    fn negative_share_is_reported_once() {
        let mut brackets: Vec<Value> = (1..=6).map(|i| bracket(f64::from(i) * 1000.0, 0.415)).collect();
        brackets[0]["percentuais_partilha"]["ISS"] = json!(-0.1);
        let checks = validate_simples(&simples(json!(brackets)));
        assert_eq!(failures(&checks), vec!["Simples: anexo I faixa 1 partilha.ISS valida"]);
        assert!(!checks.iter().any(|c| c.name == "Simples: anexo I valores nao negativos"));
    }

    #[test]
    fn missing_anexos_object_short_circuits() {
        let checks = validate_simples(&object(json!({"anexos": []})));
        assert_eq!(checks.len(), 1);
        assert_eq!(checks[0].actual, Some(json!("lista")));
    }

    #[test]
    fn required_keys() {
        let payload = object(json!({"irpj": 0.15, "csll": 0.09}));
        let checks = validate_required_keys(&payload, "Real", REAL_REQUIRED_KEYS);
        assert_eq!(
            failures(&checks),
            vec![
                "Real: chave obrigatoria 'pis_nao_cumulativo'",
                "Real: chave obrigatoria 'cofins_nao_cumulativo'"
            ]
        );
    }

    #[test]
    fn real_ranges_and_high_pis_cofins_warning() {
        let payload = object(json!({
            "irpj": 1.5, "csll": 0.09, "pis_nao_cumulativo": 0.05, "cofins_nao_cumulativo": 0.2
        }));
        let (checks, warnings) = validate_real_ranges(&payload);
        assert_eq!(failures(&checks), vec!["Real: faixa valida para 'irpj'"]);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].starts_with("WARNING: Real params com soma de PIS+COFINS acima de 0.2"));
    }

    #[test]
    fn eligibility_contract() {
        let payload = object(json!({
            "simples": {"rbt12_max": 0},
            "presumido": {"receita_anual_max": 78_000_000},
            "real": {"warnings": "texto"}
        }));
        assert_eq!(
            failures(&validate_eligibility(&payload)),
            vec!["Eligibility Simples: rbt12_max valido", "Eligibility Real: warnings em lista"]
        );
        let missing = validate_eligibility(&object(json!({})));
        assert_eq!(failures(&missing).len(), 3);
    }

    #[test]
    fn catalog_duplicates_and_missing_codes() {
        let item = |code: &str| {
            json!({"regime_code": code, "display_name": code, "enabled": true,
                   "requires_fields": [], "notes": ""})
        };
        let payload = object(json!({"regimes": [item("SIMPLES"), item("simples"), item("REAL")]}));
        let checks = validate_regime_catalog(&payload);
        let failed = failures(&checks);
        assert_eq!(
            failed,
            vec!["Regime catalog: codigos obrigatorios", "Regime catalog: codigos duplicados"]
        );
        let missing = checks.iter().find(|c| c.name == failed[0]).unwrap();
        assert_eq!(missing.detail.as_deref(), Some("ausentes: [\"PRESUMIDO\"]"));
    }

    #[test]
    fn catalog_must_be_non_empty() {
        let checks = validate_regime_catalog(&object(json!({"regimes": []})));
        assert_eq!(failures(&checks), vec!["Regime catalog: regimes nao vazio"]);
    }

    #[test]
    fn thresholds_sorted_by_order_before_comparing() {
        let payload = object(json!({"portes": [
            {"porte": "EPP", "ordem": 3, "limite_receita_anual": 4_800_000},
            {"porte": "MEI", "ordem": 1, "limite_receita_anual": 81_000},
            {"porte": "ME", "ordem": 2, "limite_receita_anual": 360_000}
        ]}));
        assert!(failures(&validate_thresholds(&payload)).is_empty());

        let bad = object(json!({"portes": [
            {"porte": "MEI", "ordem": 1, "limite_receita_anual": 400_000},
            {"porte": "ME", "ordem": 2, "limite_receita_anual": 360_000},
            {"porte": "X", "ordem": 0, "limite_receita_anual": 1}
        ]}));
        assert_eq!(
            failures(&validate_thresholds(&bad)),
            vec!["Thresholds: item 3 ordem valida", "Thresholds: limites crescentes por ordem"]
        );
    }
}
