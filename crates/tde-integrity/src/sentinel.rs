//! # Sentinel Vectors
//!
//! `metadata.json` pins a handful of Simples bracket constants under
//! `audit_sentinels.simples`. Each pinned bracket yields two checks: one for
//! the nominal rate and deduction, one for the share table. Values must
//! match the live table within `1e-9`.

use serde_json::{json, Map, Value};
use tde_ruleset::{SimplesSentinel, TaxShares};

use crate::check::IntegrityCheck;

const SENTINEL_TOLERANCE: f64 = 1e-9;

fn close(expected: Option<f64>, actual: Option<f64>) -> bool {
    matches!((expected, actual), (Some(e), Some(a)) if (e - a).abs() < SENTINEL_TOLERANCE)
}

fn pinned_shares_match(expected: &TaxShares, actual: &Map<String, Value>) -> bool {
    expected.iter().all(|(tributo, value)| {
        close(Some(*value), actual.get(tributo.as_str()).and_then(Value::as_f64))
    })
}

/// Compare every sentinel against the raw `simples_tables.json` payload.
pub fn check_simples_sentinels(
    sentinels: &[SimplesSentinel],
    simples_payload: &Map<String, Value>,
) -> Vec<IntegrityCheck> {
    let annexes = simples_payload.get("anexos").and_then(Value::as_object);
    let mut checks = Vec::new();

    for sentinel in sentinels {
        let code = sentinel.anexo.trim();
        if code.is_empty() || sentinel.faixa == 0 {
            checks.push(IntegrityCheck::fail_with_detail(
                "Sentinela Simples: estrutura",
                format!("Sentinela invalida: anexo={:?} faixa={}", sentinel.anexo, sentinel.faixa),
            ));
            continue;
        }
        let n = sentinel.faixa;
        let name = format!("Sentinela Simples: Anexo {code} faixa {n}");
        let shares_name = format!("Sentinela Simples Partilha: Anexo {code} faixa {n}");

        let bracket = annexes
            .and_then(|a| a.get(code))
            .and_then(Value::as_array)
            .and_then(|brackets| brackets.get(n - 1))
            .and_then(Value::as_object);
        let Some(bracket) = bracket else {
            checks.push(IntegrityCheck::fail_with_detail(name, "Faixa nao encontrada."));
            checks.push(IntegrityCheck::fail_with_detail(shares_name, "Faixa nao encontrada."));
            continue;
        };

        let actual_rate = bracket.get("aliquota_nominal").and_then(Value::as_f64);
        let actual_deduction = bracket.get("parcela_deduzir").and_then(Value::as_f64);
        checks.push(IntegrityCheck::compare(
            name,
            close(sentinel.aliquota_nominal, actual_rate) && close(sentinel.parcela_deduzir, actual_deduction),
            json!({"aliquota_nominal": sentinel.aliquota_nominal, "parcela_deduzir": sentinel.parcela_deduzir}),
            json!({"aliquota_nominal": actual_rate, "parcela_deduzir": actual_deduction}),
        ));

        let actual_shares = bracket.get("percentuais_partilha");
        let ok = match (&sentinel.percentuais_partilha, actual_shares.and_then(Value::as_object)) {
            (Some(expected), Some(actual)) => pinned_shares_match(expected, actual),
            _ => false,
        };
        checks.push(IntegrityCheck::compare(
            shares_name,
            ok,
            json!(sentinel.percentuais_partilha),
            actual_shares.cloned().unwrap_or(Value::Null),
        ));
    }
    checks
}
