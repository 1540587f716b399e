//! # Structural JSON Diff
//!
//! Recursive comparison of a frozen baseline against a live payload.
//! Paths use `$.<file>.<key>[<index>]` notation, e.g.
//! `$.simples_tables.json.anexos.III[3].aliquota_nominal`.
//!
//! Object keys are visited in sorted order so the diff list is stable.
//! Numbers compare by value: `1` and `1.0` are equal, which matches the
//! canonical hash.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Placeholder rendered on the side where a key does not exist.
pub const MISSING: &str = "<missing>";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiffKind {
    MissingKey,
    ExtraKey,
    TypeMismatch,
    ValueMismatch,
    LengthMismatch,
}

impl DiffKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MissingKey => "missing key in atual",
            Self::ExtraKey => "extra key em atual",
            Self::TypeMismatch => "type mismatch",
            Self::ValueMismatch => "value mismatch",
            Self::LengthMismatch => "list length mismatch",
        }
    }
}

impl fmt::Display for DiffKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One divergent path between baseline (`expected`) and live (`actual`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonDifference {
    pub path: String,
    pub expected: Value,
    pub actual: Value,
    pub kind: DiffKind,
}

fn same_type(a: &Value, b: &Value) -> bool {
    std::mem::discriminant(a) == std::mem::discriminant(b)
}

fn numbers_equal(a: &serde_json::Number, b: &serde_json::Number) -> bool {
    match (a.as_i64(), b.as_i64()) {
        (Some(x), Some(y)) => x == y,
        _ => a.as_f64() == b.as_f64(),
    }
}

/// Every path where `actual` diverges from `expected`, rooted at `path`.
pub fn diff_json(expected: &Value, actual: &Value, path: &str) -> Vec<JsonDifference> {
    let mut out = Vec::new();
    walk(expected, actual, path, &mut out);
    out
}

fn walk(expected: &Value, actual: &Value, path: &str, out: &mut Vec<JsonDifference>) {
    if !same_type(expected, actual) {
        out.push(JsonDifference {
            path: path.to_string(),
            expected: expected.clone(),
            actual: actual.clone(),
            kind: DiffKind::TypeMismatch,
        });
        return;
    }

    match (expected, actual) {
        (Value::Object(exp), Value::Object(act)) => {
            let exp_keys: BTreeSet<&String> = exp.keys().collect();
            let act_keys: BTreeSet<&String> = act.keys().collect();
            for key in exp_keys.difference(&act_keys) {
                out.push(JsonDifference {
                    path: format!("{path}.{key}"),
                    expected: exp[key.as_str()].clone(),
                    actual: Value::from(MISSING),
                    kind: DiffKind::MissingKey,
                });
            }
            for key in act_keys.difference(&exp_keys) {
                out.push(JsonDifference {
                    path: format!("{path}.{key}"),
                    expected: Value::from(MISSING),
                    actual: act[key.as_str()].clone(),
                    kind: DiffKind::ExtraKey,
                });
            }
            for key in exp_keys.intersection(&act_keys) {
                walk(&exp[key.as_str()], &act[key.as_str()], &format!("{path}.{key}"), out);
            }
        }
        (Value::Array(exp), Value::Array(act)) => {
            if exp.len() != act.len() {
                out.push(JsonDifference {
                    path: path.to_string(),
                    expected: Value::from(format!("len={}", exp.len())),
                    actual: Value::from(format!("len={}", act.len())),
                    kind: DiffKind::LengthMismatch,
                });
                return;
            }
            for (idx, (e, a)) in exp.iter().zip(act).enumerate() {
                walk(e, a, &format!("{path}[{idx}]"), out);
            }
        }
        (Value::Number(e), Value::Number(a)) if numbers_equal(e, a) => {}
        (e, a) if !matches!(e, Value::Number(_)) && e == a => {}
        (e, a) => out.push(JsonDifference {
            path: path.to_string(),
            expected: e.clone(),
            actual: a.clone(),
            kind: DiffKind::ValueMismatch,
        }),
    }
}
