//! # Integrity Checks
//!
//! One [`IntegrityCheck`] per assertion the auditor makes. Failures never
//! short-circuit: the auditor records every failing check so the report
//! shows the full extent of a damaged ruleset.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CheckStatus {
    Pass,
    Fail,
}

impl CheckStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pass => "PASS",
            Self::Fail => "FAIL",
        }
    }
}

impl fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a single named assertion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntegrityCheck {
    /// `<Section>: <what>`, e.g. `Presumido: chave obrigatoria 'pis'`.
    pub name: String,
    pub status: CheckStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl IntegrityCheck {
    pub fn pass(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: CheckStatus::Pass,
            expected: None,
            actual: None,
            detail: None,
        }
    }

    pub fn fail(name: impl Into<String>, expected: impl Into<Value>, actual: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            status: CheckStatus::Fail,
            expected: Some(expected.into()),
            actual: Some(actual.into()),
            detail: None,
        }
    }

    /// A failure that only carries a free-text explanation.
    pub fn fail_with_detail(name: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: CheckStatus::Fail,
            expected: None,
            actual: None,
            detail: Some(detail.into()),
        }
    }

    /// Pass or fail depending on `ok`, recording both sides either way.
    pub fn compare(
        name: impl Into<String>,
        ok: bool,
        expected: impl Into<Value>,
        actual: impl Into<Value>,
    ) -> Self {
        Self {
            name: name.into(),
            status: if ok { CheckStatus::Pass } else { CheckStatus::Fail },
            expected: Some(expected.into()),
            actual: Some(actual.into()),
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn passed(&self) -> bool {
        self.status == CheckStatus::Pass
    }
}

impl fmt::Display for IntegrityCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.status, self.name)
    }
}

/// Render a JSON value for humans: bare strings, JSON for everything else.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Name of a JSON value's type, as used in `expected`/`actual` fields.
pub fn type_label(value: Option<&Value>) -> &'static str {
    match value {
        None => "ausente",
        Some(Value::Null) => "null",
        Some(Value::Bool(_)) => "bool",
        Some(Value::Number(_)) => "numero",
        Some(Value::String(_)) => "texto",
        Some(Value::Array(_)) => "lista",
        Some(Value::Object(_)) => "objeto",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn status_serializes_uppercase() {
        assert_eq!(serde_json::to_value(CheckStatus::Fail).unwrap(), json!("FAIL"));
        let check = IntegrityCheck::pass("Real: chave obrigatoria 'irpj'");
        let value = serde_json::to_value(&check).unwrap();
        assert_eq!(value, json!({"name": "Real: chave obrigatoria 'irpj'", "status": "PASS"}));
    }

    #[test]
    fn compare_records_both_sides() {
        let check = IntegrityCheck::compare("Simples: anexo I possui 6 faixas", false, 6, 5);
        assert!(!check.passed());
        assert_eq!(check.expected, Some(json!(6)));
        assert_eq!(check.actual, Some(json!(5)));
        assert_eq!(check.to_string(), "[FAIL] Simples: anexo I possui 6 faixas");
    }

    #[test]
    fn display_value_unquotes_strings() {
        assert_eq!(display_value(&json!("presente")), "presente");
        assert_eq!(display_value(&json!([1, 2])), "[1,2]");
        assert_eq!(type_label(Some(&json!({}))), "objeto");
        assert_eq!(type_label(None), "ausente");
    }
}
