//! # Rule Tables and Structured Key Access
//!
//! A [`RuleTable`] is an owned copy of one rule file. The store hands out a
//! fresh copy on every read, so callers may hold or mutate it freely.
//!
//! Required keys are read through a [`RuleContext`], which knows which
//! ruleset, file, regime and impact to name when a key is missing or has
//! the wrong type. Every failure becomes a
//! [`RulesetIntegrityError`](tde_core::RulesetIntegrityError).

use serde_json::{Map, Value};
use tde_core::RulesetIntegrityError;

use crate::file::RuleFile;

pub const DETAIL_MISSING: &str = "chave ausente";
pub const DETAIL_NOT_NUMBER: &str = "valor nao numerico";
pub const DETAIL_NOT_OBJECT: &str = "objeto invalido";
pub const DETAIL_NOT_LIST: &str = "lista invalida";
pub const DETAIL_NOT_STRING: &str = "texto invalido";
pub const DETAIL_NEGATIVE: &str = "valor negativo";

/// Owned copy of one rule file of one ruleset.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleTable {
    ruleset_id: String,
    file: RuleFile,
    payload: Map<String, Value>,
}

impl RuleTable {
    pub fn new(ruleset_id: impl Into<String>, file: RuleFile, payload: Map<String, Value>) -> Self {
        Self {
            ruleset_id: ruleset_id.into(),
            file,
            payload,
        }
    }

    pub fn ruleset_id(&self) -> &str {
        &self.ruleset_id
    }

    pub fn file(&self) -> RuleFile {
        self.file
    }

    pub fn payload(&self) -> &Map<String, Value> {
        &self.payload
    }

    pub fn payload_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.payload
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.payload)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.payload.get(key)
    }

    /// Accessor context for one regime and impact.
    pub fn context<'a>(&'a self, regime: &'a str, impact: &'a str) -> RuleContext<'a> {
        RuleContext {
            ruleset_id: &self.ruleset_id,
            file: self.file,
            regime,
            impact,
        }
    }
}

/// Everything needed to render a structured error for one lookup.
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    pub ruleset_id: &'a str,
    pub file: RuleFile,
    pub regime: &'a str,
    pub impact: &'a str,
}

impl<'a> RuleContext<'a> {
    /// Same file and regime, different impact statement.
    pub fn with_impact(self, impact: &'a str) -> Self {
        Self { impact, ..self }
    }

    pub fn error(&self, key: impl Into<String>, detail: impl Into<String>) -> RulesetIntegrityError {
        RulesetIntegrityError {
            ruleset_id: self.ruleset_id.to_string(),
            file: self.file.file_name().to_string(),
            key: key.into(),
            regime: self.regime.to_string(),
            impact: self.impact.to_string(),
            detail: detail.into(),
        }
    }

    /// Required numeric entry. `path` is the dotted prefix of `obj` inside
    /// the file (empty for the top level).
    pub fn number(
        &self,
        obj: &Map<String, Value>,
        path: &str,
        key: &str,
    ) -> Result<f64, RulesetIntegrityError> {
        match obj.get(key) {
            None => Err(self.error(join(path, key), DETAIL_MISSING)),
            Some(v) => v
                .as_f64()
                .ok_or_else(|| self.error(join(path, key), DETAIL_NOT_NUMBER)),
        }
    }

    /// Required numeric entry that must not be negative.
    pub fn non_negative(
        &self,
        obj: &Map<String, Value>,
        path: &str,
        key: &str,
    ) -> Result<f64, RulesetIntegrityError> {
        let value = self.number(obj, path, key)?;
        if value < 0.0 {
            return Err(self.error(join(path, key), DETAIL_NEGATIVE));
        }
        Ok(value)
    }

    pub fn object<'m>(
        &self,
        obj: &'m Map<String, Value>,
        path: &str,
        key: &str,
    ) -> Result<&'m Map<String, Value>, RulesetIntegrityError> {
        match obj.get(key) {
            None => Err(self.error(join(path, key), DETAIL_MISSING)),
            Some(v) => v
                .as_object()
                .ok_or_else(|| self.error(join(path, key), DETAIL_NOT_OBJECT)),
        }
    }

    pub fn list<'m>(
        &self,
        obj: &'m Map<String, Value>,
        path: &str,
        key: &str,
    ) -> Result<&'m Vec<Value>, RulesetIntegrityError> {
        match obj.get(key) {
            None => Err(self.error(join(path, key), DETAIL_MISSING)),
            Some(v) => v
                .as_array()
                .ok_or_else(|| self.error(join(path, key), DETAIL_NOT_LIST)),
        }
    }

    pub fn string<'m>(
        &self,
        obj: &'m Map<String, Value>,
        path: &str,
        key: &str,
    ) -> Result<&'m str, RulesetIntegrityError> {
        match obj.get(key) {
            None => Err(self.error(join(path, key), DETAIL_MISSING)),
            Some(v) => v
                .as_str()
                .ok_or_else(|| self.error(join(path, key), DETAIL_NOT_STRING)),
        }
    }
}

/// Join a dotted key path.
pub fn join(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{path}.{key}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn table(value: Value) -> RuleTable {
        let Value::Object(map) = value else {
            panic!("fixture must be an object")
        };
        RuleTable::new("BR_TEST", RuleFile::RealParams, map)
    }

    #[test]
    fn number_reads_integers_and_floats() {
        let t = table(json!({"irpj": 0.15, "limite": 240000}));
        let ctx = t.context("Lucro Real", "Nao e possivel calcular IRPJ");
        assert_eq!(ctx.number(t.payload(), "", "irpj").unwrap(), 0.15);
        assert_eq!(ctx.number(t.payload(), "", "limite").unwrap(), 240000.0);
    }

    #[test]
    fn missing_key_renders_structured_error() {
        let t = table(json!({}));
        let ctx = t.context("Lucro Real", "Nao e possivel calcular CSLL");
        let err = ctx.number(t.payload(), "", "csll").unwrap_err();
        assert_eq!(
            err.to_string(),
            "ruleset_id=BR_TEST | arquivo=real_params.json | chave=csll | regime=Lucro Real | \
             impacto=Nao e possivel calcular CSLL | detalhe=chave ausente"
        );
    }

    #[test]
    fn wrong_type_names_nested_path() {
        let t = table(json!({"limites": {"mensal": "vinte mil"}}));
        let ctx = t.context("Lucro Presumido", "x");
        let limites = ctx.object(t.payload(), "", "limites").unwrap();
        let err = ctx.number(limites, "limites", "mensal").unwrap_err();
        assert_eq!(err.key, "limites.mensal");
        assert_eq!(err.detail, DETAIL_NOT_NUMBER);
    }

    #[test]
    fn non_negative_rejects_negative() {
        let t = table(json!({"irpj": -0.1}));
        let err = t
            .context("Lucro Real", "x")
            .non_negative(t.payload(), "", "irpj")
            .unwrap_err();
        assert_eq!(err.detail, DETAIL_NEGATIVE);
    }

    #[test]
    fn clones_are_independent() {
        let original = table(json!({"irpj": 0.15}));
        let mut copy = original.clone();
        copy.payload_mut().insert("irpj".into(), json!(0.99));
        assert_eq!(original.get("irpj"), Some(&json!(0.15)));
    }
}
