//! Typed view of `real_params.json`.

use tde_core::{RegimeCode, RulesetIntegrityError};

use crate::table::RuleTable;

/// Validated Lucro Real rates. Every rate lies in [0, 1].
#[derive(Debug, Clone, PartialEq)]
pub struct RealParams {
    pub ruleset_id: String,
    pub irpj: f64,
    pub csll: f64,
    pub pis_nao_cumulativo: f64,
    pub cofins_nao_cumulativo: f64,
}

impl RealParams {
    pub fn from_table(table: &RuleTable) -> Result<Self, RulesetIntegrityError> {
        let root = table.payload();
        let ctx = table.context(RegimeCode::Real.display_name(), "");
        let rate = |key: &str, impact: &'static str| -> Result<f64, RulesetIntegrityError> {
            let ctx = ctx.with_impact(impact);
            let value = ctx.non_negative(root, "", key)?;
            if value > 1.0 {
                return Err(ctx.error(key, "valor fora de [0, 1]"));
            }
            Ok(value)
        };
        Ok(Self {
            ruleset_id: table.ruleset_id().to_string(),
            irpj: rate("irpj", "Nao e possivel calcular IRPJ")?,
            csll: rate("csll", "Nao e possivel calcular CSLL")?,
            pis_nao_cumulativo: rate(
                "pis_nao_cumulativo",
                "Nao e possivel calcular PIS nao cumulativo",
            )?,
            cofins_nao_cumulativo: rate(
                "cofins_nao_cumulativo",
                "Nao e possivel calcular COFINS nao cumulativo",
            )?,
        })
    }

    /// PIS + COFINS non-cumulative rate applied to both debit and credit.
    pub fn combined_pis_cofins(&self) -> f64 {
        self.pis_nao_cumulativo + self.cofins_nao_cumulativo
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file::RuleFile;
    use serde_json::{json, Value};

    fn table(value: Value) -> RuleTable {
        let Value::Object(map) = value else {
            panic!("fixture must be an object")
        };
        RuleTable::new("BR_TEST", RuleFile::RealParams, map)
    }

    #[test]
    fn parses_and_combines_rates() {
        let params = RealParams::from_table(&table(json!({
            "irpj": 0.15, "csll": 0.09, "pis_nao_cumulativo": 0.0165, "cofins_nao_cumulativo": 0.076
        })))
        .unwrap();
        assert!((params.combined_pis_cofins() - 0.0925).abs() < 1e-12);
    }

    #[test]
    fn missing_cofins_is_fatal_with_impact() {
        let err = RealParams::from_table(&table(json!({
            "irpj": 0.15, "csll": 0.09, "pis_nao_cumulativo": 0.0165
        })))
        .unwrap_err();
        assert_eq!(err.key, "cofins_nao_cumulativo");
        assert_eq!(err.impact, "Nao e possivel calcular COFINS nao cumulativo");
        assert_eq!(err.detail, "chave ausente");
    }

    #[test]
    fn rate_above_one_rejected() {
        let err = RealParams::from_table(&table(json!({
            "irpj": 15, "csll": 0.09, "pis_nao_cumulativo": 0.0165, "cofins_nao_cumulativo": 0.076
        })))
        .unwrap_err();
        assert_eq!(err.key, "irpj");
        assert_eq!(err.detail, "valor fora de [0, 1]");
    }
}
