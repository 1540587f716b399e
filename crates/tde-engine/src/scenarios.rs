//! Post-reform scenario simulation.
//!
//! Each scenario applies a flat reform rate to the annual revenue and
//! classifies the difference against the current regime's tax.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tde_core::InputValidationError;
use tde_ruleset::RulesetMetadata;

use crate::error::EngineResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImpactClass {
    #[serde(rename = "Baixo impacto")]
    Low,
    #[serde(rename = "Impacto moderado")]
    Moderate,
    #[serde(rename = "Alto impacto")]
    High,
}

impl ImpactClass {
    /// Bands on `impact_percent`: below 5, below 12, otherwise high.
    pub fn classify(impact_percent: f64) -> Self {
        if impact_percent < 5.0 {
            Self::Low
        } else if impact_percent < 12.0 {
            Self::Moderate
        } else {
            Self::High
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Low => "Baixo impacto",
            Self::Moderate => "Impacto moderado",
            Self::High => "Alto impacto",
        }
    }

    pub fn recommendation(&self) -> &'static str {
        match self {
            Self::Low => "Monitorar mudancas e manter estrategia atual.",
            Self::Moderate => "Revisar estrutura de custos e avaliar ajuste gradual de precos.",
            Self::High => {
                "Revisao urgente de precificacao, capital de giro e planejamento tributario."
            }
        }
    }
}

impl std::fmt::Display for ImpactClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub nome_cenario: String,
    pub aliquota_reforma: f64,
    pub imposto_reforma: f64,
    pub diferenca: f64,
    pub impacto_percentual: f64,
    pub classificacao: ImpactClass,
    pub recomendacao: String,
}

/// Custom rates from the request win over the ruleset's `cenarios_reforma`.
pub fn scenario_rates(
    custom: Option<&BTreeMap<String, f64>>,
    metadata: &RulesetMetadata,
) -> EngineResult<BTreeMap<String, f64>> {
    match custom {
        Some(rates) if !rates.is_empty() => {
            for (name, &rate) in rates {
                if !rate.is_finite() || !(0.0..=1.0).contains(&rate) {
                    return Err(InputValidationError::InvalidScenarioRate {
                        name: name.clone(),
                        rate,
                    }
                    .into());
                }
            }
            Ok(rates.clone())
        }
        _ => Ok(metadata.reform_scenarios()?),
    }
}

pub fn simulate(revenue: f64, current_tax: f64, rates: &BTreeMap<String, f64>) -> Vec<ScenarioResult> {
    rates
        .iter()
        .map(|(name, &rate)| {
            let reform_tax = revenue * rate;
            let difference = reform_tax - current_tax;
            let impact = difference / revenue * 100.0;
            let class = ImpactClass::classify(impact);
            ScenarioResult {
                nome_cenario: name.clone(),
                aliquota_reforma: rate,
                imposto_reforma: reform_tax,
                diferenca: difference,
                impacto_percentual: impact,
                classificacao: class,
                recomendacao: class.recommendation().to_string(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use crate::testing::bundle;

    #[test]
    fn classification_bands() {
        assert_eq!(ImpactClass::classify(-3.0), ImpactClass::Low);
        assert_eq!(ImpactClass::classify(4.99), ImpactClass::Low);
        assert_eq!(ImpactClass::classify(5.0), ImpactClass::Moderate);
        assert_eq!(ImpactClass::classify(11.99), ImpactClass::Moderate);
        assert_eq!(ImpactClass::classify(12.0), ImpactClass::High);
    }

    #[test]
    fn simulate_against_current_tax() {
        let rates = BTreeMap::from([("Base".to_string(), 0.265)]);
        let out = simulate(1_000_000.0, 116_500.0, &rates);
        assert_eq!(out.len(), 1);
        let r = &out[0];
        assert!((r.imposto_reforma - 265_000.0).abs() < 1e-6);
        assert!((r.diferenca - 148_500.0).abs() < 1e-6);
        assert!((r.impacto_percentual - 14.85).abs() < 1e-9);
        assert_eq!(r.classificacao, ImpactClass::High);
        assert_eq!(r.recomendacao, ImpactClass::High.recommendation());
    }

    #[test]
    fn ruleset_scenarios_when_no_custom_map() {
        let bundle = bundle();
        let rates = scenario_rates(None, &bundle.metadata).unwrap();
        assert_eq!(rates.len(), 3);
        assert_eq!(rates["Reforma - aliquota de referencia 26,5%"], 0.265);

        let empty = BTreeMap::new();
        assert_eq!(scenario_rates(Some(&empty), &bundle.metadata).unwrap(), rates);
    }

    #[test]
    fn custom_rates_are_validated() {
        let bundle = bundle();
        let custom = BTreeMap::from([("Meu".to_string(), 0.2)]);
        assert_eq!(scenario_rates(Some(&custom), &bundle.metadata).unwrap(), custom);

        let bad = BTreeMap::from([("Ruim".to_string(), 1.5)]);
        let err = scenario_rates(Some(&bad), &bundle.metadata).unwrap_err();
        assert!(matches!(
            err,
            EngineError::Input(InputValidationError::InvalidScenarioRate { .. })
        ));
    }

    #[test]
    fn serializes_class_labels() {
        let json = serde_json::to_string(&ImpactClass::Moderate).unwrap();
        assert_eq!(json, "\"Impacto moderado\"");
    }
}
