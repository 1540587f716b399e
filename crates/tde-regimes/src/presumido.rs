//! # Lucro Presumido Calculator
//!
//! ```text
//! base     = revenue * presumption[activity]
//! irpj     = base * irpj_rate
//! csll     = base * csll_rate
//! surtax   = max(0, base - threshold[period]) * adicional_rate
//! pis+cof  = revenue * (pis_rate + cofins_rate)      (cumulative)
//! ```
//!
//! The activity is resolved through the ruleset alias table. An unknown or
//! absent activity is not an error: the fallback percentage applies and
//! the detail carries an advisory.

use serde::{Deserialize, Serialize};
use tde_core::{CalculationDomainError, Periodicity, RegimeCode};
use tde_ruleset::{ActivityType, PresumidoParams};

use crate::error::CalculationResult;

#[derive(Debug, Clone, PartialEq)]
pub struct PresumidoInput {
    pub revenue: f64,
    /// Free-text activity as it came in the request.
    pub activity: Option<String>,
    pub periodicity: Periodicity,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresumidoDetail {
    /// Request text, or `Nao informado`.
    pub tipo_atividade_considerado: String,
    pub atividade_aplicada: ActivityType,
    pub percentual_presuncao: f64,
    pub base_presumida: f64,
    pub aliquota_irpj: f64,
    pub aliquota_csll: f64,
    pub aliquota_pis: f64,
    pub aliquota_cofins: f64,
    pub irpj_calculado: f64,
    pub csll_calculado: f64,
    pub pis_calculado: f64,
    pub cofins_calculado: f64,
    pub adicional_irpj_calculado: f64,
    pub periodicidade: Periodicity,
    pub limite_adicional_irpj_utilizado: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alerta_premissa: Option<String>,
}

impl PresumidoDetail {
    pub fn total(&self) -> f64 {
        self.pis_calculado
            + self.cofins_calculado
            + self.irpj_calculado
            + self.adicional_irpj_calculado
            + self.csll_calculado
    }
}

pub fn calculate(
    input: &PresumidoInput,
    params: &PresumidoParams,
) -> CalculationResult<(f64, PresumidoDetail)> {
    if input.revenue <= 0.0 {
        return Err(CalculationDomainError::new(
            RegimeCode::Presumido.display_name(),
            "Nao e possivel calcular base presumida",
            "receita_anual deve ser maior que zero",
        )
        .into());
    }

    let resolution = ActivityType::resolve(input.activity.as_deref());
    let presumption = params.presumption(resolution.activity);
    let threshold = params.surtax_threshold(input.periodicity);

    let base = input.revenue * presumption;
    let detail = PresumidoDetail {
        tipo_atividade_considerado: resolution
            .informed
            .clone()
            .unwrap_or_else(|| "Nao informado".to_string()),
        atividade_aplicada: resolution.activity,
        percentual_presuncao: presumption,
        base_presumida: base,
        aliquota_irpj: params.irpj,
        aliquota_csll: params.csll,
        aliquota_pis: params.pis,
        aliquota_cofins: params.cofins,
        irpj_calculado: base * params.irpj,
        csll_calculado: base * params.csll,
        pis_calculado: input.revenue * params.pis,
        cofins_calculado: input.revenue * params.cofins,
        adicional_irpj_calculado: (base - threshold).max(0.0) * params.adicional_irpj,
        periodicidade: input.periodicity,
        limite_adicional_irpj_utilizado: threshold,
        alerta_premissa: resolution.advisory(),
    };
    let tax = detail.total();

    tracing::debug!(
        activity = %resolution.activity,
        periodicity = %input.periodicity,
        base,
        tax,
        "presumido calculated"
    );
    Ok((tax, detail))
}
