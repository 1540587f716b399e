//! # Regime Dispatch
//!
//! One request shape for all three calculators and one result shape out.
//! [`calculate`] matches exhaustively on [`RegimeCode`], so a new regime
//! cannot be added without a calculator.

use serde::{Deserialize, Serialize};
use tde_core::{CalculationDomainError, Periodicity, RegimeCode};
use tde_ruleset::{AnnexSelection, RulesetBundle};

use crate::error::CalculationResult;
use crate::presumido::{self, PresumidoDetail, PresumidoInput};
use crate::real::{self, RealDetail, RealInput, CREDIT_CLAMP_ALERT};
use crate::simples::{self, SimplesDetail, SimplesInput};

/// Every regime-specific input a calculator may need. Built from the
/// normalized company profile.
#[derive(Debug, Clone, PartialEq)]
pub struct CalculationRequest {
    pub revenue: f64,
    pub period_base: Option<f64>,
    pub rbt12: Option<f64>,
    pub annex: Option<AnnexSelection>,
    pub fator_r: Option<f64>,
    pub payroll_12m: Option<f64>,
    pub activity: Option<String>,
    pub periodicity: Periodicity,
    pub margin: f64,
    pub deductible_expenses: Option<f64>,
    pub credit_percent: Option<f64>,
}

/// Calculation memory, tagged by calculation model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "modelo")]
pub enum RegimeDetail {
    #[serde(rename = "simples_tabelado_anexo_faixa")]
    Simples(SimplesDetail),
    #[serde(rename = "presumido_ruleset")]
    Presumido(PresumidoDetail),
    #[serde(rename = "real_estimado_margem")]
    Real(RealDetail),
}

impl RegimeDetail {
    pub fn regime(&self) -> RegimeCode {
        match self {
            Self::Simples(_) => RegimeCode::Simples,
            Self::Presumido(_) => RegimeCode::Presumido,
            Self::Real(_) => RegimeCode::Real,
        }
    }

    /// Non-fatal advisories raised by the calculator itself.
    pub fn alerts(&self) -> Vec<String> {
        match self {
            Self::Simples(d) => d.alerta_elegibilidade.iter().cloned().collect(),
            Self::Presumido(d) => d.alerta_premissa.iter().cloned().collect(),
            Self::Real(d) if d.credito_limitado_ao_debito => vec![CREDIT_CLAMP_ALERT.to_string()],
            Self::Real(_) => Vec::new(),
        }
    }

    pub fn as_real(&self) -> Option<&RealDetail> {
        match self {
            Self::Real(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_simples(&self) -> Option<&SimplesDetail> {
        match self {
            Self::Simples(d) => Some(d),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegimeCalculation {
    pub regime: RegimeCode,
    pub tax: f64,
    pub detail: RegimeDetail,
}

/// Run the calculator for `regime`.
pub fn calculate(
    regime: RegimeCode,
    request: &CalculationRequest,
    bundle: &RulesetBundle,
) -> CalculationResult<RegimeCalculation> {
    let (tax, detail) = match regime {
        RegimeCode::Simples => {
            let annex = request.annex.ok_or_else(|| {
                CalculationDomainError::new(
                    regime.display_name(),
                    "Nao e possivel calcular DAS",
                    "anexo_simples nao informado",
                )
            })?;
            let input = SimplesInput {
                period_base: request.period_base.unwrap_or(request.revenue),
                rbt12: request.rbt12.unwrap_or(request.revenue),
                annex,
                fator_r: request.fator_r,
                payroll_12m: request.payroll_12m,
            };
            let (tax, detail) = simples::calculate(&input, &bundle.simples)?;
            (tax, RegimeDetail::Simples(detail))
        }
        RegimeCode::Presumido => {
            let input = PresumidoInput {
                revenue: request.revenue,
                activity: request.activity.clone(),
                periodicity: request.periodicity,
            };
            let (tax, detail) = presumido::calculate(&input, &bundle.presumido)?;
            (tax, RegimeDetail::Presumido(detail))
        }
        RegimeCode::Real => {
            let input = RealInput {
                revenue: request.revenue,
                period_base: request.period_base,
                margin: request.margin,
                deductible_expenses: request.deductible_expenses,
                credit_percent: request.credit_percent,
            };
            let (tax, detail) = real::calculate(&input, &bundle.real)?;
            (tax, RegimeDetail::Real(detail))
        }
    };
    Ok(RegimeCalculation {
        regime,
        tax,
        detail,
    })
}
