//! # Company Profile — Request Normalization
//!
//! [`CompanyProfile::normalize`] turns a raw [`DiagnosticInput`] into the
//! canonical profile every later stage reads. Each default it applies is
//! returned twice: as a [`Resolved`] value that knows it was defaulted, and
//! as a human-readable line in `assumptions`. Required fields that remain
//! unresolved are listed in `missing_inputs`. The profile is never mutated
//! after construction.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tde_core::{
    validate_competencia, AnalysisMode, InputValidationError, Periodicity, RegimeCode,
};
use tde_regimes::CalculationRequest;
use tde_ruleset::{normalize_annex_code, AnnexSelection};

/// Profit margin applied to Lucro Real when the request has none.
pub const DEFAULT_MARGIN: f64 = 0.10;

/// Raw request, as received from a presentation layer or a JSON file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagnosticInput {
    pub nome_empresa: String,
    pub receita_anual: f64,
    /// Regime code or display name (`SIMPLES`, `Lucro Presumido`, ...).
    pub regime: String,
    pub rbt12: Option<f64>,
    pub receita_base_periodo: Option<f64>,
    pub anexo_simples: Option<String>,
    pub fator_r: Option<f64>,
    pub folha_12m: Option<f64>,
    pub tipo_atividade: Option<String>,
    pub margem_lucro: Option<f64>,
    pub despesas_creditaveis: Option<f64>,
    pub percentual_credito_estimado: Option<f64>,
    pub periodicidade: Option<String>,
    pub competencia: Option<String>,
    pub ruleset_id: Option<String>,
    pub modo_analise: Option<String>,
    /// Custom post-reform scenario rates; the ruleset defaults apply when absent.
    pub cenarios: Option<BTreeMap<String, f64>>,
}

/// A normalized value and whether it came from a default.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Resolved<T> {
    pub value: T,
    pub defaulted: bool,
}

impl<T: Copy> Resolved<T> {
    pub fn informed(value: T) -> Self {
        Self {
            value,
            defaulted: false,
        }
    }

    pub fn defaulted(value: T) -> Self {
        Self {
            value,
            defaulted: true,
        }
    }

    /// The value only if the request supplied it.
    pub fn informed_value(&self) -> Option<T> {
        (!self.defaulted).then_some(self.value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyProfile {
    pub company_name: String,
    pub revenue: f64,
    pub regime: RegimeCode,
    pub periodicity: Periodicity,
    pub competencia: Option<String>,
    pub ruleset_id: String,
    pub mode: AnalysisMode,
    pub rbt12: Resolved<f64>,
    pub period_base: Resolved<f64>,
    pub margin: Resolved<f64>,
    pub activity: Option<String>,
    pub annex: Option<AnnexSelection>,
    /// Normalized annex code that matched no known annex. Blocks Simples
    /// without failing the whole request.
    pub unrecognized_annex: Option<String>,
    pub fator_r: Option<f64>,
    pub payroll_12m: Option<f64>,
    pub deductible_expenses: Option<f64>,
    pub credit_percent: Option<f64>,
    pub assumptions: Vec<String>,
    pub missing_inputs: Vec<String>,
}

impl CompanyProfile {
    /// Validate and normalize `input`. `default_ruleset_id` applies when the
    /// request carries no override.
    pub fn normalize(
        input: &DiagnosticInput,
        default_ruleset_id: &str,
    ) -> Result<Self, InputValidationError> {
        let company_name = input.nome_empresa.trim();
        if company_name.is_empty() {
            return Err(InputValidationError::EmptyCompanyName);
        }
        if !(input.receita_anual > 0.0) {
            return Err(InputValidationError::NonPositiveRevenue);
        }
        let revenue = input.receita_anual;

        let regime = RegimeCode::parse(&input.regime)?;
        let mode = AnalysisMode::parse(input.modo_analise.as_deref().unwrap_or_default())?;
        let periodicity = Periodicity::parse(input.periodicidade.as_deref().unwrap_or_default())?;

        let mut assumptions = Vec::new();
        let mut missing_inputs = Vec::new();

        let competencia = match blank_to_none(input.competencia.as_deref()) {
            None => None,
            Some(raw) => match validate_competencia(periodicity, raw) {
                Ok(value) => Some(value),
                Err(msg) => {
                    assumptions.push(format!(
                        "Competência inválida no input foi descartada ({msg}); metadado mantido sem competência."
                    ));
                    None
                }
            },
        };

        let ruleset_id = blank_to_none(input.ruleset_id.as_deref())
            .unwrap_or(default_ruleset_id)
            .to_string();

        let rbt12 = match input.rbt12 {
            Some(v) if !(v > 0.0) => return Err(InputValidationError::NonPositiveRbt12),
            Some(v) => Resolved::informed(v),
            None => {
                assumptions.push(
                    "RBT12 não informado; assumido igual à receita anual para metadados/comparativo."
                        .to_string(),
                );
                Resolved::defaulted(revenue)
            }
        };

        let period_base = match input.receita_base_periodo {
            Some(v) if !(v > 0.0) => return Err(InputValidationError::NonPositivePeriodBase),
            Some(v) => Resolved::informed(v),
            None => {
                assumptions.push(
                    "Receita base do período não informada; assumida igual à receita anual."
                        .to_string(),
                );
                Resolved::defaulted(revenue)
            }
        };

        let margin = match input.margem_lucro {
            Some(v) if v < 0.0 => return Err(InputValidationError::NegativeMargin),
            Some(v) => Resolved::informed(v),
            None => {
                assumptions.push(
                    "Margem de lucro não informada; assumida em 10% para análises de Lucro Real."
                        .to_string(),
                );
                Resolved::defaulted(DEFAULT_MARGIN)
            }
        };

        if let Some(fr) = input.fator_r {
            if !(0.0..=1.0).contains(&fr) {
                return Err(InputValidationError::FatorROutOfRange(fr));
            }
        }
        if input.folha_12m.is_some_and(|p| p < 0.0) {
            return Err(InputValidationError::NegativePayroll);
        }

        let raw_annex = blank_to_none(input.anexo_simples.as_deref());
        let annex = raw_annex.and_then(AnnexSelection::parse);
        let unrecognized_annex = match (raw_annex, annex) {
            (Some(raw), None) => Some(normalize_annex_code(raw)),
            _ => None,
        };

        if annex == Some(AnnexSelection::ServicesByFatorR)
            && input.fator_r.is_none()
            && input.folha_12m.is_none()
        {
            missing_inputs.push("Simples III/V requer fator_r ou folha_12m.".to_string());
        }
        let activity = blank_to_none(input.tipo_atividade.as_deref()).map(str::to_string);
        match regime {
            RegimeCode::Simples if raw_annex.is_none() => {
                missing_inputs.push("Anexo do Simples não informado.".to_string());
            }
            RegimeCode::Presumido if activity.is_none() => {
                missing_inputs.push("Tipo de atividade não informado para Presumido.".to_string());
            }
            _ => {}
        }

        Ok(Self {
            company_name: company_name.to_string(),
            revenue,
            regime,
            periodicity,
            competencia,
            ruleset_id,
            mode,
            rbt12,
            period_base,
            margin,
            activity,
            annex,
            unrecognized_annex,
            fator_r: input.fator_r,
            payroll_12m: input.folha_12m,
            deductible_expenses: input.despesas_creditaveis,
            credit_percent: input.percentual_credito_estimado,
            assumptions,
            missing_inputs,
        })
    }

    /// Whether a composite III/V annex lacks both Fator R inputs.
    pub fn lacks_fator_r_inputs(&self) -> bool {
        self.annex == Some(AnnexSelection::ServicesByFatorR)
            && self.fator_r.is_none()
            && self.payroll_12m.is_none()
    }

    /// Calculator inputs shared by every regime.
    pub fn calculation_request(&self) -> CalculationRequest {
        CalculationRequest {
            revenue: self.revenue,
            period_base: self.period_base.informed_value(),
            rbt12: Some(self.rbt12.value),
            annex: self.annex,
            fator_r: self.fator_r,
            payroll_12m: self.payroll_12m,
            activity: self.activity.clone(),
            periodicity: self.periodicity,
            margin: self.margin.value,
            deductible_expenses: self.deductible_expenses,
            credit_percent: self.credit_percent,
        }
    }
}

fn blank_to_none(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|s| !s.is_empty())
}
