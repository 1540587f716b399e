//! # Lucro Real Calculator (margin estimate)
//!
//! IRPJ and CSLL apply to `revenue * margin`. PIS/COFINS is non-cumulative:
//! a debit on the period base, offset by an optional credit that is never
//! allowed to exceed the debit.
//!
//! ## Credit input precedence
//!
//! 1. `deductible_expenses * (pis + cofins)`
//! 2. `(base * credit_percent) * (pis + cofins)`
//! 3. zero, recorded as `nao_informado_assumido_zero`
//!
//! A credit estimate above the debit is clamped and flagged.

use serde::{Deserialize, Serialize};
use tde_core::{CalculationDomainError, RegimeCode};
use tde_ruleset::RealParams;

use crate::error::CalculationResult;

const IMPACT_CREDIT: &str = "Nao e possivel calcular credito de PIS/COFINS";

/// Alert attached to every clamped credit.
pub const CREDIT_CLAMP_ALERT: &str = "Crédito de PIS/COFINS informado excede o débito; \
     crédito foi limitado ao débito para evitar valor negativo.";

#[derive(Debug, Clone, PartialEq)]
pub struct RealInput {
    pub revenue: f64,
    /// PIS/COFINS base; `None` means the annual revenue.
    pub period_base: Option<f64>,
    pub margin: f64,
    pub deductible_expenses: Option<f64>,
    pub credit_percent: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreditCriterion {
    DespesasCreditaveis,
    PercentualCreditoEstimado,
    NaoInformadoAssumidoZero,
}

impl CreditCriterion {
    /// Whether the credit comes from an estimate rather than a hard figure.
    pub fn is_estimate(&self) -> bool {
        matches!(self, Self::PercentualCreditoEstimado)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PisCofinsBase {
    ReceitaBasePeriodo,
    ReceitaAnual,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RealDetail {
    pub margem_lucro_estimada: f64,
    pub aliquota_irpj: f64,
    pub aliquota_csll: f64,
    pub aliquota_pis_nao_cumulativo: f64,
    pub aliquota_cofins_nao_cumulativo: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub despesas_creditaveis: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percentual_credito_estimado: Option<f64>,
    pub base_pis_cofins_usada: PisCofinsBase,
    pub valor_base_pis_cofins: f64,
    pub lucro_estimado: f64,
    pub irpj_calculado: f64,
    pub csll_calculado: f64,
    pub debito_pis_cofins_nao_cumulativo: f64,
    pub credito_pis_cofins_original: f64,
    pub credito_pis_cofins_utilizado: f64,
    pub credito_limitado_ao_debito: bool,
    pub pis_cofins_nao_cumulativo_liquido: f64,
    pub criterio_credito_pis_cofins: CreditCriterion,
}

/// Credit actually used and whether the estimate was clamped.
pub fn clamp_credit(original: f64, debit: f64) -> (f64, bool) {
    (original.min(debit), original > debit)
}

pub fn calculate(input: &RealInput, params: &RealParams) -> CalculationResult<(f64, RealDetail)> {
    let regime = RegimeCode::Real.display_name();
    let domain = |impact: &str, detail: &str| CalculationDomainError::new(regime, impact, detail);

    if input.revenue <= 0.0 {
        return Err(domain(
            "Nao e possivel calcular lucro estimado",
            "receita_anual deve ser maior que zero",
        )
        .into());
    }
    let (base, base_kind) = match input.period_base {
        Some(b) => (b, PisCofinsBase::ReceitaBasePeriodo),
        None => (input.revenue, PisCofinsBase::ReceitaAnual),
    };
    if base <= 0.0 {
        return Err(domain(
            "Nao e possivel calcular PIS/COFINS nao cumulativo",
            "receita_base_periodo deve ser maior que zero",
        )
        .into());
    }
    if input.margin < 0.0 {
        return Err(domain(
            "Nao e possivel calcular lucro estimado",
            "margem_lucro nao pode ser negativa",
        )
        .into());
    }
    if matches!(input.deductible_expenses, Some(d) if d < 0.0) {
        return Err(domain(IMPACT_CREDIT, "despesas_creditaveis deve ser >= 0").into());
    }
    if matches!(input.credit_percent, Some(p) if !(0.0..=1.0).contains(&p)) {
        return Err(domain(
            IMPACT_CREDIT,
            "percentual_credito_estimado deve estar entre 0 e 1",
        )
        .into());
    }

    let rate = params.combined_pis_cofins();
    let profit = input.revenue * input.margin;
    let irpj = profit * params.irpj;
    let csll = profit * params.csll;
    let debit = base * rate;

    let (credit_original, criterion) = match (input.deductible_expenses, input.credit_percent) {
        (Some(expenses), _) => (expenses * rate, CreditCriterion::DespesasCreditaveis),
        (None, Some(pct)) => (base * pct * rate, CreditCriterion::PercentualCreditoEstimado),
        (None, None) => (0.0, CreditCriterion::NaoInformadoAssumidoZero),
    };
    let (credit_used, clamped) = clamp_credit(credit_original, debit);
    if clamped {
        tracing::warn!(
            credit_original,
            debit,
            "PIS/COFINS credit exceeds debit; clamped"
        );
    }
    let net = debit - credit_used;
    let tax = irpj + csll + net;

    tracing::debug!(profit, debit, credit_used, tax, "real calculated");

    Ok((
        tax,
        RealDetail {
            margem_lucro_estimada: input.margin,
            aliquota_irpj: params.irpj,
            aliquota_csll: params.csll,
            aliquota_pis_nao_cumulativo: params.pis_nao_cumulativo,
            aliquota_cofins_nao_cumulativo: params.cofins_nao_cumulativo,
            despesas_creditaveis: input.deductible_expenses,
            percentual_credito_estimado: input.credit_percent,
            base_pis_cofins_usada: base_kind,
            valor_base_pis_cofins: base,
            lucro_estimado: profit,
            irpj_calculado: irpj,
            csll_calculado: csll,
            debito_pis_cofins_nao_cumulativo: debit,
            credito_pis_cofins_original: credit_original,
            credito_pis_cofins_utilizado: credit_used,
            credito_limitado_ao_debito: clamped,
            pis_cofins_nao_cumulativo_liquido: net,
            criterio_credito_pis_cofins: criterion,
        },
    ))
}
