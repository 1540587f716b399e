//! # Simples Nacional Calculator
//!
//! Bracket lookup by RBT12, effective-rate formula, Fator R resolution of
//! the composite III/V annex, and the DAS split across seven taxes.
//!
//! ```text
//! effective = max(0, (RBT12 * nominal - deduction) / RBT12)
//! tax       = period_base * effective
//! share[t]  = tax * bracket.shares[t]
//! ```
//!
//! The eligibility ceiling and the Fator R threshold come from
//! [`SimplesTables`]; nothing here is hardcoded.

use serde::{Deserialize, Serialize};
use tde_core::{format_brl, CalculationDomainError, RegimeCode};
use tde_ruleset::{Annex, AnnexSelection, Bracket, SimplesTables, TaxShares};

use crate::error::CalculationResult;

const IMPACT_DAS: &str = "Nao e possivel calcular DAS";

#[derive(Debug, Clone, PartialEq)]
pub struct SimplesInput {
    /// Revenue of the period being taxed.
    pub period_base: f64,
    /// Trailing twelve-month revenue.
    pub rbt12: f64,
    pub annex: AnnexSelection,
    pub fator_r: Option<f64>,
    pub payroll_12m: Option<f64>,
}

/// Calculation memory for one Simples run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimplesDetail {
    pub anexo_informado: String,
    pub anexo_aplicado: Annex,
    /// 1-based bracket number.
    pub faixa: usize,
    pub aliquota_nominal: f64,
    pub parcela_deduzir: f64,
    pub aliquota_efetiva: f64,
    pub rbt12: f64,
    pub receita_base_periodo: f64,
    pub limite_elegibilidade_simples: f64,
    pub fator_r_limite: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fator_r: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folha_12m: Option<f64>,
    pub breakdown_percentuais: TaxShares,
    pub breakdown_das: TaxShares,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alerta_elegibilidade: Option<String>,
}

/// Resolve the composite III/V annex through Fator R.
///
/// Returns the applied annex and the Fator R used, if any. `fator_r` wins
/// over `payroll_12m / rbt12`. A Fator R equal to the threshold resolves to
/// annex III.
pub fn resolve_annex(
    input: &SimplesInput,
    threshold: f64,
) -> Result<(Annex, Option<f64>), CalculationDomainError> {
    match input.annex {
        AnnexSelection::Fixed(annex) => Ok((annex, input.fator_r)),
        AnnexSelection::ServicesByFatorR => {
            let fator_r = match (input.fator_r, input.payroll_12m) {
                (Some(fr), _) => fr,
                (None, Some(payroll)) => payroll / input.rbt12,
                (None, None) => {
                    return Err(CalculationDomainError::new(
                        RegimeCode::Simples.display_name(),
                        "Nao e possivel determinar anexo III/V",
                        "informe fator_r ou folha_12m para anexo III/V",
                    ))
                }
            };
            let annex = if fator_r >= threshold {
                Annex::III
            } else {
                Annex::V
            };
            Ok((annex, Some(fator_r)))
        }
    }
}

/// Lowest bracket whose ceiling is at least `rbt12`, or the last bracket
/// when RBT12 exceeds every ceiling. `brackets` must be non-empty.
pub fn select_bracket(brackets: &[Bracket], rbt12: f64) -> Option<&Bracket> {
    brackets
        .iter()
        .find(|b| rbt12 <= b.ceiling)
        .or_else(|| brackets.last())
}

pub fn effective_rate(rbt12: f64, nominal_rate: f64, deduction: f64) -> f64 {
    ((rbt12 * nominal_rate - deduction) / rbt12).max(0.0)
}

/// Split a DAS total by the bracket's shares.
pub fn split_das(shares: &TaxShares, tax: f64) -> TaxShares {
    shares.iter().map(|(t, pct)| (*t, tax * pct)).collect()
}

pub fn calculate(
    input: &SimplesInput,
    tables: &SimplesTables,
) -> CalculationResult<(f64, SimplesDetail)> {
    let regime = RegimeCode::Simples.display_name();
    if input.period_base <= 0.0 {
        return Err(CalculationDomainError::new(
            regime,
            IMPACT_DAS,
            "receita_base deve ser maior que zero",
        )
        .into());
    }
    if input.rbt12 <= 0.0 {
        return Err(
            CalculationDomainError::new(regime, IMPACT_DAS, "rbt12 deve ser maior que zero")
                .into(),
        );
    }

    let (annex, fator_r) = resolve_annex(input, tables.fator_r_threshold)?;
    let brackets = tables.brackets(annex)?;
    let bracket = select_bracket(brackets, input.rbt12).ok_or_else(|| {
        CalculationDomainError::new(regime, IMPACT_DAS, "tabela de faixas vazia")
    })?;

    let rate = effective_rate(input.rbt12, bracket.nominal_rate, bracket.deduction);
    let tax = input.period_base * rate;

    let alert = (input.rbt12 > tables.eligibility_ceiling).then(|| {
        format!(
            "RBT12 acima de {}: possível desenquadramento/limite Simples.",
            format_brl(tables.eligibility_ceiling)
        )
    });

    tracing::debug!(
        annex = %annex,
        bracket = bracket.number,
        effective_rate = rate,
        tax,
        "simples calculated"
    );

    Ok((
        tax,
        SimplesDetail {
            anexo_informado: input.annex.as_str().to_string(),
            anexo_aplicado: annex,
            faixa: bracket.number,
            aliquota_nominal: bracket.nominal_rate,
            parcela_deduzir: bracket.deduction,
            aliquota_efetiva: rate,
            rbt12: input.rbt12,
            receita_base_periodo: input.period_base,
            limite_elegibilidade_simples: tables.eligibility_ceiling,
            fator_r_limite: tables.fator_r_threshold,
            fator_r,
            folha_12m: input.payroll_12m,
            breakdown_percentuais: bracket.shares.clone(),
            breakdown_das: split_das(&bracket.shares, tax),
            alerta_elegibilidade: alert,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CalculationError;
    use crate::testing::{simples_tables, simples_tables_without};
    use tde_ruleset::Tributo;

    fn input(annex: AnnexSelection, rbt12: f64) -> SimplesInput {
        SimplesInput {
            period_base: rbt12,
            rbt12,
            annex,
            fator_r: None,
            payroll_12m: None,
        }
    }

    #[test]
    fn second_bracket_effective_rate() {
        // 360000 * 0.073 - 5940 = 20340; 20340 / 360000 = 0.0565
        let rate = effective_rate(360_000.0, 0.073, 5_940.0);
        assert!((rate - 0.0565).abs() < 1e-9);
    }

    #[test]
    fn effective_rate_floors_at_zero() {
        assert_eq!(effective_rate(1_000.0, 0.04, 5_940.0), 0.0);
    }

    #[test]
    fn boundary_belongs_to_lower_bracket() {
        let tables = simples_tables();
        let brackets = tables.brackets(Annex::I).unwrap();
        assert_eq!(select_bracket(brackets, 180_000.0).unwrap().number, 1);
        assert_eq!(select_bracket(brackets, 180_000.01).unwrap().number, 2);
    }

    #[test]
    fn rbt12_above_every_ceiling_uses_last_bracket_and_alerts() {
        let tables = simples_tables();
        let (_, detail) =
            calculate(&input(AnnexSelection::Fixed(Annex::I), 5_000_000.0), &tables).unwrap();
        assert_eq!(detail.faixa, 6);
        assert_eq!(
            detail.alerta_elegibilidade.as_deref(),
            Some("RBT12 acima de R$ 4.800.000,00: possível desenquadramento/limite Simples.")
        );
    }

    #[test]
    fn annex_i_second_bracket_total_and_breakdown() {
        let tables = simples_tables();
        let (tax, detail) =
            calculate(&input(AnnexSelection::Fixed(Annex::I), 360_000.0), &tables).unwrap();
        assert!((tax - 20_340.0).abs() < 1e-6);
        assert_eq!(detail.faixa, 2);
        assert_eq!(detail.alerta_elegibilidade, None);
        let das_sum: f64 = detail.breakdown_das.values().sum();
        assert!((das_sum - tax).abs() < 1e-6);
        assert!((detail.breakdown_das[&Tributo::Cpp] - tax * 0.415).abs() < 1e-9);
    }

    #[test]
    fn fator_r_from_payroll() {
        let tables = simples_tables();
        let mut inp = input(AnnexSelection::ServicesByFatorR, 1_000_000.0);
        inp.payroll_12m = Some(300_000.0);
        let (_, detail) = calculate(&inp, &tables).unwrap();
        assert_eq!(detail.anexo_aplicado, Annex::III);
        assert_eq!(detail.fator_r, Some(0.3));
        assert_eq!(detail.anexo_informado, "III/V");
    }

    #[test]
    fn explicit_fator_r_wins_over_payroll() {
        let tables = simples_tables();
        let mut inp = input(AnnexSelection::ServicesByFatorR, 1_000_000.0);
        inp.fator_r = Some(0.1);
        inp.payroll_12m = Some(900_000.0);
        let (_, detail) = calculate(&inp, &tables).unwrap();
        assert_eq!(detail.anexo_aplicado, Annex::V);
    }

    #[test]
    fn composite_annex_without_inputs_is_domain_error() {
        let tables = simples_tables();
        let err = calculate(&input(AnnexSelection::ServicesByFatorR, 500_000.0), &tables)
            .unwrap_err();
        assert!(matches!(err, CalculationError::Domain(_)));
    }

    #[test]
    fn absent_annex_table_is_fatal() {
        let tables = simples_tables_without(Annex::IV);
        let err = calculate(&input(AnnexSelection::Fixed(Annex::IV), 500_000.0), &tables)
            .unwrap_err();
        match err {
            CalculationError::Ruleset(e) => {
                assert_eq!(e.key, "anexos.IV");
                assert_eq!(e.detail, "anexo nao encontrado");
            }
            other => panic!("expected ruleset error, got {other:?}"),
        }
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn breakdown_sums_to_total(rbt12 in 1_000.0f64..6_000_000.0, base in 1.0f64..1_000_000.0) {
                let tables = simples_tables();
                for annex in [Annex::I, Annex::III, Annex::V] {
                    let inp = SimplesInput {
                        period_base: base,
                        rbt12,
                        annex: AnnexSelection::Fixed(annex),
                        fator_r: None,
                        payroll_12m: None,
                    };
                    let (tax, detail) = calculate(&inp, &tables).unwrap();
                    let sum: f64 = detail.breakdown_das.values().sum();
                    prop_assert!((sum - tax).abs() <= 1e-6 * tax.max(1.0));
                    prop_assert!(tax >= 0.0);
                }
            }

            #[test]
            fn fator_r_boundary(eps in 1e-9f64..0.01) {
                let tables = simples_tables();
                let threshold = tables.fator_r_threshold;
                let at = SimplesInput {
                    period_base: 100_000.0,
                    rbt12: 100_000.0,
                    annex: AnnexSelection::ServicesByFatorR,
                    fator_r: Some(threshold),
                    payroll_12m: None,
                };
                prop_assert_eq!(resolve_annex(&at, threshold).unwrap().0, Annex::III);
                let below = SimplesInput { fator_r: Some(threshold - eps), ..at };
                prop_assert_eq!(resolve_annex(&below, threshold).unwrap().0, Annex::V);
            }
        }
    }
}
