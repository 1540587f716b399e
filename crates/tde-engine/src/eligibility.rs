//! # Eligibility — OK / WARNING / BLOCKED per Regime
//!
//! A pure function of the normalized profile and the ruleset's eligibility
//! rules. Results are returned in [`RegimeCode::all`] order.
//!
//! - **Simples**: BLOCKED when RBT12 exceeds the ruleset ceiling, when the
//!   annex is missing or unrecognized, or when a composite III/V annex has no
//!   Fator R input.
//! - **Presumido**: BLOCKED only above the revenue ceiling; a missing
//!   activity type is a WARNING because the calculator falls back.
//! - **Real**: OK unless the margin was defaulted, which makes it WARNING.

use serde::{Deserialize, Serialize};
use tde_core::{format_brl, EligibilityStatus, RegimeCode};
use tde_ruleset::EligibilityRules;

use crate::profile::CompanyProfile;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibilityResult {
    pub regime_code: RegimeCode,
    pub status: EligibilityStatus,
    pub reasons: Vec<String>,
    pub missing_inputs: Vec<String>,
    pub assumptions: Vec<String>,
}

impl EligibilityResult {
    /// Reasons followed by missing inputs, the order rows display them in.
    pub fn alerts(&self) -> Vec<String> {
        self.reasons
            .iter()
            .chain(&self.missing_inputs)
            .cloned()
            .collect()
    }
}

pub fn evaluate_eligibility(
    profile: &CompanyProfile,
    rules: &EligibilityRules,
) -> Vec<EligibilityResult> {
    RegimeCode::all()
        .iter()
        .map(|regime| {
            let result = match regime {
                RegimeCode::Simples => simples(profile, rules),
                RegimeCode::Presumido => presumido(profile, rules),
                RegimeCode::Real => real(profile, rules),
            };
            tracing::debug!(
                regime = %result.regime_code,
                status = %result.status,
                reasons = result.reasons.len(),
                missing = result.missing_inputs.len(),
                "eligibility evaluated"
            );
            result
        })
        .collect()
}

/// Look up one regime in an evaluation.
pub fn find(results: &[EligibilityResult], regime: RegimeCode) -> Option<&EligibilityResult> {
    results.iter().find(|r| r.regime_code == regime)
}

fn simples(profile: &CompanyProfile, rules: &EligibilityRules) -> EligibilityResult {
    let mut reasons = Vec::new();
    let mut missing_inputs = Vec::new();
    let mut assumptions = Vec::new();

    if profile.rbt12.value > rules.simples_rbt12_max {
        reasons.push(format!(
            "RBT12 acima do limite do Simples ({}).",
            format_brl(rules.simples_rbt12_max)
        ));
    }
    if let Some(code) = &profile.unrecognized_annex {
        reasons.push(format!("Anexo do Simples invalido: {code}."));
    } else if profile.annex.is_none() {
        missing_inputs.push("Anexo do Simples".to_string());
        assumptions.push("Comparativo não inferiu anexo automaticamente para Simples.".to_string());
    } else if profile.lacks_fator_r_inputs() {
        missing_inputs.push("fator_r ou folha_12m para III/V".to_string());
    }

    let status = if reasons.is_empty() && missing_inputs.is_empty() {
        EligibilityStatus::Ok
    } else {
        EligibilityStatus::Blocked
    };
    EligibilityResult {
        regime_code: RegimeCode::Simples,
        status,
        reasons,
        missing_inputs,
        assumptions,
    }
}

fn presumido(profile: &CompanyProfile, rules: &EligibilityRules) -> EligibilityResult {
    let mut reasons = Vec::new();
    let mut missing_inputs = Vec::new();
    let mut assumptions = Vec::new();

    if profile.revenue > rules.presumido_receita_max {
        reasons.push(format!(
            "Receita anual acima do limite do Presumido ({}).",
            format_brl(rules.presumido_receita_max)
        ));
    }
    if profile.activity.is_none() {
        missing_inputs.push("Tipo de atividade".to_string());
        assumptions.push(
            "Sem tipo de atividade, o cálculo do Presumido pode usar fallback do ruleset."
                .to_string(),
        );
    }

    let status = if !reasons.is_empty() {
        EligibilityStatus::Blocked
    } else if !missing_inputs.is_empty() {
        EligibilityStatus::Warning
    } else {
        EligibilityStatus::Ok
    };
    EligibilityResult {
        regime_code: RegimeCode::Presumido,
        status,
        reasons,
        missing_inputs,
        assumptions,
    }
}

fn real(profile: &CompanyProfile, rules: &EligibilityRules) -> EligibilityResult {
    let mut assumptions = Vec::new();
    let status = if profile.margin.defaulted {
        assumptions.push("Margem de lucro foi assumida por default no perfil normalizado.".to_string());
        EligibilityStatus::Warning
    } else {
        EligibilityStatus::Ok
    };
    assumptions.extend(rules.real_warnings.iter().cloned());
    EligibilityResult {
        regime_code: RegimeCode::Real,
        status,
        reasons: Vec::new(),
        missing_inputs: Vec::new(),
        assumptions,
    }
}
