//! Typed view of `eligibility_rules.json`.
//!
//! ```json
//! {
//!   "simples":   { "rbt12_max": 4800000 },
//!   "presumido": { "receita_anual_max": 78000000 },
//!   "real":      { "warnings": ["..."] }
//! }
//! ```

use tde_core::{RegimeCode, RulesetIntegrityError};

use crate::table::RuleTable;

#[derive(Debug, Clone, PartialEq)]
pub struct EligibilityRules {
    pub ruleset_id: String,
    /// RBT12 above this blocks Simples.
    pub simples_rbt12_max: f64,
    /// Annual revenue above this blocks Presumido.
    pub presumido_receita_max: f64,
    /// Advisory notes attached to every Real evaluation.
    pub real_warnings: Vec<String>,
}

impl EligibilityRules {
    pub fn from_table(table: &RuleTable) -> Result<Self, RulesetIntegrityError> {
        let root = table.payload();

        let simples = table.context(
            RegimeCode::Simples.display_name(),
            "Não é possível avaliar elegibilidade do Simples",
        );
        let simples_obj = simples.object(root, "", "simples")?;
        let simples_rbt12_max = simples
            .with_impact("Não é possível validar limite de receita")
            .non_negative(simples_obj, "simples", "rbt12_max")?;

        let presumido = table.context(
            RegimeCode::Presumido.display_name(),
            "Não é possível avaliar elegibilidade do Presumido",
        );
        let presumido_obj = presumido.object(root, "", "presumido")?;
        let presumido_receita_max = presumido
            .with_impact("Não é possível validar limite de receita")
            .non_negative(presumido_obj, "presumido", "receita_anual_max")?;

        let real = table.context(
            RegimeCode::Real.display_name(),
            "Não é possível avaliar elegibilidade do Real",
        );
        let real_obj = real.object(root, "", "real")?;
        let real = real.with_impact("Não é possível carregar configuração mínima do Real");
        let warnings = real.list(real_obj, "real", "warnings")?;
        let real_warnings = warnings
            .iter()
            .enumerate()
            .map(|(idx, w)| {
                w.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| real.error(format!("real.warnings[{idx}]"), "texto invalido"))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            ruleset_id: table.ruleset_id().to_string(),
            simples_rbt12_max,
            presumido_receita_max,
            real_warnings,
        })
    }
}
