//! # Diagnostic Service
//!
//! Orchestrates one request end to end:
//!
//! ```text
//! normalize -> load bundle -> current regime -> eligibility -> comparison
//!   -> recommendation -> integrity summary -> audit record -> scenarios
//!   -> narrative
//! ```
//!
//! Fatal conditions abort with an [`EngineError`]: malformed input, a
//! missing or malformed rule key, a domain error on the user-selected
//! regime, or an integrity audit that cannot run. A domain error on any
//! other regime only blocks its comparison row, and an integrity FAIL is
//! reported in the output.

use tde_core::{InputValidationError, RegimeCode, Timestamp};
use tde_integrity::audit_ruleset_at;
use tde_regimes::calculate;
use tde_ruleset::{AnnexSelection, RulesetBundle, RulesetStore};
use uuid::Uuid;

use crate::audit_record::{build_audit_record, AuditContext};
use crate::comparator::compare_regimes;
use crate::config::EngineConfig;
use crate::eligibility::evaluate_eligibility;
use crate::error::EngineResult;
use crate::output::DiagnosticOutput;
use crate::profile::{CompanyProfile, DiagnosticInput};
use crate::recommendation::recommend;
use crate::report::render_narrative;
use crate::scenarios::{scenario_rates, simulate};

/// Stateless apart from the shared ruleset cache. Clone to share.
#[derive(Debug, Clone)]
pub struct DiagnosticService {
    store: RulesetStore,
    default_ruleset_id: String,
}

impl DiagnosticService {
    pub fn new(store: RulesetStore, default_ruleset_id: impl Into<String>) -> Self {
        Self {
            store,
            default_ruleset_id: default_ruleset_id.into(),
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(
            RulesetStore::new(config.rulesets_dir.clone()),
            config.default_ruleset_id.clone(),
        )
    }

    pub fn store(&self) -> &RulesetStore {
        &self.store
    }

    pub fn run(&self, input: &DiagnosticInput) -> EngineResult<DiagnosticOutput> {
        self.run_at(input, Timestamp::now())
    }

    /// Run with an explicit generation time.
    pub fn run_at(
        &self,
        input: &DiagnosticInput,
        generated_at: Timestamp,
    ) -> EngineResult<DiagnosticOutput> {
        let profile = CompanyProfile::normalize(input, &self.default_ruleset_id)?;
        check_selected_regime_inputs(&profile)?;

        let bundle = RulesetBundle::load(&self.store, &profile.ruleset_id)?;
        let current = calculate(profile.regime, &profile.calculation_request(), &bundle)?;

        let eligibility = evaluate_eligibility(&profile, &bundle.eligibility);
        let comparison = compare_regimes(&profile, &eligibility, &bundle)?;
        let recommendation = recommend(&profile, &comparison);

        let integrity = audit_ruleset_at(&self.store, &profile.ruleset_id, generated_at)?.summary();
        if !integrity.status.is_pass() {
            tracing::warn!(
                ruleset_id = %profile.ruleset_id,
                differences = integrity.difference_count,
                failed_checks = integrity.failed_checks,
                "ruleset integrity FAIL; diagnostic continues with alert"
            );
        }

        let audit = build_audit_record(AuditContext {
            profile: &profile,
            bundle: &bundle,
            current: &current.detail,
            eligibility: &eligibility,
            recommendation: &recommendation,
            integrity,
            generated_at,
        })?;

        let rates = scenario_rates(input.cenarios.as_ref(), &bundle.metadata)?;
        let resultados = simulate(profile.revenue, current.tax, &rates);

        let mut output = DiagnosticOutput {
            id: Uuid::new_v4(),
            nome_empresa: profile.company_name.clone(),
            receita_anual: profile.revenue,
            regime: profile.regime,
            periodicidade: profile.periodicity,
            competencia: profile.competencia.clone(),
            modo_analise: profile.mode,
            ruleset_id: audit.ruleset_id.clone(),
            imposto_atual: current.tax,
            detalhes_regime: current.detail,
            eligibility,
            comparison,
            recommendation,
            audit,
            resultados,
            relatorio_texto: String::new(),
        };
        output.relatorio_texto = render_narrative(&output);

        tracing::info!(
            id = %output.id,
            regime = %output.regime,
            ruleset_id = %output.ruleset_id,
            tax = output.imposto_atual,
            recommendation = %output.recommendation.status,
            "diagnostic completed"
        );
        Ok(output)
    }
}

/// Inputs the selected regime cannot be computed without. Other regimes
/// only surface them through eligibility.
fn check_selected_regime_inputs(profile: &CompanyProfile) -> Result<(), InputValidationError> {
    if profile.regime != RegimeCode::Simples {
        return Ok(());
    }
    if let Some(code) = &profile.unrecognized_annex {
        return Err(InputValidationError::UnknownAnnex(code.clone()));
    }
    match profile.annex {
        None => Err(InputValidationError::MissingAnnex),
        Some(AnnexSelection::ServicesByFatorR) if profile.lacks_fator_r_inputs() => {
            Err(InputValidationError::MissingFatorRInputs)
        }
        Some(_) => Ok(()),
    }
}
