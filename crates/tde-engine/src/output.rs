//! The self-contained record a diagnostic returns and the history stores.

use serde::{Deserialize, Serialize};
use tde_core::{AnalysisMode, Periodicity, RegimeCode};
use tde_regimes::RegimeDetail;
use uuid::Uuid;

use crate::audit_record::AuditRecord;
use crate::comparator::ComparisonRow;
use crate::eligibility::EligibilityResult;
use crate::recommendation::Recommendation;
use crate::scenarios::ScenarioResult;

/// Everything needed to re-render the narrative without recomputation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticOutput {
    pub id: Uuid,
    pub nome_empresa: String,
    pub receita_anual: f64,
    pub regime: RegimeCode,
    pub periodicidade: Periodicity,
    pub competencia: Option<String>,
    pub modo_analise: AnalysisMode,
    pub ruleset_id: String,
    /// Tax of the user-selected regime.
    pub imposto_atual: f64,
    pub detalhes_regime: RegimeDetail,
    pub eligibility: Vec<EligibilityResult>,
    pub comparison: Vec<ComparisonRow>,
    pub recommendation: Recommendation,
    pub audit: AuditRecord,
    pub resultados: Vec<ScenarioResult>,
    #[serde(default)]
    pub relatorio_texto: String,
}

impl DiagnosticOutput {
    pub fn integrity_failed(&self) -> bool {
        !self.audit.integrity.status.is_pass()
    }
}
