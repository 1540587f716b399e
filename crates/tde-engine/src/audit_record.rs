//! # Audit Record — Compliance Trail of One Diagnostic
//!
//! Built once per request from values already computed by the service. The
//! builder reads nothing from disk: the integrity summary is passed in, and
//! the ruleset metadata comes from the loaded bundle.
//!
//! Official references are mandatory. A ruleset whose `fontes_oficiais` is
//! absent or empty fails the whole request with a
//! [`RulesetIntegrityError`].

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tde_core::{RegimeCode, RulesetIntegrityError, Timestamp};
use tde_integrity::IntegritySummary;
use tde_regimes::{CreditCriterion, RegimeDetail};
use tde_ruleset::{MetadataSubset, RulesetBundle};

use crate::eligibility::{find, EligibilityResult};
use crate::profile::CompanyProfile;
use crate::recommendation::{dedupe, Recommendation, RecommendationStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalculationKind {
    /// Table-driven: Simples and Presumido.
    EstimativaParametrizada,
    /// Margin-driven: Real.
    Estimativa,
}

impl CalculationKind {
    pub fn for_regime(regime: RegimeCode) -> Self {
        match regime {
            RegimeCode::Simples | RegimeCode::Presumido => Self::EstimativaParametrizada,
            RegimeCode::Real => Self::Estimativa,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EstimativaParametrizada => "estimativa_parametrizada",
            Self::Estimativa => "estimativa",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub ruleset_id: String,
    pub ruleset_metadata: MetadataSubset,
    pub as_of_date: NaiveDate,
    pub generated_at: Timestamp,
    pub calculo_tipo: CalculationKind,
    pub sources: Vec<String>,
    pub references: Vec<String>,
    pub integrity: IntegritySummary,
    pub assumptions: Vec<String>,
    pub limitations: Vec<String>,
    pub alerts: Vec<String>,
}

/// Everything the builder folds into one record.
pub struct AuditContext<'a> {
    pub profile: &'a CompanyProfile,
    pub bundle: &'a RulesetBundle,
    /// Detail of the user-selected regime.
    pub current: &'a RegimeDetail,
    pub eligibility: &'a [EligibilityResult],
    pub recommendation: &'a Recommendation,
    pub integrity: IntegritySummary,
    pub generated_at: Timestamp,
}

pub const INTEGRITY_FAIL_ALERT: &str =
    "Integridade do ruleset/baseline em FAIL. Verificar auditoria de compliance.";

pub fn build_audit_record(ctx: AuditContext<'_>) -> Result<AuditRecord, RulesetIntegrityError> {
    let metadata = &ctx.bundle.metadata;
    let ruleset_id = metadata.ruleset_id().to_string();
    let regime = ctx.current.regime();
    let references = metadata.references()?;

    let mut assumptions = vec![
        "Valores tratados como anuais; periodicidade registrada, mas a matematica ainda e anual."
            .to_string(),
        "Adicional IRPJ aplica limite conforme periodicidade (mensal/trimestral/anual); calculo \
         ainda usa base anual (aproximacao)."
            .to_string(),
    ];
    let mut limitations = vec![
        "Nao cobre excecoes setoriais (monofasico, ST, aliquota zero, regimes especiais).".to_string(),
        "Creditos de PIS/COFINS (nao cumulativo) apenas estimados; sem apuracao item a item."
            .to_string(),
        "Nao valida elegibilidade completa de regimes.".to_string(),
        "Apuracao por periodo (mensal/trimestral) para toda a matematica tributaria ainda esta em \
         roadmap."
            .to_string(),
    ];

    match ctx.current {
        RegimeDetail::Simples(_) => assumptions.extend(
            [
                "Simples: calculo tabelado por anexo/faixa com base no RBT12 informado.",
                "Fator R e aplicado apenas quando o anexo informado e III/V.",
                "Se receita_base_periodo nao for informada, usa-se a receita anual como base de \
                 calculo.",
            ]
            .map(String::from),
        ),
        RegimeDetail::Presumido(_) => assumptions.push(
            "Lucro Presumido utiliza percentuais por tipo de atividade conforme ruleset.".to_string(),
        ),
        RegimeDetail::Real(real) => {
            assumptions.push(
                "Lucro Real estimado por margem (nao substitui apuracao contabil/fiscal).".to_string(),
            );
            assumptions.push(
                "PIS/COFINS nao cumulativo aplicado sobre base de receita do periodo (ou receita \
                 anual quando nao informada)."
                    .to_string(),
            );
            assumptions.push(match real.criterio_credito_pis_cofins {
                CreditCriterion::NaoInformadoAssumidoZero => {
                    "Creditos de PIS/COFINS nao informados; assumidos como zero.".to_string()
                }
                _ => "Creditos de PIS/COFINS estimados conforme dados de entrada informados."
                    .to_string(),
            });
            limitations.push(
                "Creditos dependem da estrutura de custos/insumos e documentacao fiscal; \
                 estimativa simplificada."
                    .to_string(),
            );
        }
    }
    assumptions.extend(ctx.profile.assumptions.iter().cloned());
    assumptions.push(format!(
        "Recomendação executada em modo: {}.",
        ctx.recommendation.modo
    ));

    let mut alerts = Vec::new();
    if let Some(result) = find(ctx.eligibility, regime) {
        alerts.extend(result.alerts());
    }
    alerts.extend(ctx.current.alerts());
    if ctx.recommendation.status == RecommendationStatus::Negada {
        alerts.push(
            "Recomendação conservadora negada por elegibilidade/insuficiência de dados.".to_string(),
        );
    }
    if !ctx.integrity.status.is_pass() {
        alerts.push(INTEGRITY_FAIL_ALERT.to_string());
    }

    Ok(AuditRecord {
        sources: sources_for(regime, &ruleset_id),
        ruleset_metadata: metadata.subset(),
        ruleset_id,
        as_of_date: ctx.generated_at.date(),
        generated_at: ctx.generated_at,
        calculo_tipo: CalculationKind::for_regime(regime),
        references,
        integrity: ctx.integrity,
        assumptions,
        limitations,
        alerts: dedupe(alerts),
    })
}

fn sources_for(regime: RegimeCode, ruleset_id: &str) -> Vec<String> {
    let mut sources = vec![
        format!("Parametros e tabelas carregados do ruleset: {ruleset_id}."),
        "Regras de elegibilidade carregadas de eligibility_rules.json do ruleset.".to_string(),
    ];
    let specific: &[&str] = match regime {
        RegimeCode::Simples => &[
            "Simples Nacional: calculo por anexo/faixa com formula da aliquota efetiva.",
            "Tabelas dos Anexos I a V sao lidas de simples_tables.json do ruleset.",
            "Simples Partilha: fonte = ruleset.simples_tables.json (percentuais por tributo).",
            "Cenarios pos-reforma deste MVP usam aliquotas parametrizadas para analise comparativa.",
        ],
        RegimeCode::Presumido => &[
            "IRPJ/CSLL (regras gerais): adicional de IRPJ com limite por periodicidade definido no \
             ruleset.",
            "PIS/COFINS cumulativo no Presumido: parametros lidos do ruleset.",
            "Percentual de presuncao por tipo de atividade e lido do ruleset.",
        ],
        RegimeCode::Real => &[
            "Lucro Real neste MVP: estimativa por margem para IRPJ/CSLL.",
            "Parametros de IRPJ/CSLL/PIS/COFINS no Lucro Real sao lidos de real_params.json do \
             ruleset.",
            "Cenarios pos-reforma deste MVP usam aliquotas parametrizadas para analise comparativa.",
        ],
    };
    sources.extend(specific.iter().map(|s| s.to_string()));
    sources
}
