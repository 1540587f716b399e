//! # Error Types — Fatal, Recoverable, and User-Correctable
//!
//! Three error kinds cross crate boundaries:
//!
//! - [`InputValidationError`]: the request itself is wrong. Reported back
//!   before any calculation is attempted.
//! - [`RulesetIntegrityError`]: a required rule-table key is missing or
//!   malformed. Fatal: the request aborts and the error is never downgraded.
//! - [`CalculationDomainError`]: a per-regime problem with the inputs of one
//!   calculator (e.g. a credit percentage outside [0, 1]). The comparator
//!   turns it into a BLOCKED row.
//!
//! The `Display` output of [`RulesetIntegrityError`] is a machine-greppable
//! contract consumed by downstream tooling:
//!
//! ```text
//! ruleset_id=BR_TAX_2026_V1 | arquivo=simples_tables.json | chave=fator_r_limite | regime=Simples Nacional | impacto=Nao e possivel determinar anexo III/V | detalhe=chave ausente
//! ```

use thiserror::Error;

/// A required rule-table entry is absent or has the wrong shape.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("ruleset_id={ruleset_id} | arquivo={file} | chave={key} | regime={regime} | impacto={impact} | detalhe={detail}")]
pub struct RulesetIntegrityError {
    /// Ruleset the failing file belongs to.
    pub ruleset_id: String,
    /// Rule file name (e.g. `simples_tables.json`).
    pub file: String,
    /// Dotted key path inside the file (e.g. `anexos.III`).
    pub key: String,
    /// Display name of the affected regime, or `Todos`.
    pub regime: String,
    /// What cannot be computed because of the failure.
    pub impact: String,
    /// Short description of the defect (e.g. `chave ausente`).
    pub detail: String,
}

/// A per-regime calculation cannot proceed with the supplied inputs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("regime={regime} | impacto={impact} | detalhe={detail}")]
pub struct CalculationDomainError {
    /// Display name of the regime that rejected its inputs.
    pub regime: String,
    /// What cannot be computed.
    pub impact: String,
    /// The offending value or rule.
    pub detail: String,
}

impl CalculationDomainError {
    pub fn new(
        regime: impl Into<String>,
        impact: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            regime: regime.into(),
            impact: impact.into(),
            detail: detail.into(),
        }
    }
}

/// User-correctable request errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InputValidationError {
    #[error("nome_empresa é obrigatório.")]
    EmptyCompanyName,

    #[error("receita_anual deve ser maior que zero.")]
    NonPositiveRevenue,

    #[error("rbt12 deve ser maior que zero quando informado.")]
    NonPositiveRbt12,

    #[error("receita_base_periodo deve ser maior que zero quando informada.")]
    NonPositivePeriodBase,

    #[error("margem_lucro não pode ser negativa.")]
    NegativeMargin,

    #[error("fator_r deve estar entre 0 e 1 (recebido {0}).")]
    FatorROutOfRange(f64),

    #[error("folha_12m deve ser maior ou igual a zero.")]
    NegativePayroll,

    #[error("regime desconhecido: {0:?}")]
    UnknownRegime(String),

    #[error("modo de analise desconhecido: {0:?} (use conservador ou estrategico)")]
    UnknownAnalysisMode(String),

    #[error("periodicidade invalida: {0:?} (use mensal, trimestral ou anual)")]
    InvalidPeriodicity(String),

    #[error("anexo do Simples nao informado para o regime selecionado.")]
    MissingAnnex,

    #[error("anexo do Simples desconhecido: {0:?} (use I, II, III, IV, V ou III/V)")]
    UnknownAnnex(String),

    #[error("Simples III/V requer fator_r ou folha_12m.")]
    MissingFatorRInputs,

    #[error("aliquota de cenario invalida para {name:?}: {rate}")]
    InvalidScenarioRate { name: String, rate: f64 },
}

/// Error during canonical serialization.
#[derive(Error, Debug)]
pub enum CanonicalizationError {
    /// JSON serialization failed.
    #[error("serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}
