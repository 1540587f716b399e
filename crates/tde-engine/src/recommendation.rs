//! # Recommendation Policies
//!
//! Two selection policies over the comparison rows, chosen by
//! [`AnalysisMode`]:
//!
//! - **Conservative** (`OK_only`): candidates are OK rows with a tax and no
//!   critical alerts. The cheapest wins (RECOMENDADA); no candidate gives
//!   NEGADA.
//! - **Strategic** (`OK_and_WARNING`): every non-BLOCKED row with a tax is
//!   scored and ranked. The top entry is recommended as CONDICIONAL unless
//!   the ranking holds only WARNING rows while the profile still has missing
//!   inputs, which gives INCONCLUSIVA.
//!
//! ## Strategic score
//!
//! ```text
//! 100
//!  - 60 * (tax - min_tax) / max(min_tax, 1)
//!  - 20                        if WARNING
//!  - min(20, 5 * alerts)
//!  - 8                         if Real credit comes from a percentage estimate
//! ```
//!
//! Ranked by score descending, then tax ascending.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use tde_core::{fold_text, format_brl, AnalysisMode, EligibilityStatus, RegimeCode};
use tde_regimes::CreditCriterion;

use crate::comparator::ComparisonRow;
use crate::profile::CompanyProfile;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecommendationStatus {
    Recomendada,
    Negada,
    Condicional,
    Inconclusiva,
}

impl RecommendationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Recomendada => "RECOMENDADA",
            Self::Negada => "NEGADA",
            Self::Condicional => "CONDICIONAL",
            Self::Inconclusiva => "INCONCLUSIVA",
        }
    }
}

impl std::fmt::Display for RecommendationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which eligibility statuses a policy admits as candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CandidatePolicy {
    #[serde(rename = "OK_only")]
    OkOnly,
    #[serde(rename = "OK_and_WARNING")]
    OkAndWarning,
}

impl CandidatePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OkOnly => "OK_only",
            Self::OkAndWarning => "OK_and_WARNING",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExcludedRegime {
    pub regime: String,
    pub status: EligibilityStatus,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingEntry {
    pub regime_code: RegimeCode,
    pub regime_display: String,
    pub status_elegibilidade: EligibilityStatus,
    pub imposto_total: f64,
    pub carga_efetiva: Option<f64>,
    /// Rounded to two decimals.
    pub score: f64,
    pub tradeoffs: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub modo: AnalysisMode,
    pub status: RecommendationStatus,
    pub candidate_policy: CandidatePolicy,
    pub regime_recomendado: Option<RegimeCode>,
    pub regime_recomendado_display: Option<String>,
    pub justificativa: Vec<String>,
    #[serde(default)]
    pub por_que_nao_outros: Vec<String>,
    #[serde(default)]
    pub faltantes: Vec<String>,
    #[serde(default)]
    pub proximos_passos: Vec<String>,
    #[serde(default)]
    pub excluded_regimes: Vec<ExcludedRegime>,
    #[serde(default)]
    pub ranking: Vec<RankingEntry>,
}

const CONSERVATIVE_POLICY_NOTE: &str = "No modo conservador, apenas regimes com elegibilidade OK \
     entram como candidatos. Regimes com WARNING/BLOCKED sao excluidos.";

/// Dispatch on the profile's analysis mode.
pub fn recommend(profile: &CompanyProfile, rows: &[ComparisonRow]) -> Recommendation {
    let recommendation = match profile.mode {
        AnalysisMode::Conservador => recommend_conservative(rows),
        AnalysisMode::Estrategico => recommend_strategic(profile, rows),
    };
    tracing::debug!(
        mode = %recommendation.modo,
        status = %recommendation.status,
        regime = ?recommendation.regime_recomendado,
        "recommendation built"
    );
    recommendation
}

pub fn recommend_conservative(rows: &[ComparisonRow]) -> Recommendation {
    let mut candidates: Vec<(&ComparisonRow, f64)> = Vec::new();
    let mut not_recommended = Vec::new();
    let mut missing = Vec::new();
    let mut excluded = Vec::new();

    for row in rows {
        match row.imposto_total {
            Some(tax)
                if row.eligibility_status == EligibilityStatus::Ok
                    && row.critical_alerts.is_empty() =>
            {
                candidates.push((row, tax));
                continue;
            }
            _ => {}
        }
        let reason = if row.alerts.is_empty() {
            format!("Elegibilidade nao OK ({}).", row.eligibility_status)
        } else {
            missing.extend(row.alerts.iter().cloned());
            row.alerts.join("; ")
        };
        not_recommended.push(format!("{}: {reason}", row.regime_display));
        excluded.push(excluded_entry(row, reason));
    }

    let Some(&(chosen, chosen_tax)) = candidates
        .iter()
        .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal))
    else {
        return Recommendation {
            modo: AnalysisMode::Conservador,
            status: RecommendationStatus::Negada,
            candidate_policy: CandidatePolicy::OkOnly,
            regime_recomendado: None,
            regime_recomendado_display: None,
            justificativa: vec![
                "Nao posso recomendar com seguranca no modo conservador.".to_string(),
                CONSERVATIVE_POLICY_NOTE.to_string(),
                "Faltam dados obrigatorios ou ha bloqueios de elegibilidade.".to_string(),
            ],
            por_que_nao_outros: not_recommended,
            faltantes: dedupe(missing),
            proximos_passos: vec![
                "Completar dados faltantes do regime bloqueado.".to_string(),
                "Reexecutar comparativo apos saneamento de elegibilidade.".to_string(),
            ],
            excluded_regimes: excluded,
            ranking: Vec::new(),
        };
    };

    let mut why_not_others = Vec::new();
    for row in rows.iter().filter(|r| r.regime_code != chosen.regime_code) {
        match row.imposto_total {
            None => why_not_others.push(format!(
                "{}: sem calculo por bloqueio/insuficiencia de dados.",
                row.regime_display
            )),
            Some(tax) if tax >= chosen_tax => why_not_others.push(format!(
                "{}: imposto estimado maior ou igual ao recomendado ({}).",
                row.regime_display,
                format_brl(tax)
            )),
            Some(_) if row.eligibility_status != EligibilityStatus::Ok => {
                why_not_others.push(format!(
                    "{}: imposto menor, mas excluido por politica conservadora (status {}).",
                    row.regime_display, row.eligibility_status
                ))
            }
            Some(_) => why_not_others.push(format!(
                "{}: imposto menor, mas excluido por politica conservadora (alertas criticos: {}).",
                row.regime_display,
                row.critical_alerts.join("; ")
            )),
        }
    }

    Recommendation {
        modo: AnalysisMode::Conservador,
        status: RecommendationStatus::Recomendada,
        candidate_policy: CandidatePolicy::OkOnly,
        regime_recomendado: Some(chosen.regime_code),
        regime_recomendado_display: Some(chosen.regime_display.clone()),
        justificativa: vec![
            CONSERVATIVE_POLICY_NOTE.to_string(),
            "Regime elegivel com menor imposto estimado entre candidatos seguros.".to_string(),
            format!("Regime recomendado: {}.", chosen.regime_display),
        ],
        por_que_nao_outros: why_not_others,
        faltantes: Vec::new(),
        proximos_passos: vec![
            "Validar premissas com documentacao fiscal real antes da decisao final.".to_string(),
        ],
        excluded_regimes: excluded,
        ranking: Vec::new(),
    }
}

pub fn recommend_strategic(profile: &CompanyProfile, rows: &[ComparisonRow]) -> Recommendation {
    let mut candidates: Vec<(&ComparisonRow, f64)> = Vec::new();
    let mut excluded = Vec::new();
    let mut next_steps = Vec::new();
    let mut missing: Vec<String> = profile.missing_inputs.clone();

    for row in rows {
        match row.imposto_total {
            Some(tax) if row.eligibility_status != EligibilityStatus::Blocked => {
                candidates.push((row, tax));
            }
            _ => {
                let reason = if row.alerts.is_empty() {
                    format!("Elegibilidade {}.", row.eligibility_status)
                } else {
                    row.alerts.join("; ")
                };
                excluded.push(excluded_entry(row, reason));
                missing.extend(row.alerts.iter().cloned());
                next_steps.extend(next_steps_from_alerts(&row.alerts, row.regime_code));
            }
        }
    }

    let base = |status, ranking, justificativa, next_steps, missing, excluded| Recommendation {
        modo: AnalysisMode::Estrategico,
        status,
        candidate_policy: CandidatePolicy::OkAndWarning,
        regime_recomendado: None,
        regime_recomendado_display: None,
        justificativa,
        por_que_nao_outros: Vec::new(),
        faltantes: dedupe(missing),
        proximos_passos: dedupe(next_steps),
        excluded_regimes: excluded,
        ranking,
    };

    if candidates.is_empty() {
        next_steps.push("Revisar elegibilidade e completar campos obrigatorios.".to_string());
        return base(
            RecommendationStatus::Inconclusiva,
            Vec::new(),
            vec![
                "Nao ha regimes com dados suficientes para ranking estrategico.".to_string(),
                "Todos os regimes estao BLOCKED ou sem calculo valido.".to_string(),
            ],
            next_steps,
            missing,
            excluded,
        );
    }

    let min_tax = candidates
        .iter()
        .map(|&(_, tax)| tax)
        .fold(f64::INFINITY, f64::min);

    let mut ranking: Vec<RankingEntry> = candidates
        .iter()
        .map(|&(row, tax)| {
            let mut score = 100.0;
            let mut tradeoffs = Vec::new();

            score -= (tax - min_tax) / min_tax.max(1.0) * 60.0;
            if row.eligibility_status == EligibilityStatus::Warning {
                score -= 20.0;
                tradeoffs.push("Elegibilidade WARNING: requer validacao adicional.".to_string());
            }
            if !row.alerts.is_empty() {
                score -= (row.alerts.len() as f64 * 5.0).min(20.0);
                tradeoffs.push(format!("Alertas ativos: {}", row.alerts.join("; ")));
                missing.extend(row.alerts.iter().cloned());
                next_steps.extend(next_steps_from_alerts(&row.alerts, row.regime_code));
            }

            let criterion = row
                .detalhes_regime
                .as_ref()
                .and_then(|d| d.as_real())
                .map(|real| real.criterio_credito_pis_cofins);
            match criterion {
                Some(c) if c.is_estimate() => {
                    score -= 8.0;
                    tradeoffs
                        .push("Credito de PIS/COFINS estimado adiciona risco de variacao.".to_string());
                    next_steps.push("Conferir memoria de calculo de creditos no Lucro Real.".to_string());
                }
                Some(CreditCriterion::DespesasCreditaveis) => {
                    next_steps.push("Conferir memoria de calculo de creditos no Lucro Real.".to_string());
                }
                Some(CreditCriterion::NaoInformadoAssumidoZero) => {
                    tradeoffs.push("Credito de PIS/COFINS assumido como zero.".to_string());
                    next_steps.push(
                        "Informar despesas_creditaveis para calibrar creditos no Lucro Real."
                            .to_string(),
                    );
                }
                _ => {}
            }

            RankingEntry {
                regime_code: row.regime_code,
                regime_display: row.regime_display.clone(),
                status_elegibilidade: row.eligibility_status,
                imposto_total: tax,
                carga_efetiva: row.carga_efetiva_percentual,
                score: (score * 100.0).round() / 100.0,
                tradeoffs,
            }
        })
        .collect();

    ranking.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| a.imposto_total.total_cmp(&b.imposto_total))
    });

    let all_warning = ranking
        .iter()
        .all(|e| e.status_elegibilidade == EligibilityStatus::Warning);
    if all_warning && !profile.missing_inputs.is_empty() {
        next_steps.push("Completar campos criticos antes de decidir.".to_string());
        return base(
            RecommendationStatus::Inconclusiva,
            ranking,
            vec![
                "Ranking estrategico calculado, mas faltam campos criticos para recomendacao \
                 condicional segura."
                    .to_string(),
            ],
            next_steps,
            missing,
            excluded,
        );
    }

    let top_code = ranking[0].regime_code;
    let top_display = ranking[0].regime_display.clone();
    next_steps.push("Validar o Top 1 com evidencias fiscais antes da decisao final.".to_string());
    let mut recommendation = base(
        RecommendationStatus::Condicional,
        ranking,
        vec![
            "Recomendacao condicional baseada em ranking economico com penalidades de \
             risco/compliance."
                .to_string(),
            format!("Top 1 estrategico: {top_display}."),
        ],
        next_steps,
        missing,
        excluded,
    );
    recommendation.regime_recomendado = Some(top_code);
    recommendation.regime_recomendado_display = Some(top_display);
    recommendation
}

fn excluded_entry(row: &ComparisonRow, reason: String) -> ExcludedRegime {
    ExcludedRegime {
        regime: row.regime_display.clone(),
        status: row.eligibility_status,
        reason,
    }
}

/// Actionable follow-ups inferred from alert text.
fn next_steps_from_alerts(alerts: &[String], regime: RegimeCode) -> Vec<String> {
    let text = fold_text(&alerts.join(" | "));
    let mut steps = Vec::new();
    if text.contains("tipo de atividade") {
        steps.push("Informar tipo_atividade para reduzir incerteza no Presumido.".to_string());
    }
    if text.contains("anexo do simples") {
        steps.push("Informar anexo_simples para validar elegibilidade/cenario do Simples.".to_string());
    }
    if text.contains("fator_r") || text.contains("folha_12m") {
        steps.push("Informar fator_r ou folha_12m para Simples III/V.".to_string());
    }
    if regime == RegimeCode::Real && text.contains("credito") {
        steps.push(
            "Informar despesas_creditaveis ou percentual_credito_estimado no Lucro Real."
                .to_string(),
        );
    }
    steps
}

/// Drop blanks and repeats, keeping first occurrences in order.
pub(crate) fn dedupe(items: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    items
        .into_iter()
        .filter(|item| !item.trim().is_empty() && seen.insert(item.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::DiagnosticInput;
    use proptest::prelude::*;

    /// `missing` selects Presumido without an activity type, which leaves
    /// one unresolved input on the profile.
    fn profile(mode: &str, missing: bool) -> CompanyProfile {
        let raw = DiagnosticInput {
            nome_empresa: "ACME".into(),
            receita_anual: 1_000_000.0,
            regime: if missing { "PRESUMIDO" } else { "REAL" }.into(),
            anexo_simples: Some("I".into()),
            tipo_atividade: (!missing).then(|| "Comercio".to_string()),
            margem_lucro: Some(0.10),
            modo_analise: Some(mode.into()),
            ..Default::default()
        };
        CompanyProfile::normalize(&raw, "BR_TAX_2026_V1").unwrap()
    }

    fn row(regime: RegimeCode, status: EligibilityStatus, tax: Option<f64>) -> ComparisonRow {
        ComparisonRow {
            regime_code: regime,
            regime_display: regime.display_name().to_string(),
            eligibility_status: status,
            imposto_total: tax,
            carga_efetiva_percentual: tax.map(|t| t / 1_000_000.0 * 100.0),
            alerts: Vec::new(),
            critical_alerts: Vec::new(),
            detalhes_regime: None,
        }
    }

    fn with_alerts(mut row: ComparisonRow, alerts: &[&str]) -> ComparisonRow {
        row.alerts = alerts.iter().map(|a| a.to_string()).collect();
        if row.eligibility_status != EligibilityStatus::Ok {
            row.critical_alerts = row.alerts.clone();
        }
        row
    }

    #[test]
    fn conservative_picks_cheapest_ok_row() {
        let rows = vec![
            row(RegimeCode::Simples, EligibilityStatus::Ok, Some(90_000.0)),
            row(RegimeCode::Presumido, EligibilityStatus::Ok, Some(80_000.0)),
            row(RegimeCode::Real, EligibilityStatus::Ok, Some(116_500.0)),
        ];
        let rec = recommend_conservative(&rows);
        assert_eq!(rec.status, RecommendationStatus::Recomendada);
        assert_eq!(rec.regime_recomendado, Some(RegimeCode::Presumido));
        assert_eq!(rec.justificativa[2], "Regime recomendado: Lucro Presumido.");
        assert_eq!(
            rec.por_que_nao_outros,
            vec![
                "Simples Nacional: imposto estimado maior ou igual ao recomendado (R$ 90.000,00)."
                    .to_string(),
                "Lucro Real: imposto estimado maior ou igual ao recomendado (R$ 116.500,00)."
                    .to_string(),
            ]
        );
        assert!(rec.excluded_regimes.is_empty());
    }

    #[test]
    fn conservative_explains_cheaper_excluded_row() {
        let rows = vec![
            with_alerts(
                row(RegimeCode::Simples, EligibilityStatus::Blocked, None),
                &["Anexo do Simples"],
            ),
            with_alerts(
                row(RegimeCode::Presumido, EligibilityStatus::Warning, Some(50_000.0)),
                &["Tipo de atividade"],
            ),
            row(RegimeCode::Real, EligibilityStatus::Ok, Some(116_500.0)),
        ];
        let rec = recommend_conservative(&rows);
        assert_eq!(rec.regime_recomendado, Some(RegimeCode::Real));
        assert_eq!(
            rec.por_que_nao_outros,
            vec![
                "Simples Nacional: sem calculo por bloqueio/insuficiencia de dados.".to_string(),
                "Lucro Presumido: imposto menor, mas excluido por politica conservadora \
                 (status WARNING)."
                    .to_string(),
            ]
        );
        assert_eq!(rec.excluded_regimes.len(), 2);
        assert_eq!(rec.excluded_regimes[0].reason, "Anexo do Simples");
    }

    #[test]
    fn conservative_explains_cheaper_ok_row_with_critical_alerts() {
        let mut flagged = row(RegimeCode::Presumido, EligibilityStatus::Ok, Some(50_000.0));
        flagged.critical_alerts = vec!["Base de presuncao revisada".to_string()];
        let rows = vec![
            flagged,
            row(RegimeCode::Real, EligibilityStatus::Ok, Some(116_500.0)),
        ];
        let rec = recommend_conservative(&rows);
        assert_eq!(rec.regime_recomendado, Some(RegimeCode::Real));
        assert_eq!(
            rec.por_que_nao_outros,
            vec![
                "Lucro Presumido: imposto menor, mas excluido por politica conservadora \
                 (alertas criticos: Base de presuncao revisada)."
                    .to_string(),
            ]
        );
    }

    #[test]
    fn conservative_denies_without_ok_rows() {
        let rows = vec![
            with_alerts(
                row(RegimeCode::Simples, EligibilityStatus::Blocked, None),
                &["Anexo do Simples"],
            ),
            with_alerts(
                row(RegimeCode::Presumido, EligibilityStatus::Warning, Some(50_000.0)),
                &["Tipo de atividade", "Anexo do Simples"],
            ),
            row(RegimeCode::Real, EligibilityStatus::Warning, Some(116_500.0)),
        ];
        let rec = recommend_conservative(&rows);
        assert_eq!(rec.status, RecommendationStatus::Negada);
        assert_eq!(rec.regime_recomendado, None);
        assert_eq!(rec.justificativa[1], CONSERVATIVE_POLICY_NOTE);
        assert_eq!(
            rec.faltantes,
            vec!["Anexo do Simples".to_string(), "Tipo de atividade".to_string()]
        );
        assert_eq!(rec.por_que_nao_outros[2], "Lucro Real: Elegibilidade nao OK (WARNING).");
    }

    #[test]
    fn strategic_scores_and_ranks() {
        let rows = vec![
            row(RegimeCode::Simples, EligibilityStatus::Ok, Some(100_000.0)),
            with_alerts(
                row(RegimeCode::Presumido, EligibilityStatus::Warning, Some(90_000.0)),
                &["Tipo de atividade"],
            ),
            row(RegimeCode::Real, EligibilityStatus::Blocked, None),
        ];
        let rec = recommend_strategic(&profile("estrategico", false), &rows);
        assert_eq!(rec.status, RecommendationStatus::Condicional);
        // Simples: 100 - 60 * 10_000 / 90_000 = 93.33
        // Presumido: 100 - 20 - 5 = 75
        assert_eq!(rec.ranking.len(), 2);
        assert_eq!(rec.ranking[0].regime_code, RegimeCode::Simples);
        assert_eq!(rec.ranking[0].score, 93.33);
        assert_eq!(rec.ranking[1].score, 75.0);
        assert_eq!(rec.regime_recomendado, Some(RegimeCode::Simples));
        assert_eq!(rec.excluded_regimes.len(), 1);
        assert!(rec
            .proximos_passos
            .contains(&"Informar tipo_atividade para reduzir incerteza no Presumido.".to_string()));
        assert_eq!(
            rec.proximos_passos.last().map(String::as_str),
            Some("Validar o Top 1 com evidencias fiscais antes da decisao final.")
        );
    }

    fn real_score(credit: impl FnOnce(&mut DiagnosticInput)) -> f64 {
        let mut raw = DiagnosticInput {
            nome_empresa: "ACME".into(),
            receita_anual: 1_000_000.0,
            regime: "REAL".into(),
            margem_lucro: Some(0.10),
            modo_analise: Some("estrategico".into()),
            ..Default::default()
        };
        credit(&mut raw);
        let profile = CompanyProfile::normalize(&raw, "BR_TAX_2026_V1").unwrap();
        let bundle = crate::testing::bundle();
        let eligibility = crate::eligibility::evaluate_eligibility(&profile, &bundle.eligibility);
        let rows = crate::comparator::compare_regimes(&profile, &eligibility, &bundle).unwrap();
        recommend_strategic(&profile, &rows)
            .ranking
            .iter()
            .find(|e| e.regime_code == RegimeCode::Real)
            .map(|e| e.score)
            .unwrap()
    }

    #[test]
    fn strategic_penalizes_estimated_credit() {
        // Both inputs yield the same credit base of 200k on 1M revenue.
        let estimated = real_score(|raw| raw.percentual_credito_estimado = Some(0.2));
        let documented = real_score(|raw| raw.despesas_creditaveis = Some(200_000.0));
        assert!((documented - estimated - 8.0).abs() < 1e-6);
    }

    #[test]
    fn strategic_ties_break_on_tax() {
        let rows = vec![
            row(RegimeCode::Simples, EligibilityStatus::Ok, Some(100_000.0)),
            row(RegimeCode::Presumido, EligibilityStatus::Ok, Some(100_000.0)),
        ];
        let rec = recommend_strategic(&profile("estrategico", false), &rows);
        assert_eq!(rec.ranking[0].score, rec.ranking[1].score);
        assert_eq!(rec.regime_recomendado, Some(RegimeCode::Simples));
    }

    #[test]
    fn strategic_inconclusive_when_all_blocked() {
        let rows = vec![
            with_alerts(
                row(RegimeCode::Simples, EligibilityStatus::Blocked, None),
                &["Anexo do Simples"],
            ),
            row(RegimeCode::Presumido, EligibilityStatus::Blocked, None),
        ];
        let rec = recommend_strategic(&profile("estrategico", false), &rows);
        assert_eq!(rec.status, RecommendationStatus::Inconclusiva);
        assert!(rec.ranking.is_empty());
        assert_eq!(rec.excluded_regimes[1].reason, "Elegibilidade BLOCKED.");
        assert_eq!(
            rec.proximos_passos,
            vec![
                "Informar anexo_simples para validar elegibilidade/cenario do Simples.".to_string(),
                "Revisar elegibilidade e completar campos obrigatorios.".to_string(),
            ]
        );
    }

    #[test]
    fn strategic_inconclusive_when_only_warnings_and_inputs_missing() {
        let rows = vec![
            row(RegimeCode::Presumido, EligibilityStatus::Warning, Some(90_000.0)),
            row(RegimeCode::Real, EligibilityStatus::Warning, Some(116_500.0)),
        ];
        let rec = recommend_strategic(&profile("estrategico", true), &rows);
        assert_eq!(rec.status, RecommendationStatus::Inconclusiva);
        assert_eq!(rec.ranking.len(), 2);
        assert_eq!(rec.regime_recomendado, None);

        let rec = recommend_strategic(&profile("estrategico", false), &rows);
        assert_eq!(rec.status, RecommendationStatus::Condicional);
    }

    #[test]
    fn dispatch_follows_profile_mode() {
        let rows = vec![row(RegimeCode::Real, EligibilityStatus::Ok, Some(1.0))];
        assert_eq!(recommend(&profile("conservador", false), &rows).modo, AnalysisMode::Conservador);
        assert_eq!(recommend(&profile("estrategico", false), &rows).modo, AnalysisMode::Estrategico);
    }

    #[test]
    fn alert_text_is_accent_insensitive() {
        let steps = next_steps_from_alerts(
            &["Crédito de PIS/COFINS informado excede o débito".to_string()],
            RegimeCode::Real,
        );
        assert_eq!(steps.len(), 1);
        assert!(next_steps_from_alerts(&["crédito".to_string()], RegimeCode::Presumido).is_empty());
    }

    #[test]
    fn dedupe_keeps_first_occurrence() {
        let out = dedupe(vec!["b".into(), "a".into(), "b".into(), " ".into(), "a".into()]);
        assert_eq!(out, vec!["b".to_string(), "a".to_string()]);
    }

    fn arb_status() -> impl Strategy<Value = EligibilityStatus> {
        prop_oneof![
            Just(EligibilityStatus::Ok),
            Just(EligibilityStatus::Warning),
            Just(EligibilityStatus::Blocked),
        ]
    }

    fn arb_rows() -> impl Strategy<Value = Vec<ComparisonRow>> {
        proptest::collection::vec(
            (arb_status(), proptest::option::of(1.0f64..1_000_000.0), 0usize..3),
            3,
        )
        .prop_map(|specs| {
            RegimeCode::all()
                .iter()
                .zip(specs)
                .map(|(&regime, (status, tax, alerts))| {
                    let tax = if status == EligibilityStatus::Blocked { None } else { tax };
                    let mut r = row(regime, status, tax);
                    r.alerts = (0..alerts).map(|i| format!("alerta {i}")).collect();
                    if status != EligibilityStatus::Ok {
                        r.critical_alerts = r.alerts.clone();
                    }
                    r
                })
                .collect()
        })
    }

    proptest! {
        #[test]
        fn conservative_never_picks_non_ok(rows in arb_rows()) {
            let rec = recommend_conservative(&rows);
            if let Some(code) = rec.regime_recomendado {
                let chosen = rows.iter().find(|r| r.regime_code == code).unwrap();
                prop_assert_eq!(chosen.eligibility_status, EligibilityStatus::Ok);
                prop_assert_eq!(rec.status, RecommendationStatus::Recomendada);
            } else {
                prop_assert_eq!(rec.status, RecommendationStatus::Negada);
            }
        }

        #[test]
        fn strategic_ranking_excludes_blocked(rows in arb_rows()) {
            let rec = recommend_strategic(&profile("estrategico", false), &rows);
            prop_assert!(rec
                .ranking
                .iter()
                .all(|e| e.status_elegibilidade != EligibilityStatus::Blocked));
            for pair in rec.ranking.windows(2) {
                prop_assert!(pair[0].score >= pair[1].score);
            }
        }
    }
}
