//! # Narrative Report
//!
//! Plain-text executive report rendered from a [`DiagnosticOutput`]. The
//! renderer only reads the record, so a stored record re-renders to the same
//! text.
//!
//! Layout, top to bottom: optional integrity banner, header, regime
//! parameters (plus the DAS split for Simples), post-reform scenarios,
//! eligibility, comparison, recommendation, audit trail, footer.

use std::fmt::Write as _;

use tde_core::{format_brl, format_decimal_br, format_percent_br, AnalysisMode};
use tde_regimes::{CreditCriterion, PisCofinsBase, PresumidoDetail, RealDetail, RegimeDetail, SimplesDetail};
use tde_ruleset::Tributo;

use crate::output::DiagnosticOutput;
use crate::recommendation::{Recommendation, RecommendationStatus};

pub const INTEGRITY_BANNER: &str =
    "ALERTA DE INTEGRIDADE: ruleset/baseline com divergencia (compliance FAIL).";

const RULE: &str = "==============================================";

pub fn render_narrative(output: &DiagnosticOutput) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_narrative(&mut out, output);
    out
}

fn write_narrative(out: &mut String, o: &DiagnosticOutput) -> std::fmt::Result {
    if o.integrity_failed() {
        writeln!(out, "{INTEGRITY_BANNER}")?;
        writeln!(out)?;
    }
    writeln!(out, "{RULE}")?;
    writeln!(out, "         RELATÓRIO - TAX DIAGNOSTIC ENGINE    ")?;
    writeln!(out, "{RULE}")?;
    writeln!(out, "Empresa: {}", o.nome_empresa)?;
    writeln!(out)?;
    writeln!(out, "Regime atual: {}", o.regime.display_name())?;
    writeln!(out, "Periodicidade considerada: {}", o.periodicidade)?;
    writeln!(
        out,
        "Competência: {}",
        o.competencia.as_deref().unwrap_or("Nao informada")
    )?;
    write_parameters(out, &o.detalhes_regime)?;
    if let RegimeDetail::Simples(detail) = &o.detalhes_regime {
        write_das_split(out, detail)?;
    }
    writeln!(out, "Receita anual informada: {}", format_brl(o.receita_anual))?;
    writeln!(out, "Imposto atual estimado: {}", format_brl(o.imposto_atual))?;
    writeln!(out)?;

    writeln!(out, "=== RESULTADOS POR CENÁRIO (PÓS-REFORMA) ===")?;
    for r in &o.resultados {
        writeln!(out)?;
        writeln!(out, "--- {} ---", r.nome_cenario)?;
        writeln!(out, "Alíquota: {}", format_percent_br(r.aliquota_reforma))?;
        writeln!(out, "Imposto pós-reforma: {}", format_brl(r.imposto_reforma))?;
        writeln!(out, "Diferença de impacto: {}", format_brl(r.diferenca))?;
        writeln!(out, "Impacto percentual: {} %", format_decimal_br(r.impacto_percentual))?;
        writeln!(out, "Classificação: {}", r.classificacao)?;
        writeln!(out, "Recomendação: {}", r.recomendacao)?;
    }
    writeln!(out)?;
    writeln!(out, "Observação: Simulação simplificada para diagnóstico inicial.")?;
    writeln!(out, "{RULE}")?;

    writeln!(out)?;
    write_eligibility(out, o)?;
    writeln!(out)?;
    write_comparison(out, o)?;
    writeln!(out)?;
    match o.recommendation.modo {
        AnalysisMode::Conservador => write_conservative(out, &o.recommendation)?,
        AnalysisMode::Estrategico => write_strategic(out, &o.recommendation)?,
    }
    writeln!(out)?;
    write_audit(out, o)?;
    write!(out, "Relatório gerado em: {}", o.audit.generated_at.to_br())
}

fn percent4(fraction: f64) -> String {
    format!("{:.4}%", fraction * 100.0).replace('.', ",")
}

fn write_parameters(out: &mut String, detail: &RegimeDetail) -> std::fmt::Result {
    writeln!(out, "=== PARÂMETROS DO CÁLCULO ===")?;
    match detail {
        RegimeDetail::Simples(d) => simples_parameters(out, d),
        RegimeDetail::Presumido(d) => presumido_parameters(out, d),
        RegimeDetail::Real(d) => real_parameters(out, d),
    }
}

fn simples_parameters(out: &mut String, d: &SimplesDetail) -> std::fmt::Result {
    writeln!(out, "Anexo informado: {}", d.anexo_informado)?;
    writeln!(out, "Anexo aplicado: {}", d.anexo_aplicado.as_str())?;
    writeln!(out, "Faixa: {}", d.faixa)?;
    writeln!(out, "Alíquota nominal: {}", percent4(d.aliquota_nominal))?;
    writeln!(out, "Parcela a deduzir: {}", format_brl(d.parcela_deduzir))?;
    writeln!(out, "Alíquota efetiva: {}", percent4(d.aliquota_efetiva))?;
    writeln!(out, "RBT12: {}", format_brl(d.rbt12))?;
    if let Some(fr) = d.fator_r {
        writeln!(out, "Fator R: {}", format_percent_br(fr))?;
    }
    writeln!(
        out,
        "Limite de elegibilidade: {}",
        format_brl(d.limite_elegibilidade_simples)
    )
}

fn presumido_parameters(out: &mut String, d: &PresumidoDetail) -> std::fmt::Result {
    writeln!(
        out,
        "Tipo de atividade considerado: {}",
        d.atividade_aplicada.label()
    )?;
    writeln!(out, "Percentual de presunção: {}", format_percent_br(d.percentual_presuncao))?;
    writeln!(out, "Base presumida: {}", format_brl(d.base_presumida))?;
    writeln!(out, "IRPJ: {}", format_percent_br(d.aliquota_irpj))?;
    writeln!(out, "CSLL: {}", format_percent_br(d.aliquota_csll))?;
    writeln!(out, "PIS: {}", format_percent_br(d.aliquota_pis))?;
    writeln!(out, "COFINS: {}", format_percent_br(d.aliquota_cofins))?;
    writeln!(
        out,
        "Limite adicional IRPJ: {}",
        format_brl(d.limite_adicional_irpj_utilizado)
    )?;
    writeln!(out, "Periodicidade aplicada: {}", d.periodicidade)
}

fn real_parameters(out: &mut String, d: &RealDetail) -> std::fmt::Result {
    writeln!(out, "Margem de lucro estimada: {}", format_percent_br(d.margem_lucro_estimada))?;
    writeln!(out, "IRPJ: {}", format_percent_br(d.aliquota_irpj))?;
    writeln!(out, "CSLL: {}", format_percent_br(d.aliquota_csll))?;
    let base_label = match d.base_pis_cofins_usada {
        PisCofinsBase::ReceitaBasePeriodo => "Receita base do período",
        PisCofinsBase::ReceitaAnual => "Receita anual",
    };
    writeln!(
        out,
        "Base PIS/COFINS usada: {base_label} ({})",
        format_brl(d.valor_base_pis_cofins)
    )?;
    writeln!(out, "Alíquota PIS: {}", format_percent_br(d.aliquota_pis_nao_cumulativo))?;
    writeln!(out, "Alíquota COFINS: {}", format_percent_br(d.aliquota_cofins_nao_cumulativo))?;
    writeln!(
        out,
        "Débito PIS/COFINS: {}",
        format_brl(d.debito_pis_cofins_nao_cumulativo)
    )?;
    if d.credito_limitado_ao_debito {
        writeln!(
            out,
            "Crédito PIS/COFINS original: {}",
            format_brl(d.credito_pis_cofins_original)
        )?;
        writeln!(
            out,
            "Crédito PIS/COFINS utilizado: {}",
            format_brl(d.credito_pis_cofins_utilizado)
        )?;
    } else {
        writeln!(out, "Crédito aplicado: {}", format_brl(d.credito_pis_cofins_utilizado))?;
    }
    let criterion = match d.criterio_credito_pis_cofins {
        CreditCriterion::DespesasCreditaveis => "despesas_creditaveis",
        CreditCriterion::PercentualCreditoEstimado => "percentual_credito_estimado",
        CreditCriterion::NaoInformadoAssumidoZero => "nao_informado_assumido_zero",
    };
    writeln!(out, "Critério de crédito: {criterion}")
}

fn write_das_split(out: &mut String, d: &SimplesDetail) -> std::fmt::Result {
    writeln!(out, "=== SIMPLES NACIONAL: PARTILHA DO DAS (ESTIMATIVA) ===")?;
    writeln!(out, "Tributo | Percentual | Valor (R$)")?;
    writeln!(out, "-----------------------------------")?;
    for tributo in Tributo::all() {
        let share = d.breakdown_percentuais.get(tributo).copied().unwrap_or(0.0);
        let value = d.breakdown_das.get(tributo).copied().unwrap_or(0.0);
        writeln!(out, "{tributo} | {} | {}", percent4(share), format_brl(value))?;
    }
    Ok(())
}

fn write_eligibility(out: &mut String, o: &DiagnosticOutput) -> std::fmt::Result {
    writeln!(out, "=== ELEGIBILIDADE ===")?;
    if o.eligibility.is_empty() {
        return writeln!(out, "Sem dados de elegibilidade.");
    }
    for result in &o.eligibility {
        writeln!(out, "- {}: {}", result.regime_code, result.status)?;
        for reason in &result.reasons {
            writeln!(out, "  motivo: {reason}")?;
        }
        for item in &result.missing_inputs {
            writeln!(out, "  faltante: {item}")?;
        }
    }
    Ok(())
}

fn write_comparison(out: &mut String, o: &DiagnosticOutput) -> std::fmt::Result {
    writeln!(out, "=== COMPARATIVO ENTRE REGIMES ===")?;
    if o.comparison.is_empty() {
        return writeln!(out, "Sem dados para comparativo.");
    }
    writeln!(out, "Regime | Elegibilidade | Imposto | Carga Efetiva")?;
    writeln!(out, "------------------------------------------------")?;
    for row in &o.comparison {
        let tax = row.imposto_total.map(format_brl).unwrap_or_else(|| "N/D".into());
        let burden = row
            .carga_efetiva_percentual
            .map(|c| format!("{}%", format_decimal_br(c)))
            .unwrap_or_else(|| "N/D".into());
        writeln!(
            out,
            "{} | {} | {tax} | {burden}",
            row.regime_display, row.eligibility_status
        )?;
        if !row.alerts.is_empty() {
            writeln!(out, "  observacoes:")?;
            for alert in &row.alerts {
                writeln!(out, "  - {alert}")?;
            }
        }
    }
    Ok(())
}

fn bullets(out: &mut String, title: &str, items: &[String]) -> std::fmt::Result {
    if items.is_empty() {
        return Ok(());
    }
    writeln!(out, "{title}:")?;
    for item in items {
        writeln!(out, "- {item}")?;
    }
    Ok(())
}

fn write_excluded(out: &mut String, title: &str, rec: &Recommendation) -> std::fmt::Result {
    if rec.excluded_regimes.is_empty() {
        return Ok(());
    }
    writeln!(out, "{title}:")?;
    for item in &rec.excluded_regimes {
        writeln!(out, "- {} ({}): {}", item.regime, item.status, item.reason)?;
    }
    Ok(())
}

fn write_conservative(out: &mut String, rec: &Recommendation) -> std::fmt::Result {
    writeln!(out, "=== RECOMENDAÇÃO (MODO CONSERVADOR) ===")?;
    writeln!(out, "Politica de candidatos: {}", rec.candidate_policy.as_str())?;
    writeln!(
        out,
        "No modo conservador, apenas regimes com elegibilidade OK entram como candidatos. \
         Regimes com WARNING/BLOCKED sao excluidos."
    )?;
    writeln!(out, "Status: {}", rec.status)?;
    if let Some(display) = &rec.regime_recomendado_display {
        writeln!(out, "Regime recomendado: {display}")?;
    }
    write_excluded(out, "Regimes excluidos", rec)?;
    bullets(out, "Justificativa", &rec.justificativa)?;
    bullets(out, "Por que nao os outros", &rec.por_que_nao_outros)?;
    bullets(out, "Faltantes", &rec.faltantes)?;
    bullets(out, "Proximos passos", &rec.proximos_passos)
}

fn write_strategic(out: &mut String, rec: &Recommendation) -> std::fmt::Result {
    writeln!(out, "=== RECOMENDAÇÃO (MODO ESTRATÉGICO) ===")?;
    writeln!(out, "Status: {}", rec.status)?;
    if rec.ranking.is_empty() {
        writeln!(out, "Sem ranking disponivel para o modo estrategico.")?;
    } else {
        writeln!(out, "Top 3 do ranking:")?;
        let top3 = &rec.ranking[..rec.ranking.len().min(3)];
        for (idx, entry) in top3.iter().enumerate() {
            let burden = entry
                .carga_efetiva
                .map(|c| format!("{}%", format_decimal_br(c)))
                .unwrap_or_else(|| "N/D".into());
            writeln!(
                out,
                "{}. {} | Elegibilidade: {} | Imposto: {} | Carga: {burden} | Score: {}",
                idx + 1,
                entry.regime_display,
                entry.status_elegibilidade,
                format_brl(entry.imposto_total),
                format_decimal_br(entry.score)
            )?;
            for tradeoff in &entry.tradeoffs {
                writeln!(out, "   - {tradeoff}")?;
            }
        }
        if rec.status != RecommendationStatus::Inconclusiva {
            writeln!(
                out,
                "Por que o #1: {} combina menor impacto economico ajustado pelas penalidades de \
                 risco/elegibilidade.",
                top3[0].regime_display
            )?;
            if top3.len() > 1 {
                let others: Vec<&str> = top3[1..].iter().map(|e| e.regime_display.as_str()).collect();
                writeln!(
                    out,
                    "Por que nao os outros: scores inferiores para {}.",
                    others.join(", ")
                )?;
            }
        }
    }
    write_excluded(out, "Regimes nao elegiveis (fora do ranking)", rec)?;
    bullets(out, "Proximos passos para aumentar confiabilidade", &rec.proximos_passos)?;
    bullets(out, "Faltantes relevantes", &rec.faltantes)
}

fn write_audit(out: &mut String, o: &DiagnosticOutput) -> std::fmt::Result {
    let a = &o.audit;
    let meta = &a.ruleset_metadata;
    let na = |v: &Option<String>| v.clone().unwrap_or_else(|| "N/D".into());
    writeln!(out, "=== AUDITORIA (BASE NORMATIVA & PREMISSAS) ===")?;
    writeln!(out, "Ruleset: {}", a.ruleset_id)?;
    writeln!(
        out,
        "Vigencia: {} ate {}",
        na(&meta.vigencia_inicio),
        na(&meta.vigencia_fim)
    )?;
    writeln!(out, "Descricao do ruleset: {}", na(&meta.descricao))?;
    writeln!(out, "As of date: {}", a.as_of_date)?;
    writeln!(out, "Tipo de calculo: {}", a.calculo_tipo.as_str())?;
    writeln!(out, "Gerado em (ISO): {}", a.generated_at)?;
    writeln!(out, "Integridade ruleset/baseline: {}", a.integrity.status)?;
    writeln!(out, "Hash ruleset: {}", a.integrity.ruleset_hash)?;
    writeln!(out, "Hash baseline: {}", a.integrity.baseline_hash)?;
    let files = if a.integrity.checked_files.is_empty() {
        "N/D".to_string()
    } else {
        a.integrity.checked_files.join(", ")
    };
    writeln!(out, "Arquivos verificados: {files}")?;
    writeln!(out, "Fontes:")?;
    for s in &a.sources {
        writeln!(out, "- {s}")?;
    }
    bullets(out, "Referencias oficiais", &a.references)?;
    writeln!(out, "Premissas:")?;
    for s in &a.assumptions {
        writeln!(out, "- {s}")?;
    }
    writeln!(out, "Limitacoes:")?;
    for s in &a.limitations {
        writeln!(out, "- {s}")?;
    }
    bullets(out, "Alertas", &a.alerts)
}
