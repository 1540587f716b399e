//! # Ruleset Metadata
//!
//! `metadata.json` describes a ruleset rather than parameterizing a
//! calculator: validity window, official references, pinned sentinel
//! vectors for the integrity audit, and the default post-reform scenario
//! rates. It is not covered by baseline parity.
//!
//! Sections are parsed on demand. A ruleset with an empty
//! `fontes_oficiais` can still compute taxes; it only fails when an audit
//! record is assembled.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tde_core::RulesetIntegrityError;

use crate::file::RuleFile;
use crate::simples::TaxShares;
use crate::table::RuleTable;

const REGIME_ALL: &str = "Todos";

/// Descriptive subset echoed into every audit record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataSubset {
    pub ruleset_id: String,
    pub vigencia_inicio: Option<String>,
    pub vigencia_fim: Option<String>,
    pub descricao: Option<String>,
}

/// A pinned bracket constant from `audit_sentinels.simples`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimplesSentinel {
    pub anexo: String,
    /// 1-based bracket number.
    pub faixa: usize,
    pub aliquota_nominal: Option<f64>,
    pub parcela_deduzir: Option<f64>,
    pub percentuais_partilha: Option<TaxShares>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RulesetMetadata {
    table: RuleTable,
}

impl RulesetMetadata {
    pub fn new(table: RuleTable) -> Self {
        Self { table }
    }

    /// Id declared inside the file, falling back to the directory id.
    pub fn ruleset_id(&self) -> &str {
        self.table
            .get("ruleset_id")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| self.table.ruleset_id())
    }

    pub fn subset(&self) -> MetadataSubset {
        let text = |key: &str| {
            self.table
                .get(key)
                .and_then(Value::as_str)
                .map(str::to_string)
        };
        MetadataSubset {
            ruleset_id: self.ruleset_id().to_string(),
            vigencia_inicio: text("vigencia_inicio"),
            vigencia_fim: text("vigencia_fim"),
            descricao: text("descricao"),
        }
    }

    /// Official references rendered as `id - reference - url`.
    ///
    /// An absent or empty list is fatal: an audit record must cite sources.
    pub fn references(&self) -> Result<Vec<String>, RulesetIntegrityError> {
        let ctx = self
            .table
            .context(REGIME_ALL, "Sem referencias oficiais para auditoria");
        let sources = ctx.list(self.table.payload(), "", "fontes_oficiais")?;
        let refs: Vec<String> = sources
            .iter()
            .filter_map(Value::as_object)
            .map(render_reference)
            .collect();
        if refs.is_empty() {
            return Err(ctx.error("fontes_oficiais", "lista vazia"));
        }
        Ok(refs)
    }

    /// Default post-reform scenario rates keyed by scenario name.
    pub fn reform_scenarios(&self) -> Result<BTreeMap<String, f64>, RulesetIntegrityError> {
        let ctx = self
            .table
            .context(REGIME_ALL, "Sem cenarios padrao de simulacao");
        let raw = match self.table.get("cenarios_reforma") {
            Some(Value::Object(map)) if !map.is_empty() => map,
            _ => return Err(ctx.error("cenarios_reforma", "objeto ausente/invalido")),
        };
        let mut scenarios = BTreeMap::new();
        for (name, rate) in raw {
            if name.trim().is_empty() {
                return Err(ctx.error("cenarios_reforma", "nome de cenario invalido"));
            }
            let rate = rate.as_f64().ok_or_else(|| {
                ctx.error(format!("cenarios_reforma.{name}"), "aliquota nao numerica")
            })?;
            scenarios.insert(name.clone(), rate);
        }
        Ok(scenarios)
    }

    /// Sentinel vectors for Simples brackets. Absent section means none.
    pub fn simples_sentinels(&self) -> Result<Vec<SimplesSentinel>, RulesetIntegrityError> {
        let Some(section) = self.table.get("audit_sentinels") else {
            return Ok(Vec::new());
        };
        let ctx = self
            .table
            .context("Simples Nacional", "Sentinelas de auditoria invalidas");
        let section = section
            .as_object()
            .ok_or_else(|| ctx.error("audit_sentinels", "objeto invalido"))?;
        let Some(entries) = section.get("simples") else {
            return Ok(Vec::new());
        };
        let entries = entries
            .as_array()
            .ok_or_else(|| ctx.error("audit_sentinels.simples", "lista invalida"))?;
        entries
            .iter()
            .enumerate()
            .map(|(idx, entry)| {
                serde_json::from_value::<SimplesSentinel>(entry.clone()).map_err(|e| {
                    ctx.error(format!("audit_sentinels.simples[{idx}]"), e.to_string())
                })
            })
            .collect()
    }

    pub fn table(&self) -> &RuleTable {
        &self.table
    }
}

impl TryFrom<RuleTable> for RulesetMetadata {
    type Error = RulesetIntegrityError;

    fn try_from(table: RuleTable) -> Result<Self, Self::Error> {
        if table.file() != RuleFile::Metadata {
            return Err(table
                .context(REGIME_ALL, "Metadados do ruleset indisponiveis")
                .error("", format!("arquivo inesperado: {}", table.file())));
        }
        Ok(Self::new(table))
    }
}

fn render_reference(item: &Map<String, Value>) -> String {
    let field = |key: &str| {
        item.get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .unwrap_or("N/D")
            .to_string()
    };
    let id = field("identificador");
    let reference = field("referencia");
    match item.get("url").and_then(Value::as_str).map(str::trim) {
        Some(url) if !url.is_empty() => format!("{id} - {reference} - {url}"),
        _ => format!("{id} - {reference}"),
    }
}
