//! # Simples Nacional Tables
//!
//! Typed, validated view of `simples_tables.json`:
//!
//! ```json
//! {
//!   "limite_elegibilidade_simples": 4800000,
//!   "fator_r_limite": 0.28,
//!   "partilha_percentual_base": "decimal_0_1",
//!   "anexos": { "I": [ { "limite_superior": 180000, "aliquota_nominal": 0.04,
//!                        "parcela_deduzir": 0, "percentuais_partilha": { ... } } ] }
//! }
//! ```
//!
//! ## Validated when the view is built
//!
//! - Ceilings strictly increasing within each annex.
//! - Rates, deductions and ceilings non-negative.
//! - Each bracket's seven tax shares present, non-negative, summing to 1
//!   within [`SHARE_SUM_TOLERANCE`].
//! - `fator_r_limite` within [0, 1].
//!
//! Calculators can therefore trust the shares without re-deriving them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tde_core::{RegimeCode, RulesetIntegrityError};

use crate::table::{join, RuleContext, RuleTable};

/// Maximum deviation of a bracket's share total from 1.
pub const SHARE_SUM_TOLERANCE: f64 = 1e-6;

/// Only supported share encoding: fractions in [0, 1].
pub const SHARE_BASE_DECIMAL: &str = "decimal_0_1";

const IMPACT_DAS: &str = "Nao e possivel calcular DAS";
const IMPACT_PARTILHA: &str = "Nao e possivel calcular partilha do DAS";

/// One of the five Simples Nacional annexes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Annex {
    I,
    II,
    III,
    IV,
    V,
}

impl Annex {
    pub fn all() -> &'static [Annex] {
        &[Self::I, Self::II, Self::III, Self::IV, Self::V]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::I => "I",
            Self::II => "II",
            Self::III => "III",
            Self::IV => "IV",
            Self::V => "V",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::all().iter().copied().find(|a| a.as_str() == code)
    }
}

impl std::fmt::Display for Annex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Annex requested by the company, before Fator R resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnnexSelection {
    Fixed(Annex),
    /// Composite "III/V": resolved by comparing Fator R to the threshold.
    ServicesByFatorR,
}

impl AnnexSelection {
    /// Normalize free text (`" iii-v "` becomes `III/V`) and resolve it.
    /// Returns `None` for blank or unrecognized input.
    pub fn parse(raw: &str) -> Option<Self> {
        let code = normalize_annex_code(raw);
        if code == "III/V" {
            return Some(Self::ServicesByFatorR);
        }
        Annex::from_code(&code).map(Self::Fixed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fixed(annex) => annex.as_str(),
            Self::ServicesByFatorR => "III/V",
        }
    }
}

impl std::fmt::Display for AnnexSelection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trim, uppercase, and turn `-` into `/`.
pub fn normalize_annex_code(raw: &str) -> String {
    raw.trim().to_uppercase().replace('-', "/")
}

/// The seven taxes the unified DAS payment is split into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Tributo {
    Irpj,
    Csll,
    Pis,
    Cofins,
    Cpp,
    Icms,
    Iss,
}

impl Tributo {
    pub fn all() -> &'static [Tributo] {
        &[
            Self::Irpj,
            Self::Csll,
            Self::Pis,
            Self::Cofins,
            Self::Cpp,
            Self::Icms,
            Self::Iss,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Irpj => "IRPJ",
            Self::Csll => "CSLL",
            Self::Pis => "PIS",
            Self::Cofins => "COFINS",
            Self::Cpp => "CPP",
            Self::Icms => "ICMS",
            Self::Iss => "ISS",
        }
    }
}

impl std::fmt::Display for Tributo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Share of each tax in a bracket, as fractions summing to 1.
pub type TaxShares = BTreeMap<Tributo, f64>;

/// One row of an annex table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bracket {
    /// 1-based position in the annex.
    pub number: usize,
    pub ceiling: f64,
    pub nominal_rate: f64,
    pub deduction: f64,
    pub shares: TaxShares,
}

/// Validated `simples_tables.json`.
#[derive(Debug, Clone, PartialEq)]
pub struct SimplesTables {
    pub ruleset_id: String,
    pub eligibility_ceiling: f64,
    pub fator_r_threshold: f64,
    annexes: BTreeMap<Annex, Vec<Bracket>>,
}

impl SimplesTables {
    pub fn from_table(table: &RuleTable) -> Result<Self, RulesetIntegrityError> {
        let regime = RegimeCode::Simples.display_name();
        let root = table.payload();
        let ctx = table.context(regime, IMPACT_DAS);

        let eligibility_ceiling = ctx
            .with_impact("Nao e possivel validar elegibilidade do Simples")
            .non_negative(root, "", "limite_elegibilidade_simples")?;

        let fr_ctx = ctx.with_impact("Nao e possivel determinar anexo III/V");
        let fator_r_threshold = fr_ctx.number(root, "", "fator_r_limite")?;
        if !(0.0..=1.0).contains(&fator_r_threshold) {
            return Err(fr_ctx.error("fator_r_limite", "valor fora de [0, 1]"));
        }

        let base = ctx.string(root, "", "partilha_percentual_base")?;
        if base != SHARE_BASE_DECIMAL {
            return Err(ctx.error(
                "partilha_percentual_base",
                format!("base nao suportada ({base}); esperado {SHARE_BASE_DECIMAL}"),
            ));
        }

        let raw_annexes = ctx.object(root, "", "anexos")?;
        let mut annexes = BTreeMap::new();
        for (code, rows) in raw_annexes {
            let path = join("anexos", code);
            let annex =
                Annex::from_code(code).ok_or_else(|| ctx.error(&path, "anexo desconhecido"))?;
            let rows = rows
                .as_array()
                .ok_or_else(|| ctx.error(&path, "lista invalida"))?;
            annexes.insert(annex, parse_brackets(&ctx, &path, rows)?);
        }

        Ok(Self {
            ruleset_id: table.ruleset_id().to_string(),
            eligibility_ceiling,
            fator_r_threshold,
            annexes,
        })
    }

    /// Ordered bracket table of an annex.
    pub fn brackets(&self, annex: Annex) -> Result<&[Bracket], RulesetIntegrityError> {
        self.annexes
            .get(&annex)
            .map(Vec::as_slice)
            .ok_or_else(|| RulesetIntegrityError {
                ruleset_id: self.ruleset_id.clone(),
                file: crate::file::RuleFile::SimplesTables.file_name().to_string(),
                key: join("anexos", annex.as_str()),
                regime: RegimeCode::Simples.display_name().to_string(),
                impact: IMPACT_DAS.to_string(),
                detail: "anexo nao encontrado".to_string(),
            })
    }

    pub fn annexes(&self) -> impl Iterator<Item = (Annex, &[Bracket])> {
        self.annexes.iter().map(|(a, b)| (*a, b.as_slice()))
    }
}

fn parse_brackets(
    ctx: &RuleContext<'_>,
    path: &str,
    rows: &[Value],
) -> Result<Vec<Bracket>, RulesetIntegrityError> {
    if rows.is_empty() {
        return Err(ctx.error(path, "lista de faixas vazia"));
    }
    let mut brackets: Vec<Bracket> = Vec::with_capacity(rows.len());
    for (idx, row) in rows.iter().enumerate() {
        let row_path = format!("{path}[{idx}]");
        let obj = row
            .as_object()
            .ok_or_else(|| ctx.error(&row_path, "objeto invalido"))?;
        let ceiling = ctx.non_negative(obj, &row_path, "limite_superior")?;
        let nominal_rate = ctx.non_negative(obj, &row_path, "aliquota_nominal")?;
        let deduction = ctx.non_negative(obj, &row_path, "parcela_deduzir")?;
        if let Some(prev) = brackets.last() {
            if ceiling <= prev.ceiling {
                return Err(ctx.error(
                    join(&row_path, "limite_superior"),
                    "limites de faixa devem ser estritamente crescentes",
                ));
            }
        }
        let shares = parse_shares(ctx, &row_path, obj)?;
        brackets.push(Bracket {
            number: idx + 1,
            ceiling,
            nominal_rate,
            deduction,
            shares,
        });
    }
    Ok(brackets)
}

fn parse_shares(
    ctx: &RuleContext<'_>,
    row_path: &str,
    row: &Map<String, Value>,
) -> Result<TaxShares, RulesetIntegrityError> {
    let ctx = ctx.with_impact(IMPACT_PARTILHA);
    let share_path = join(row_path, "percentuais_partilha");
    let raw = ctx.object(row, row_path, "percentuais_partilha")?;
    let mut shares = TaxShares::new();
    for tributo in Tributo::all() {
        let pct = ctx.non_negative(raw, &share_path, tributo.as_str())?;
        shares.insert(*tributo, pct);
    }
    let total: f64 = shares.values().sum();
    if (total - 1.0).abs() > SHARE_SUM_TOLERANCE {
        return Err(ctx.error(
            share_path,
            format!("soma da partilha = {total:.6}; esperado 1"),
        ));
    }
    Ok(shares)
}
