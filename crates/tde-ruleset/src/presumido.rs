//! # Lucro Presumido Parameters
//!
//! Typed view of `presumido_params.json` plus the activity-type alias
//! table. Free-text activity input is folded (trimmed, lowercased, accents
//! stripped) and looked up in [`ACTIVITY_ALIASES`]; anything unmapped falls
//! back to [`ActivityType::FALLBACK`] with an advisory note.
//!
//! The presumption map must carry every canonical activity and the surtax
//! threshold map every periodicity. Both are checked when the view is built,
//! so a calculator never hits a missing key mid-computation.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tde_core::{fold_text, Periodicity, RegimeCode, RulesetIntegrityError};

use crate::table::{join, RuleTable};

/// Canonical activity categories keyed in `percentual_presuncao`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ActivityType {
    Comercio,
    Industria,
    ServicosGeral,
    Outros,
}

/// Folded alias to canonical activity.
pub const ACTIVITY_ALIASES: &[(&str, ActivityType)] = &[
    ("comercio", ActivityType::Comercio),
    ("industria", ActivityType::Industria),
    ("servicos", ActivityType::ServicosGeral),
    ("servicos (geral)", ActivityType::ServicosGeral),
    ("outros", ActivityType::Outros),
    ("outro", ActivityType::Outros),
];

impl ActivityType {
    pub const FALLBACK: ActivityType = ActivityType::Comercio;

    pub fn all() -> &'static [ActivityType] {
        &[
            Self::Comercio,
            Self::Industria,
            Self::ServicosGeral,
            Self::Outros,
        ]
    }

    /// Key used in `percentual_presuncao`.
    pub fn rule_key(&self) -> &'static str {
        match self {
            Self::Comercio => "Comercio",
            Self::Industria => "Industria",
            Self::ServicosGeral => "Servicos (geral)",
            Self::Outros => "Outros",
        }
    }

    /// Portuguese label for reports.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Comercio => "Comércio",
            Self::Industria => "Indústria",
            Self::ServicosGeral => "Serviços (geral)",
            Self::Outros => "Outros",
        }
    }

    /// Resolve request text to a canonical activity.
    pub fn resolve(raw: Option<&str>) -> ActivityResolution {
        let informed = raw.map(str::trim).filter(|s| !s.is_empty());
        let Some(text) = informed else {
            return ActivityResolution {
                activity: Self::FALLBACK,
                source: ActivitySource::Missing,
                informed: None,
            };
        };
        let folded = fold_text(text);
        let mapped = ACTIVITY_ALIASES
            .iter()
            .find(|(alias, _)| *alias == folded)
            .map(|(_, activity)| *activity);
        match mapped {
            Some(activity) => ActivityResolution {
                activity,
                source: ActivitySource::Informed,
                informed: Some(text.to_string()),
            },
            None => ActivityResolution {
                activity: Self::FALLBACK,
                source: ActivitySource::Unmapped,
                informed: Some(text.to_string()),
            },
        }
    }
}

impl std::fmt::Display for ActivityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.rule_key())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivitySource {
    Informed,
    /// No activity in the request.
    Missing,
    /// Text present but not in the alias table.
    Unmapped,
}

/// Outcome of [`ActivityType::resolve`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityResolution {
    pub activity: ActivityType,
    pub source: ActivitySource,
    /// Trimmed request text, if any.
    pub informed: Option<String>,
}

impl ActivityResolution {
    /// Advisory note describing how the activity was chosen, if anything
    /// other than a plain match happened.
    pub fn advisory(&self) -> Option<String> {
        match self.source {
            ActivitySource::Missing => Some(format!(
                "tipo_atividade ausente; fallback do ruleset aplicado ({}).",
                ActivityType::FALLBACK.rule_key()
            )),
            ActivitySource::Unmapped => Some(format!(
                "tipo_atividade '{}' nao mapeado; fallback do ruleset aplicado ({}).",
                self.informed.as_deref().unwrap_or_default(),
                ActivityType::FALLBACK.rule_key()
            )),
            ActivitySource::Informed if self.activity == ActivityType::Outros => {
                Some("tipo 'Outros' usando percentual definido no ruleset.".to_string())
            }
            ActivitySource::Informed => None,
        }
    }
}

/// Validated `presumido_params.json`.
#[derive(Debug, Clone, PartialEq)]
pub struct PresumidoParams {
    pub ruleset_id: String,
    pub pis: f64,
    pub cofins: f64,
    pub irpj: f64,
    pub adicional_irpj: f64,
    pub csll: f64,
    surtax_thresholds: BTreeMap<Periodicity, f64>,
    presumption: BTreeMap<ActivityType, f64>,
}

impl PresumidoParams {
    pub fn from_table(table: &RuleTable) -> Result<Self, RulesetIntegrityError> {
        let root = table.payload();
        let ctx = table.context(
            RegimeCode::Presumido.display_name(),
            "Nao e possivel calcular PIS/COFINS",
        );
        let pis = ctx.non_negative(root, "", "pis")?;
        let cofins = ctx.non_negative(root, "", "cofins")?;
        let irpj = ctx
            .with_impact("Nao e possivel calcular IRPJ")
            .non_negative(root, "", "irpj")?;
        let surtax_ctx = ctx.with_impact("Nao e possivel calcular adicional de IRPJ");
        let adicional_irpj = surtax_ctx.non_negative(root, "", "adicional_irpj")?;
        let csll = ctx
            .with_impact("Nao e possivel calcular CSLL")
            .non_negative(root, "", "csll")?;

        let limits = surtax_ctx.object(root, "", "limites_adicional_irpj")?;
        let mut surtax_thresholds = BTreeMap::new();
        for period in Periodicity::all() {
            let value = surtax_ctx.non_negative(limits, "limites_adicional_irpj", period.as_str())?;
            surtax_thresholds.insert(*period, value);
        }

        let presumption_ctx =
            ctx.with_impact("Nao e possivel definir base presumida por atividade");
        let raw = presumption_ctx.object(root, "", "percentual_presuncao")?;
        let mut presumption = BTreeMap::new();
        for activity in ActivityType::all() {
            let pct = presumption_ctx.non_negative(raw, "percentual_presuncao", activity.rule_key())?;
            if pct > 1.0 {
                return Err(presumption_ctx.error(
                    join("percentual_presuncao", activity.rule_key()),
                    "valor fora de [0, 1]",
                ));
            }
            presumption.insert(*activity, pct);
        }

        Ok(Self {
            ruleset_id: table.ruleset_id().to_string(),
            pis,
            cofins,
            irpj,
            adicional_irpj,
            csll,
            surtax_thresholds,
            presumption,
        })
    }

    /// Surtax threshold for the period. Every periodicity is present after
    /// validation; an absent entry means no threshold.
    pub fn surtax_threshold(&self, period: Periodicity) -> f64 {
        self.surtax_thresholds.get(&period).copied().unwrap_or(0.0)
    }

    /// Presumption percentage for a canonical activity.
    pub fn presumption(&self, activity: ActivityType) -> f64 {
        self.presumption.get(&activity).copied().unwrap_or(0.0)
    }
}
