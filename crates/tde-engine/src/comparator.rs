//! # Regime Comparator
//!
//! One [`ComparisonRow`] per regime, in [`RegimeCode::all`] order.
//!
//! - BLOCKED eligibility: no calculation, tax is `None`, every eligibility
//!   alert is critical.
//! - Calculator domain error: the row is downgraded to BLOCKED and the error
//!   text joins both alert lists.
//! - Calculator ruleset error: returned to the caller. The comparison never
//!   absorbs it.
//!
//! Any row that is not OK carries its alerts as critical alerts.

use serde::{Deserialize, Serialize};
use tde_core::{EligibilityStatus, RegimeCode, RulesetIntegrityError};
use tde_regimes::{calculate, CalculationError, RegimeDetail};
use tde_ruleset::RulesetBundle;

use crate::eligibility::{find, EligibilityResult};
use crate::profile::CompanyProfile;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRow {
    pub regime_code: RegimeCode,
    pub regime_display: String,
    pub eligibility_status: EligibilityStatus,
    pub imposto_total: Option<f64>,
    /// `imposto_total / revenue * 100`.
    pub carga_efetiva_percentual: Option<f64>,
    pub alerts: Vec<String>,
    pub critical_alerts: Vec<String>,
    pub detalhes_regime: Option<RegimeDetail>,
}

impl ComparisonRow {
    fn without_tax(regime: RegimeCode, alerts: Vec<String>, critical_alerts: Vec<String>) -> Self {
        Self {
            regime_code: regime,
            regime_display: regime.display_name().to_string(),
            eligibility_status: EligibilityStatus::Blocked,
            imposto_total: None,
            carga_efetiva_percentual: None,
            alerts,
            critical_alerts,
            detalhes_regime: None,
        }
    }
}

pub fn compare_regimes(
    profile: &CompanyProfile,
    eligibility: &[EligibilityResult],
    bundle: &RulesetBundle,
) -> Result<Vec<ComparisonRow>, RulesetIntegrityError> {
    let request = profile.calculation_request();
    let mut rows = Vec::with_capacity(RegimeCode::all().len());

    for &regime in RegimeCode::all() {
        let (status, mut alerts) = match find(eligibility, regime) {
            Some(result) => (result.status, result.alerts()),
            None => (EligibilityStatus::Ok, Vec::new()),
        };

        if status == EligibilityStatus::Blocked {
            rows.push(ComparisonRow::without_tax(regime, alerts.clone(), alerts));
            continue;
        }

        let calc = match calculate(regime, &request, bundle) {
            Ok(calc) => calc,
            Err(CalculationError::Ruleset(err)) => return Err(err),
            Err(CalculationError::Domain(err)) => {
                let msg = err.to_string();
                tracing::warn!(regime = %regime, error = %msg, "regime row blocked by domain error");
                alerts.push(msg.clone());
                rows.push(ComparisonRow::without_tax(regime, alerts, vec![msg]));
                continue;
            }
        };

        // Only eligibility findings are critical; calculator notes stay advisory.
        let critical_alerts = if status == EligibilityStatus::Ok {
            Vec::new()
        } else {
            alerts.clone()
        };
        alerts.extend(calc.detail.alerts());
        let burden = (profile.revenue > 0.0).then(|| calc.tax / profile.revenue * 100.0);
        rows.push(ComparisonRow {
            regime_code: regime,
            regime_display: regime.display_name().to_string(),
            eligibility_status: status,
            imposto_total: Some(calc.tax),
            carga_efetiva_percentual: burden,
            alerts,
            critical_alerts,
            detalhes_regime: Some(calc.detail),
        });
    }
    Ok(rows)
}
