//! The verification engine: reconciles one extracted [`Claim`] against a
//! company's structured financial data and produces a [`Verification`].
//!
//! The engine never errors — missing data, unresolvable metrics, and
//! comparison periods that were never filed all fold into the
//! `unverifiable` verdict. A `PeriodLookup` implementation supplies the
//! periods; tests use a plain in-memory map, production code backs it with
//! a repository.

use claim_auditor_math::{accuracy_score, growth_rate, normalize_to_unit};
use claim_auditor_metrics::MetricRegistry;
use claim_auditor_model::{
    Claim, ClaimUnit, ComparisonPeriod, FinancialPeriod, MetricKind, MisleadingFlag, PeriodKey, Verification,
};
use claim_auditor_scoring::{assign_verdict, Thresholds};

/// Supplies the `FinancialPeriod`s the engine needs for one company, keyed
/// by fiscal year and quarter. Implemented by the infrastructure
/// repository in production and by a plain map in tests.
pub trait PeriodLookup {
    fn lookup(&self, company_id: i64, key: PeriodKey) -> Option<FinancialPeriod>;
}

pub struct VerificationEngine {
    registry: MetricRegistry,
    thresholds: Thresholds,
}

impl Default for VerificationEngine {
    fn default() -> Self {
        Self::new(Thresholds::default())
    }
}

impl VerificationEngine {
    pub fn new(thresholds: Thresholds) -> Self {
        Self {
            registry: MetricRegistry::new(),
            thresholds,
        }
    }

    pub fn verify(
        &self,
        claim: &Claim,
        company_id: i64,
        fiscal_year: i32,
        fiscal_quarter: i32,
        periods: &impl PeriodLookup,
    ) -> Verification {
        let claim_id = claim.id.unwrap_or_default();

        if !self.registry.can_resolve(&claim.metric) {
            return unverifiable(
                claim_id,
                format!("'{}' is not a metric this system can resolve.", claim.metric),
                vec![],
            );
        }

        let current_key = PeriodKey::new(fiscal_year, fiscal_quarter);
        let current = periods.lookup(company_id, current_key);

        let (actual, periods_consulted) = match claim.metric_kind {
            MetricKind::GrowthRate | MetricKind::Change => {
                let comparison_key = match claim.comparison_period {
                    ComparisonPeriod::YearOverYear | ComparisonPeriod::FullYear => current_key.year_ago(),
                    ComparisonPeriod::QuarterOverQuarter | ComparisonPeriod::Sequential => {
                        current_key.prior_quarter()
                    }
                    ComparisonPeriod::Custom | ComparisonPeriod::None => {
                        return unverifiable(
                            claim_id,
                            "growth claim has no resolvable comparison period.".to_string(),
                            vec![],
                        );
                    }
                };
                let comparison = periods.lookup(company_id, comparison_key);
                match (&current, &comparison) {
                    (Some(cur), Some(cmp)) => {
                        let current_val = self.registry.resolve(&claim.metric, cur);
                        let comparison_val = self.registry.resolve(&claim.metric, cmp);
                        match (current_val, comparison_val) {
                            (Some(c), Some(p)) => (
                                growth_rate(c, p),
                                vec![cur.id.unwrap_or_default(), cmp.id.unwrap_or_default()],
                            ),
                            _ => (None, vec![]),
                        }
                    }
                    _ => (None, vec![]),
                }
            }
            MetricKind::Margin | MetricKind::Ratio => match &current {
                Some(cur) => (
                    self.registry.resolve(&claim.metric, cur),
                    vec![cur.id.unwrap_or_default()],
                ),
                None => (None, vec![]),
            },
            MetricKind::Absolute | MetricKind::PerShare => match &current {
                Some(cur) => {
                    let raw = self.registry.resolve(&claim.metric, cur);
                    (
                        raw.map(|v| normalize_to_unit(v, claim.unit)),
                        vec![cur.id.unwrap_or_default()],
                    )
                }
                None => (None, vec![]),
            },
        };

        let Some(actual) = actual else {
            return unverifiable(
                claim_id,
                "required financial data was not available for this claim.".to_string(),
                periods_consulted,
            );
        };

        let stated = match claim.unit {
            ClaimUnit::BasisPoints => claim.stated_value / 100.0,
            _ => claim.stated_value,
        };

        let score = accuracy_score(stated, actual);

        let mut flags = Vec::new();
        if (0.90..0.98).contains(&score) && stated.abs() > actual.abs() {
            flags.push(MisleadingFlag::RoundingBias);
        }
        if !claim.is_gaap {
            flags.push(MisleadingFlag::GaapNongaapMismatch);
        }
        if claim.segment.is_some() {
            flags.push(MisleadingFlag::SegmentVsTotal);
        }

        let verdict = assign_verdict(Some(score), &flags, self.thresholds);
        let explanation = explain(verdict, stated, actual);

        Verification {
            id: None,
            claim_id,
            actual_value: Some(actual),
            accuracy_score: Some(score),
            verdict,
            explanation,
            periods_consulted,
            flags,
        }
    }
}

fn unverifiable(claim_id: i64, reason: String, periods_consulted: Vec<i64>) -> Verification {
    Verification {
        id: None,
        claim_id,
        actual_value: None,
        accuracy_score: None,
        verdict: claim_auditor_model::Verdict::Unverifiable,
        explanation: reason,
        periods_consulted,
        flags: vec![],
    }
}

fn explain(verdict: claim_auditor_model::Verdict, stated: f64, actual: f64) -> String {
    use claim_auditor_model::Verdict::*;
    let pct_diff = if actual != 0.0 {
        (stated - actual) / actual.abs() * 100.0
    } else {
        0.0
    };
    match verdict {
        Verified => format!(
            "Stated value {:.2} matches the reported actual of {:.2}.",
            stated, actual
        ),
        ApproximatelyCorrect => format!(
            "Stated value {:.2} is approximately correct against an actual of {:.2} ({:+.1}% difference).",
            stated, actual, pct_diff
        ),
        Misleading => format!(
            "Stated value {:.2} diverges from the actual of {:.2} ({:+.1}% difference) in a way that misrepresents the underlying figure.",
            stated, actual, pct_diff
        ),
        Incorrect => format!(
            "Stated value {:.2} does not match the actual of {:.2} ({:+.1}% difference).",
            stated, actual, pct_diff
        ),
        Unverifiable => "Could not be verified against available financial data.".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct MapLookup(HashMap<(i64, PeriodKey), FinancialPeriod>);

    impl PeriodLookup for MapLookup {
        fn lookup(&self, company_id: i64, key: PeriodKey) -> Option<FinancialPeriod> {
            self.0.get(&(company_id, key)).cloned()
        }
    }

    fn claim(metric: &str, kind: MetricKind, stated: f64, unit: ClaimUnit, comparison: ComparisonPeriod) -> Claim {
        Claim {
            id: Some(1),
            transcript_id: 1,
            speaker: "CFO".to_string(),
            speaker_role: "CFO".to_string(),
            claim_text: "...".to_string(),
            metric: metric.to_string(),
            metric_kind: kind,
            stated_value: stated,
            unit,
            comparison_period: comparison,
            is_gaap: true,
            segment: None,
            confidence: 0.9,
            context: None,
        }
    }

    #[test]
    fn year_over_year_growth_verified() {
        let mut periods = HashMap::new();
        periods.insert(
            (1, PeriodKey::new(2024, 2)),
            FinancialPeriod {
                company_id: 1,
                fiscal_year: 2024,
                fiscal_quarter: 2,
                revenue: Some(1100.0),
                id: Some(10),
                ..Default::default()
            },
        );
        periods.insert(
            (1, PeriodKey::new(2023, 2)),
            FinancialPeriod {
                company_id: 1,
                fiscal_year: 2023,
                fiscal_quarter: 2,
                revenue: Some(1000.0),
                id: Some(9),
                ..Default::default()
            },
        );
        let lookup = MapLookup(periods);
        let engine = VerificationEngine::default();
        let c = claim(
            "revenue",
            MetricKind::GrowthRate,
            10.0,
            ClaimUnit::Percent,
            ComparisonPeriod::YearOverYear,
        );
        let v = engine.verify(&c, 1, 2024, 2, &lookup);
        assert_eq!(v.verdict, claim_auditor_model::Verdict::Verified);
        assert_eq!(v.actual_value, Some(10.0));
    }

    #[test]
    fn missing_comparison_period_is_unverifiable() {
        let lookup = MapLookup(HashMap::new());
        let engine = VerificationEngine::default();
        let c = claim(
            "revenue",
            MetricKind::GrowthRate,
            10.0,
            ClaimUnit::Percent,
            ComparisonPeriod::YearOverYear,
        );
        let v = engine.verify(&c, 1, 2024, 2, &lookup);
        assert_eq!(v.verdict, claim_auditor_model::Verdict::Unverifiable);
        assert!(v.actual_value.is_none());
        assert!(v.accuracy_score.is_none());
    }

    #[test]
    fn unresolvable_metric_is_unverifiable() {
        let lookup = MapLookup(HashMap::new());
        let engine = VerificationEngine::default();
        let c = claim(
            "daily active users",
            MetricKind::Absolute,
            1_000_000.0,
            ClaimUnit::Usd,
            ComparisonPeriod::None,
        );
        let v = engine.verify(&c, 1, 2024, 2, &lookup);
        assert_eq!(v.verdict, claim_auditor_model::Verdict::Unverifiable);
    }

    #[test]
    fn non_gaap_claim_is_upgraded_to_misleading() {
        let mut periods = HashMap::new();
        periods.insert(
            (1, PeriodKey::new(2024, 2)),
            FinancialPeriod {
                company_id: 1,
                fiscal_year: 2024,
                fiscal_quarter: 2,
                net_income: Some(100.0),
                id: Some(10),
                ..Default::default()
            },
        );
        let lookup = MapLookup(periods);
        let engine = VerificationEngine::default();
        let mut c = claim(
            "net_income",
            MetricKind::Absolute,
            100.0,
            ClaimUnit::Usd,
            ComparisonPeriod::None,
        );
        c.is_gaap = false;
        let v = engine.verify(&c, 1, 2024, 2, &lookup);
        assert_eq!(v.verdict, claim_auditor_model::Verdict::Misleading);
        assert!(v.flags.contains(&MisleadingFlag::GaapNongaapMismatch));
    }

    #[test]
    fn absolute_claim_in_billions_normalizes_correctly() {
        let mut periods = HashMap::new();
        periods.insert(
            (1, PeriodKey::new(2024, 2)),
            FinancialPeriod {
                company_id: 1,
                fiscal_year: 2024,
                fiscal_quarter: 2,
                revenue: Some(2_500_000_000.0),
                id: Some(10),
                ..Default::default()
            },
        );
        let lookup = MapLookup(periods);
        let engine = VerificationEngine::default();
        let c = claim(
            "revenue",
            MetricKind::Absolute,
            2.5,
            ClaimUnit::UsdBillions,
            ComparisonPeriod::None,
        );
        let v = engine.verify(&c, 1, 2024, 2, &lookup);
        assert_eq!(v.verdict, claim_auditor_model::Verdict::Verified);
    }

    #[test]
    fn quarter_wraps_to_prior_year_q4() {
        let mut periods = HashMap::new();
        periods.insert(
            (1, PeriodKey::new(2024, 1)),
            FinancialPeriod {
                company_id: 1,
                fiscal_year: 2024,
                fiscal_quarter: 1,
                revenue: Some(1100.0),
                id: Some(11),
                ..Default::default()
            },
        );
        periods.insert(
            (1, PeriodKey::new(2023, 4)),
            FinancialPeriod {
                company_id: 1,
                fiscal_year: 2023,
                fiscal_quarter: 4,
                revenue: Some(1000.0),
                id: Some(10),
                ..Default::default()
            },
        );
        let lookup = MapLookup(periods);
        let engine = VerificationEngine::default();
        let c = claim(
            "revenue",
            MetricKind::GrowthRate,
            10.0,
            ClaimUnit::Percent,
            ComparisonPeriod::Sequential,
        );
        let v = engine.verify(&c, 1, 2024, 1, &lookup);
        assert_eq!(v.verdict, claim_auditor_model::Verdict::Verified);
    }
}
