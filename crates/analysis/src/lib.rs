//! The discrepancy analyzer: five independent, pure pattern detectors that
//! look across a company's verified claims for systematic discrepancies a
//! single-claim view cannot reveal.

use std::collections::BTreeMap;

use claim_auditor_model::{MetricKind, Pattern, PatternKind};

/// The subset of a verified claim the analyzer's detectors need. Built from
/// a `Claim` joined with its `Verification`.
#[derive(Debug, Clone)]
pub struct VerifiedClaim {
    pub metric: String,
    pub metric_kind: MetricKind,
    pub is_gaap: bool,
    pub stated_value: f64,
    pub actual_value: Option<f64>,
    pub accuracy_score: Option<f64>,
}

/// Claims grouped by fiscal quarter, ordered ascending by `(year, quarter)`.
pub type ClaimsByQuarter = BTreeMap<(i32, i32), Vec<VerifiedClaim>>;

fn quarter_label((year, quarter): (i32, i32)) -> String {
    format!("Q{} {}", quarter, year)
}

pub struct DiscrepancyAnalyzer;

impl Default for DiscrepancyAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl DiscrepancyAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// Runs all five detectors and returns the patterns found, in a fixed
    /// order (rounding, switching, inaccuracy, GAAP shifting, emphasis).
    pub fn analyze(&self, company_id: i64, claims: &ClaimsByQuarter) -> Vec<Pattern> {
        let mut patterns = Vec::new();
        patterns.extend(detect_rounding_bias(company_id, claims));
        patterns.extend(detect_metric_switching(company_id, claims));
        patterns.extend(detect_increasing_inaccuracy(company_id, claims));
        patterns.extend(detect_gaap_shifting(company_id, claims));
        patterns.extend(detect_selective_emphasis(company_id, claims));
        patterns
    }
}

fn detect_rounding_bias(company_id: i64, claims: &ClaimsByQuarter) -> Option<Pattern> {
    let mut total = 0u32;
    let mut favorable = 0u32;
    let mut favorable_quarters = Vec::new();

    for (&key, quarter_claims) in claims {
        let mut quarter_had_favorable = false;
        for c in quarter_claims {
            let Some(score) = c.accuracy_score else { continue };
            if !(score > 0.0 && score < 1.0) {
                continue;
            }
            let Some(actual) = c.actual_value else { continue };
            total += 1;
            if c.stated_value > actual {
                favorable += 1;
                quarter_had_favorable = true;
            }
        }
        if quarter_had_favorable {
            favorable_quarters.push(quarter_label(key));
        }
    }

    if total < 4 {
        return None;
    }
    let ratio = favorable as f64 / total as f64;
    if ratio <= 0.70 {
        return None;
    }

    Some(Pattern {
        id: None,
        company_id,
        kind: PatternKind::ConsistentRoundingUp,
        severity: ratio,
        description: format!(
            "{} of {} inexact claims ({:.0}%) rounded in the company's favor.",
            favorable,
            total,
            ratio * 100.0
        ),
        affected_quarters: favorable_quarters,
        evidence: vec![format!("{favorable}/{total} favorable roundings")],
    })
}

fn top_metric(quarter_claims: &[VerifiedClaim]) -> Option<String> {
    let mut counts: BTreeMap<&str, u32> = BTreeMap::new();
    for c in quarter_claims {
        *counts.entry(c.metric.as_str()).or_default() += 1;
    }
    counts
        .into_iter()
        .max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.cmp(a.0)))
        .map(|(metric, _)| metric.to_string())
}

fn detect_metric_switching(company_id: i64, claims: &ClaimsByQuarter) -> Option<Pattern> {
    let mut tops = Vec::new();
    for (&key, quarter_claims) in claims {
        if quarter_claims.is_empty() {
            continue;
        }
        if let Some(metric) = top_metric(quarter_claims) {
            tops.push((quarter_label(key), metric));
        }
    }

    if tops.len() < 3 {
        return None;
    }
    let distinct: std::collections::BTreeSet<&str> = tops.iter().map(|(_, m)| m.as_str()).collect();
    if distinct.len() < 3 {
        return None;
    }

    let pairs: Vec<String> = tops.iter().map(|(q, m)| format!("{q}: {m}")).collect();
    Some(Pattern {
        id: None,
        company_id,
        kind: PatternKind::MetricSwitching,
        severity: 0.5,
        description: format!("The emphasized metric changes quarter to quarter: {}.", pairs.join("; ")),
        affected_quarters: tops.into_iter().map(|(q, _)| q).collect(),
        evidence: pairs,
    })
}

fn detect_increasing_inaccuracy(company_id: i64, claims: &ClaimsByQuarter) -> Option<Pattern> {
    let mut series = Vec::new();
    for (&key, quarter_claims) in claims {
        let scores: Vec<f64> = quarter_claims.iter().filter_map(|c| c.accuracy_score).collect();
        if scores.is_empty() {
            continue;
        }
        let mean = scores.iter().sum::<f64>() / scores.len() as f64;
        series.push((quarter_label(key), mean));
    }

    if series.len() < 3 {
        return None;
    }
    let first = series.first().unwrap().1;
    let last = series.last().unwrap().1;
    if last - first > -0.05 {
        return None;
    }

    Some(Pattern {
        id: None,
        company_id,
        kind: PatternKind::IncreasingInaccuracy,
        severity: (last - first).abs(),
        description: format!(
            "Average claim accuracy declined from {:.2} to {:.2} across the covered quarters.",
            first, last
        ),
        affected_quarters: series.iter().map(|(q, _)| q.clone()).collect(),
        evidence: series.iter().map(|(q, m)| format!("{q}: mean accuracy {m:.2}")).collect(),
    })
}

fn detect_gaap_shifting(company_id: i64, claims: &ClaimsByQuarter) -> Option<Pattern> {
    let mut ratios = Vec::new();
    for (&key, quarter_claims) in claims {
        if quarter_claims.is_empty() {
            continue;
        }
        let gaap = quarter_claims.iter().filter(|c| c.is_gaap).count() as f64;
        ratios.push((quarter_label(key), gaap / quarter_claims.len() as f64));
    }

    if ratios.len() < 2 {
        return None;
    }
    let max = ratios.iter().map(|(_, r)| *r).fold(f64::MIN, f64::max);
    let min = ratios.iter().map(|(_, r)| *r).fold(f64::MAX, f64::min);
    if max - min <= 0.30 {
        return None;
    }

    let affected: Vec<String> = ratios
        .iter()
        .filter(|(_, r)| *r == max || *r == min)
        .map(|(q, _)| q.clone())
        .collect();

    Some(Pattern {
        id: None,
        company_id,
        kind: PatternKind::GaapNongaapShifting,
        severity: max - min,
        description: format!(
            "The share of GAAP-framed claims swings between {:.0}% and {:.0}% across quarters.",
            min * 100.0,
            max * 100.0
        ),
        affected_quarters: affected,
        evidence: ratios.iter().map(|(q, r)| format!("{q}: {:.0}% GAAP", r * 100.0)).collect(),
    })
}

fn detect_selective_emphasis(company_id: i64, claims: &ClaimsByQuarter) -> Option<Pattern> {
    let mut biased_quarters = Vec::new();
    for (&key, quarter_claims) in claims {
        let growth: Vec<&VerifiedClaim> = quarter_claims
            .iter()
            .filter(|c| c.metric_kind == MetricKind::GrowthRate)
            .collect();
        let pos = growth.iter().filter(|c| c.stated_value > 0.0).count();
        let neg = growth.iter().filter(|c| c.stated_value < 0.0).count();
        if pos + neg > 2 && pos as f64 / (pos + neg) as f64 > 0.90 {
            biased_quarters.push(quarter_label(key));
        }
    }

    if biased_quarters.len() < 2 {
        return None;
    }

    Some(Pattern {
        id: None,
        company_id,
        kind: PatternKind::SelectiveEmphasis,
        severity: 0.6,
        description: format!(
            "Growth figures are cited almost exclusively when positive in {} quarters.",
            biased_quarters.len()
        ),
        affected_quarters: biased_quarters.clone(),
        evidence: biased_quarters,
    })
}
