//! The extraction adapter: prompts the LLM client for structured claims,
//! tolerantly parses its response, then validates/normalizes/coerces/dedups
//! the result before it becomes a batch of `ClaimInsert`s.

pub mod llm;

use async_trait::async_trait;
use claim_auditor_core::{Error, Result};
use claim_auditor_metrics::MetricRegistry;
use claim_auditor_model::{ClaimInsert, ClaimUnit, ComparisonPeriod, MetricKind};
use serde::Deserialize;
use tracing::warn;

pub use llm::LlmClient;

pub const SYSTEM_PROMPT_V1: &str = r#"You are a financial analyst extracting quantitative claims from an earnings
call transcript (prompt version 1). Return a JSON array. Each element must have:
speaker (string), speaker_role (string), claim_text (verbatim quote), metric (free-form name),
metric_kind (one of absolute, growth_rate, margin, ratio, change, per_share),
stated_value (number), unit (one of usd, usd_millions, usd_billions, percent, basis_points, ratio, shares),
comparison_period (one of year_over_year, quarter_over_quarter, sequential, full_year, custom, none),
is_gaap (bool), segment (string or null), confidence (0..1), context (string or null).
Only extract claims made by management speakers. Return only the JSON array, nothing else."#;

/// A single claim as parsed from the LLM's raw JSON response, before
/// normalization against the metric registry.
#[derive(Debug, Clone, Deserialize)]
pub struct ClaimDraft {
    pub speaker: String,
    pub speaker_role: String,
    pub claim_text: String,
    pub metric: String,
    pub metric_kind: String,
    pub stated_value: f64,
    pub unit: String,
    pub comparison_period: String,
    pub is_gaap: bool,
    pub segment: Option<String>,
    pub confidence: f64,
    pub context: Option<String>,
}

#[async_trait]
pub trait ExtractionAdapter: Send + Sync {
    async fn extract(&self, transcript_text: &str, ticker: &str, fiscal_year: i32, fiscal_quarter: i32) -> Result<Vec<ClaimDraft>>;
}

pub struct LlmExtractionAdapter {
    client: LlmClient,
}

impl LlmExtractionAdapter {
    pub fn new(client: LlmClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ExtractionAdapter for LlmExtractionAdapter {
    async fn extract(&self, transcript_text: &str, ticker: &str, fiscal_year: i32, fiscal_quarter: i32) -> Result<Vec<ClaimDraft>> {
        let user_content = format!(
            "Ticker: {ticker}\nFiscal Year: {fiscal_year}\nFiscal Quarter: Q{fiscal_quarter}\n\nTranscript:\n{transcript_text}"
        );
        let raw = self.client.complete(SYSTEM_PROMPT_V1, &user_content).await?;
        parse_claim_drafts(&raw)
    }
}

/// Extracts a JSON array from `raw`, tolerating bare JSON, a response
/// wrapped in triple-backtick fences, or JSON embedded in surrounding
/// prose (located by the outermost `[...]`). Each array element is
/// deserialized independently: a record that fails to parse as a
/// `ClaimDraft` (missing field, wrong type) is dropped with a warning,
/// its siblings in the same response are kept.
pub fn parse_claim_drafts(raw: &str) -> Result<Vec<ClaimDraft>> {
    let candidate = extract_json_array(raw)
        .ok_or_else(|| Error::InvalidResponseFormat("extraction-service".to_string(), "no JSON array found".to_string()))?;
    let elements: Vec<serde_json::Value> = serde_json::from_str(candidate)?;

    let mut drafts = Vec::with_capacity(elements.len());
    for (index, element) in elements.into_iter().enumerate() {
        match serde_json::from_value::<ClaimDraft>(element) {
            Ok(draft) => drafts.push(draft),
            Err(err) => warn!("discarding unparseable claim record at index {index}: {err}"),
        }
    }
    Ok(drafts)
}

fn extract_json_array(raw: &str) -> Option<&str> {
    let trimmed = raw.trim();

    if trimmed.starts_with('[') && trimmed.ends_with(']') {
        return Some(trimmed);
    }

    if let Some(fence_start) = trimmed.find("```") {
        let after_fence = &trimmed[fence_start + 3..];
        let after_fence = after_fence.strip_prefix("json").unwrap_or(after_fence);
        if let Some(fence_end) = after_fence.find("```") {
            let body = after_fence[..fence_end].trim();
            if body.starts_with('[') {
                return Some(body);
            }
        }
    }

    let start = trimmed.find('[')?;
    let end = trimmed.rfind(']')?;
    if end > start {
        Some(&trimmed[start..=end])
    } else {
        None
    }
}

fn coerce_metric_kind(s: &str) -> Option<MetricKind> {
    match s {
        "absolute" => Some(MetricKind::Absolute),
        "growth_rate" => Some(MetricKind::GrowthRate),
        "margin" => Some(MetricKind::Margin),
        "ratio" => Some(MetricKind::Ratio),
        "change" => Some(MetricKind::Change),
        "per_share" => Some(MetricKind::PerShare),
        _ => None,
    }
}

fn coerce_unit(s: &str) -> Option<ClaimUnit> {
    match s {
        "usd" => Some(ClaimUnit::Usd),
        "usd_millions" => Some(ClaimUnit::UsdMillions),
        "usd_billions" => Some(ClaimUnit::UsdBillions),
        "percent" => Some(ClaimUnit::Percent),
        "basis_points" => Some(ClaimUnit::BasisPoints),
        "ratio" => Some(ClaimUnit::Ratio),
        "shares" => Some(ClaimUnit::Shares),
        _ => None,
    }
}

fn coerce_comparison_period(s: &str) -> Option<ComparisonPeriod> {
    match s {
        "year_over_year" => Some(ComparisonPeriod::YearOverYear),
        "quarter_over_quarter" => Some(ComparisonPeriod::QuarterOverQuarter),
        "sequential" => Some(ComparisonPeriod::Sequential),
        "full_year" => Some(ComparisonPeriod::FullYear),
        "custom" => Some(ComparisonPeriod::Custom),
        "none" => Some(ComparisonPeriod::None),
        _ => None,
    }
}

/// Outcome of [`post_process`]: the surviving inserts plus independent
/// counts of why the rest were dropped, so callers can report
/// extracted/invalid/deduped as three distinct numbers rather than
/// inferring them from a length difference.
#[derive(Debug, Default)]
pub struct PostProcessResult {
    pub inserts: Vec<ClaimInsert>,
    pub invalid: u32,
    pub deduped: u32,
}

/// Validates, normalizes, coerces, and dedups a batch of drafts into
/// persistable inserts, capped at `max_claims`.
pub fn post_process(
    drafts: Vec<ClaimDraft>,
    transcript_id: i64,
    registry: &MetricRegistry,
    max_claims: usize,
) -> PostProcessResult {
    let mut seen = std::collections::HashSet::new();
    let mut out = PostProcessResult::default();

    for draft in drafts {
        if draft.claim_text.trim().is_empty() || !(0.0..=1.0).contains(&draft.confidence) {
            warn!("discarding claim with invalid text or confidence: {:?}", draft.claim_text);
            out.invalid += 1;
            continue;
        }
        let Some(metric_kind) = coerce_metric_kind(&draft.metric_kind) else {
            warn!("discarding claim with unknown metric_kind '{}'", draft.metric_kind);
            out.invalid += 1;
            continue;
        };
        let Some(unit) = coerce_unit(&draft.unit) else {
            warn!("discarding claim with unknown unit '{}'", draft.unit);
            out.invalid += 1;
            continue;
        };
        let Some(comparison_period) = coerce_comparison_period(&draft.comparison_period) else {
            warn!("discarding claim with unknown comparison_period '{}'", draft.comparison_period);
            out.invalid += 1;
            continue;
        };

        let metric = registry.normalize(&draft.metric);
        let dedup_key = (
            metric.clone(),
            draft.stated_value.to_bits(),
            draft.comparison_period.clone(),
        );
        if !seen.insert(dedup_key) {
            out.deduped += 1;
            continue;
        }

        out.inserts.push(ClaimInsert {
            transcript_id,
            speaker: draft.speaker,
            speaker_role: draft.speaker_role,
            claim_text: draft.claim_text,
            metric,
            metric_kind,
            stated_value: draft.stated_value,
            unit,
            comparison_period,
            is_gaap: draft.is_gaap,
            segment: draft.segment,
            confidence: draft.confidence,
            context: draft.context,
        });

        if out.inserts.len() >= max_claims {
            break;
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(metric: &str, stated_value: f64) -> ClaimDraft {
        ClaimDraft {
            speaker: "CFO".to_string(),
            speaker_role: "CFO".to_string(),
            claim_text: "Revenue grew 10%".to_string(),
            metric: metric.to_string(),
            metric_kind: "growth_rate".to_string(),
            stated_value,
            unit: "percent".to_string(),
            comparison_period: "year_over_year".to_string(),
            is_gaap: true,
            segment: None,
            confidence: 0.9,
            context: None,
        }
    }

    #[test]
    fn parses_bare_json() {
        let raw = r#"[{"speaker":"CFO","speaker_role":"CFO","claim_text":"x","metric":"revenue","metric_kind":"absolute","stated_value":1.0,"unit":"usd","comparison_period":"none","is_gaap":true,"segment":null,"confidence":0.9,"context":null}]"#;
        let drafts = parse_claim_drafts(raw).unwrap();
        assert_eq!(drafts.len(), 1);
    }

    #[test]
    fn parses_fenced_json() {
        let raw = "Here is the extraction:\n```json\n[{\"speaker\":\"CFO\",\"speaker_role\":\"CFO\",\"claim_text\":\"x\",\"metric\":\"revenue\",\"metric_kind\":\"absolute\",\"stated_value\":1.0,\"unit\":\"usd\",\"comparison_period\":\"none\",\"is_gaap\":true,\"segment\":null,\"confidence\":0.9,\"context\":null}]\n```\nDone.";
        let drafts = parse_claim_drafts(raw).unwrap();
        assert_eq!(drafts.len(), 1);
    }

    #[test]
    fn parses_json_embedded_in_prose() {
        let raw = "Sure, here are the claims: [{\"speaker\":\"CFO\",\"speaker_role\":\"CFO\",\"claim_text\":\"x\",\"metric\":\"revenue\",\"metric_kind\":\"absolute\",\"stated_value\":1.0,\"unit\":\"usd\",\"comparison_period\":\"none\",\"is_gaap\":true,\"segment\":null,\"confidence\":0.9,\"context\":null}] Hope that helps!";
        let drafts = parse_claim_drafts(raw).unwrap();
        assert_eq!(drafts.len(), 1);
    }

    #[test]
    fn parses_surviving_siblings_when_one_record_is_malformed() {
        let raw = r#"[
            {"speaker":"CFO","speaker_role":"CFO","claim_text":"x","metric":"revenue","metric_kind":"absolute","stated_value":1.0,"unit":"usd","comparison_period":"none","is_gaap":true,"segment":null,"confidence":0.9,"context":null},
            {"speaker":"CFO","speaker_role":"CFO","claim_text":"missing metric_kind"},
            {"speaker":"CEO","speaker_role":"CEO","claim_text":"y","metric":"net_income","metric_kind":"absolute","stated_value":2.0,"unit":"usd","comparison_period":"none","is_gaap":true,"segment":null,"confidence":0.8,"context":null}
        ]"#;
        let drafts = parse_claim_drafts(raw).unwrap();
        assert_eq!(drafts.len(), 2);
        assert_eq!(drafts[0].metric, "revenue");
        assert_eq!(drafts[1].metric, "net_income");
    }

    #[test]
    fn postprocess_normalizes_metric_aliases() {
        let registry = MetricRegistry::new();
        let result = post_process(vec![draft("total revenue", 10.0)], 1, &registry, 50);
        assert_eq!(result.inserts[0].metric, "revenue");
        assert_eq!(result.invalid, 0);
        assert_eq!(result.deduped, 0);
    }

    #[test]
    fn postprocess_dedups_identical_claims() {
        let registry = MetricRegistry::new();
        let result = post_process(vec![draft("revenue", 10.0), draft("revenue", 10.0)], 1, &registry, 50);
        assert_eq!(result.inserts.len(), 1);
        assert_eq!(result.deduped, 1);
        assert_eq!(result.invalid, 0);
    }

    #[test]
    fn postprocess_discards_invalid_confidence() {
        let registry = MetricRegistry::new();
        let mut d = draft("revenue", 10.0);
        d.confidence = 1.5;
        let result = post_process(vec![d], 1, &registry, 50);
        assert!(result.inserts.is_empty());
        assert_eq!(result.invalid, 1);
        assert_eq!(result.deduped, 0);
    }

    #[test]
    fn postprocess_caps_at_max_claims() {
        let registry = MetricRegistry::new();
        let drafts = vec![draft("revenue", 1.0), draft("net_income", 2.0), draft("ebitda", 3.0)];
        let result = post_process(drafts, 1, &registry, 2);
        assert_eq!(result.inserts.len(), 2);
    }
}
