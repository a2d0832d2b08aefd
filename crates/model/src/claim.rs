use serde::{Deserialize, Serialize};

/// The shape of a quantitative statement, determining how it is verified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    Absolute,
    GrowthRate,
    Margin,
    Ratio,
    Change,
    PerShare,
}

/// The unit the speaker expressed their number in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimUnit {
    Usd,
    UsdMillions,
    UsdBillions,
    Percent,
    BasisPoints,
    Ratio,
    Shares,
}

/// What the stated number is being compared against, if anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonPeriod {
    YearOverYear,
    QuarterOverQuarter,
    Sequential,
    FullYear,
    Custom,
    None,
}

/// An extracted quantitative claim made on an earnings call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claim {
    pub id: Option<i64>,
    pub transcript_id: i64,
    pub speaker: String,
    pub speaker_role: String,
    pub claim_text: String,
    pub metric: String,
    pub metric_kind: MetricKind,
    pub stated_value: f64,
    pub unit: ClaimUnit,
    pub comparison_period: ComparisonPeriod,
    pub is_gaap: bool,
    pub segment: Option<String>,
    pub confidence: f64,
    pub context: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimInsert {
    pub transcript_id: i64,
    pub speaker: String,
    pub speaker_role: String,
    pub claim_text: String,
    pub metric: String,
    pub metric_kind: MetricKind,
    pub stated_value: f64,
    pub unit: ClaimUnit,
    pub comparison_period: ComparisonPeriod,
    pub is_gaap: bool,
    pub segment: Option<String>,
    pub confidence: f64,
    pub context: Option<String>,
}

impl From<Claim> for ClaimInsert {
    fn from(c: Claim) -> Self {
        Self {
            transcript_id: c.transcript_id,
            speaker: c.speaker,
            speaker_role: c.speaker_role,
            claim_text: c.claim_text,
            metric: c.metric,
            metric_kind: c.metric_kind,
            stated_value: c.stated_value,
            unit: c.unit,
            comparison_period: c.comparison_period,
            is_gaap: c.is_gaap,
            segment: c.segment,
            confidence: c.confidence,
            context: c.context,
        }
    }
}
