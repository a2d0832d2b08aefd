use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Verified,
    ApproximatelyCorrect,
    Misleading,
    Incorrect,
    Unverifiable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MisleadingFlag {
    GaapNongaapMismatch,
    CherryPickedPeriod,
    SegmentVsTotal,
    RoundingBias,
    MisleadingComparison,
    OmitsContext,
}

/// The verification outcome for exactly one claim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Verification {
    pub id: Option<i64>,
    pub claim_id: i64,
    pub actual_value: Option<f64>,
    pub accuracy_score: Option<f64>,
    pub verdict: Verdict,
    pub explanation: String,
    pub periods_consulted: Vec<i64>,
    pub flags: Vec<MisleadingFlag>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationInsert {
    pub claim_id: i64,
    pub actual_value: Option<f64>,
    pub accuracy_score: Option<f64>,
    pub verdict: Verdict,
    pub explanation: String,
    pub periods_consulted: Vec<i64>,
    pub flags: Vec<MisleadingFlag>,
}

impl From<Verification> for VerificationInsert {
    fn from(v: Verification) -> Self {
        Self {
            claim_id: v.claim_id,
            actual_value: v.actual_value,
            accuracy_score: v.accuracy_score,
            verdict: v.verdict,
            explanation: v.explanation,
            periods_consulted: v.periods_consulted,
            flags: v.flags,
        }
    }
}

impl Verification {
    /// `unverifiable` always means no numeric outcome was computed.
    pub fn is_consistent(&self) -> bool {
        match self.verdict {
            Verdict::Unverifiable => self.actual_value.is_none() && self.accuracy_score.is_none(),
            _ => self.actual_value.is_some() && self.accuracy_score.is_some(),
        }
    }
}
