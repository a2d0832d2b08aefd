use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternKind {
    ConsistentRoundingUp,
    MetricSwitching,
    IncreasingInaccuracy,
    GaapNongaapShifting,
    SelectiveEmphasis,
}

/// A cross-quarter finding for one company. Patterns are wholesale-replaced
/// per company on every analysis run, never merged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pattern {
    pub id: Option<i64>,
    pub company_id: i64,
    pub kind: PatternKind,
    pub severity: f64,
    pub description: String,
    pub affected_quarters: Vec<String>,
    pub evidence: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternInsert {
    pub company_id: i64,
    pub kind: PatternKind,
    pub severity: f64,
    pub description: String,
    pub affected_quarters: Vec<String>,
    pub evidence: Vec<String>,
}

impl From<Pattern> for PatternInsert {
    fn from(p: Pattern) -> Self {
        Self {
            company_id: p.company_id,
            kind: p.kind,
            severity: p.severity,
            description: p.description,
            affected_quarters: p.affected_quarters,
            evidence: p.evidence,
        }
    }
}
