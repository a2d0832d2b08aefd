use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One earnings call transcript for a (company, fiscal year, fiscal quarter).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcript {
    pub id: Option<i64>,
    pub company_id: i64,
    pub fiscal_year: i32,
    pub fiscal_quarter: i32,
    pub call_date: DateTime<Utc>,
    pub text: String,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptInsert {
    pub company_id: i64,
    pub fiscal_year: i32,
    pub fiscal_quarter: i32,
    pub call_date: DateTime<Utc>,
    pub text: String,
}

impl Transcript {
    pub fn quarter_label(&self) -> String {
        format!("Q{} {}", self.fiscal_quarter, self.fiscal_year)
    }
}
