use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A covered company, identified by its upper-case ticker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Company {
    pub id: Option<i64>,
    pub ticker: String,
    pub name: String,
    pub sector: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyInsert {
    pub ticker: String,
    pub name: String,
    pub sector: Option<String>,
}

impl Company {
    /// Tickers are always canonicalized to upper case before storage or lookup.
    pub fn canonical_ticker(raw: &str) -> String {
        raw.trim().to_uppercase()
    }
}
