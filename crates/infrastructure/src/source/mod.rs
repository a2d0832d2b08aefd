//! External source adapter: fetches company profiles, statements, and
//! transcripts from Financial Modeling Prep, with an on-disk cache in
//! front and a local-file transcript fallback behind.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use claim_auditor_core::{Error, Result};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::cache::DiskCache;
use crate::retry::{retry, RetryPolicy, Transient};

#[derive(Debug, Clone, Deserialize)]
pub struct CompanyProfile {
    pub name: String,
    pub sector: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TranscriptPayload {
    pub date: DateTime<Utc>,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatementKind {
    Income,
    CashFlow,
    BalanceSheet,
}

impl StatementKind {
    fn endpoint(self) -> &'static str {
        match self {
            StatementKind::Income => "income-statement",
            StatementKind::CashFlow => "cash-flow-statement",
            StatementKind::BalanceSheet => "balance-sheet-statement",
        }
    }
}

struct HttpFailure {
    status: StatusCode,
    message: String,
}

impl std::fmt::Display for HttpFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "HTTP {}: {}", self.status, self.message)
    }
}

impl Transient for HttpFailure {
    fn is_transient(&self) -> bool {
        self.status.is_server_error() || self.status == StatusCode::TOO_MANY_REQUESTS
    }
}

#[async_trait]
pub trait ExternalSource: Send + Sync {
    async fn profile(&self, ticker: &str) -> Result<Option<CompanyProfile>>;
    async fn transcript(&self, ticker: &str, year: i32, quarter: i32) -> Result<Option<TranscriptPayload>>;
    async fn statements(&self, ticker: &str, kind: StatementKind, limit: u32) -> Result<Vec<Value>>;
}

pub struct FmpSource {
    client: Client,
    api_key: String,
    cache: DiskCache,
    retry_policy: RetryPolicy,
    transcript_fallback_dir: std::path::PathBuf,
}

impl FmpSource {
    pub fn new(
        api_key: String,
        cache_dir: impl Into<std::path::PathBuf>,
        transcript_fallback_dir: impl Into<std::path::PathBuf>,
        retry_policy: RetryPolicy,
    ) -> Self {
        Self {
            client: Client::new(),
            api_key,
            cache: DiskCache::new(cache_dir),
            retry_policy,
            transcript_fallback_dir: transcript_fallback_dir.into(),
        }
    }

    async fn get_cached_json(&self, endpoint: &str, params: &str, url: &str) -> Result<Option<Value>> {
        if let Some(cached) = self.cache.get(endpoint, params) {
            return Ok(Some(serde_json::from_str(&cached)?));
        }

        let client = &self.client;
        let url = url.to_string();
        let result = retry(self.retry_policy, || {
            let client = client.clone();
            let url = url.clone();
            async move {
                let response = client.get(&url).send().await.map_err(|e| HttpFailure {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    message: e.to_string(),
                })?;
                let status = response.status();
                if status.is_success() {
                    let body = response.text().await.map_err(|e| HttpFailure {
                        status: StatusCode::INTERNAL_SERVER_ERROR,
                        message: e.to_string(),
                    })?;
                    Ok(body)
                } else {
                    let message = response.text().await.unwrap_or_default();
                    Err(HttpFailure { status, message })
                }
            }
        })
        .await;

        match result {
            Ok(body) => {
                self.cache.put(endpoint, params, &body)?;
                Ok(Some(serde_json::from_str(&body)?))
            }
            Err(failure) if failure.status.is_client_error() => {
                warn!("permanent failure fetching {endpoint} ({params}): {failure}");
                Ok(None)
            }
            Err(failure) => Err(Error::ApiError("FMP".to_string(), failure.to_string())),
        }
    }

    fn local_transcript_path(&self, ticker: &str, year: i32, quarter: i32) -> std::path::PathBuf {
        self.transcript_fallback_dir
            .join(format!("{}_Q{}_{}.txt", ticker.to_uppercase(), quarter, year))
    }
}

#[async_trait]
impl ExternalSource for FmpSource {
    async fn profile(&self, ticker: &str) -> Result<Option<CompanyProfile>> {
        let url = format!(
            "https://financialmodelingprep.com/api/v3/profile/{ticker}?apikey={}",
            self.api_key
        );
        let params = format!("ticker={ticker}");
        let Some(value) = self.get_cached_json("profile", &params, &url).await? else {
            return Ok(None);
        };
        let entry = value.as_array().and_then(|a| a.first()).cloned().unwrap_or(value);
        let name = entry.get("companyName").and_then(Value::as_str).unwrap_or("").to_string();
        if name.is_empty() {
            return Ok(None);
        }
        let sector = entry.get("sector").and_then(Value::as_str).map(str::to_string);
        Ok(Some(CompanyProfile { name, sector }))
    }

    async fn transcript(&self, ticker: &str, year: i32, quarter: i32) -> Result<Option<TranscriptPayload>> {
        let url = format!(
            "https://financialmodelingprep.com/api/v3/earning_call_transcript/{ticker}?year={year}&quarter={quarter}&apikey={}",
            self.api_key
        );
        let params = format!("ticker={ticker}&year={year}&quarter={quarter}");
        if let Some(value) = self.get_cached_json("transcript", &params, &url).await? {
            let entry = value.as_array().and_then(|a| a.first()).cloned();
            if let Some(entry) = entry {
                let content = entry.get("content").and_then(Value::as_str).unwrap_or("").to_string();
                if !content.is_empty() {
                    let date = entry
                        .get("date")
                        .and_then(Value::as_str)
                        .and_then(|d| DateTime::parse_from_rfc3339(d).ok())
                        .map(|d| d.with_timezone(&Utc))
                        .unwrap_or_else(Utc::now);
                    return Ok(Some(TranscriptPayload { date, content }));
                }
            }
        }

        let fallback_path = self.local_transcript_path(ticker, year, quarter);
        match std::fs::read_to_string(&fallback_path) {
            Ok(content) => {
                info!("using local transcript fallback at {}", fallback_path.display());
                Ok(Some(TranscriptPayload {
                    date: Utc::now(),
                    content,
                }))
            }
            Err(_) => Ok(None),
        }
    }

    async fn statements(&self, ticker: &str, kind: StatementKind, limit: u32) -> Result<Vec<Value>> {
        let url = format!(
            "https://financialmodelingprep.com/api/v3/{}/{ticker}?period=quarter&limit={limit}&apikey={}",
            kind.endpoint(),
            self.api_key
        );
        let params = format!("ticker={ticker}&kind={:?}&limit={limit}", kind);
        let value = self.get_cached_json(kind.endpoint(), &params, &url).await?;
        Ok(value.and_then(|v| v.as_array().cloned()).unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statement_endpoints_are_stable() {
        assert_eq!(StatementKind::Income.endpoint(), "income-statement");
        assert_eq!(StatementKind::CashFlow.endpoint(), "cash-flow-statement");
        assert_eq!(StatementKind::BalanceSheet.endpoint(), "balance-sheet-statement");
    }
}
