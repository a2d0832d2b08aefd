//! Generic PostgREST-style HTTP client. The shape — generic insert/upsert/
//! query/update/delete methods, `apikey`/`Authorization` headers, `Prefer`
//! headers controlling representation and conflict resolution — follows
//! this codebase's database client directly; the conflict-resolution
//! header is changed from `merge-duplicates` to `ignore-duplicates` because
//! entities here are write-once and a second Ingest for the same period
//! must be a no-op rather than an overwrite.

use claim_auditor_core::{Error, Result};
use reqwest::Client;
use serde::{de::DeserializeOwned, Serialize};

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub base_url: String,
    pub api_key: String,
}

pub struct DatabaseClient {
    client: Client,
    config: DatabaseConfig,
}

impl DatabaseClient {
    pub fn new(config: DatabaseConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    pub async fn insert<T: Serialize, R: DeserializeOwned>(&self, table: &str, record: &T) -> Result<R> {
        let url = format!("{}/rest/v1/{}", self.config.base_url, table);
        let response = self
            .client
            .post(&url)
            .header("apikey", &self.config.api_key)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .header("Content-Type", "application/json")
            .header("Prefer", "return=representation")
            .json(record)
            .send()
            .await?;
        first_record(response, "insert").await
    }

    /// Insert that silently does nothing when the unique key already
    /// exists, matching the write-once upsert policy for Companies,
    /// Transcripts, and FinancialPeriods.
    pub async fn insert_ignore_duplicates<T: Serialize, R: DeserializeOwned>(
        &self,
        table: &str,
        record: &T,
    ) -> Result<Option<R>> {
        let url = format!("{}/rest/v1/{}", self.config.base_url, table);
        let response = self
            .client
            .post(&url)
            .header("apikey", &self.config.api_key)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .header("Content-Type", "application/json")
            .header("Prefer", "return=representation,resolution=ignore-duplicates")
            .json(record)
            .send()
            .await?;
        if response.status().is_success() {
            let records: Vec<R> = response.json().await?;
            Ok(records.into_iter().next())
        } else {
            let error_text = response.text().await.unwrap_or_default();
            Err(Error::DatabaseError(format!("insert failed: {error_text}")))
        }
    }

    pub async fn query<R: DeserializeOwned>(&self, table: &str, filter: Option<&str>) -> Result<Vec<R>> {
        let mut url = format!("{}/rest/v1/{}", self.config.base_url, table);
        if let Some(filter) = filter {
            url.push('?');
            url.push_str(filter);
        }
        let response = self
            .client
            .get(&url)
            .header("apikey", &self.config.api_key)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .send()
            .await?;
        if response.status().is_success() {
            Ok(response.json().await?)
        } else {
            let error_text = response.text().await.unwrap_or_default();
            Err(Error::DatabaseError(format!("query failed: {error_text}")))
        }
    }

    pub async fn delete(&self, table: &str, filter: &str) -> Result<()> {
        let url = format!("{}/rest/v1/{}?{}", self.config.base_url, table, filter);
        let response = self
            .client
            .delete(&url)
            .header("apikey", &self.config.api_key)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .send()
            .await?;
        if response.status().is_success() {
            Ok(())
        } else {
            let error_text = response.text().await.unwrap_or_default();
            Err(Error::DatabaseError(format!("delete failed: {error_text}")))
        }
    }
}

async fn first_record<R: DeserializeOwned>(response: reqwest::Response, op: &str) -> Result<R> {
    if response.status().is_success() {
        let records: Vec<R> = response.json().await?;
        records
            .into_iter()
            .next()
            .ok_or_else(|| Error::DatabaseError(format!("no record returned after {op}")))
    } else {
        let error_text = response.text().await.unwrap_or_default();
        Err(Error::DatabaseError(format!("{op} failed: {error_text}")))
    }
}
