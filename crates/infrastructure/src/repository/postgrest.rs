//! PostgREST-backed repository implementations, built on [`DatabaseClient`].
//! Each repository maps one entity onto one table, using the write-once
//! `insert_ignore_duplicates` for entities with a natural unique key and
//! plain `insert`/`query`/`delete` otherwise.

use std::sync::Arc;

use async_trait::async_trait;
use claim_auditor_core::Result;
use claim_auditor_model::{
    Claim, ClaimInsert, Company, CompanyInsert, FinancialPeriod, FinancialPeriodInsert, Pattern, PatternInsert,
    Transcript, TranscriptInsert, Verification, VerificationInsert,
};

use super::{
    ClaimRepository, CompanyRepository, DatabaseClient, FinancialPeriodRepository, PatternRepository,
    TranscriptRepository, VerificationRepository,
};

pub struct PostgrestCompanyRepository {
    client: Arc<DatabaseClient>,
}

impl PostgrestCompanyRepository {
    pub fn new(client: Arc<DatabaseClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl CompanyRepository for PostgrestCompanyRepository {
    async fn upsert(&self, insert: CompanyInsert) -> Result<Company> {
        if let Some(existing) = self.find_by_ticker(&insert.ticker).await? {
            return Ok(existing);
        }
        let inserted: Option<Company> = self.client.insert_ignore_duplicates("companies", &insert).await?;
        match inserted {
            Some(company) => Ok(company),
            None => self
                .find_by_ticker(&insert.ticker)
                .await?
                .ok_or_else(|| claim_auditor_core::Error::DatabaseError("company vanished after insert race".into())),
        }
    }

    async fn find_by_ticker(&self, ticker: &str) -> Result<Option<Company>> {
        let rows: Vec<Company> = self
            .client
            .query("companies", Some(&format!("ticker=eq.{ticker}")))
            .await?;
        Ok(rows.into_iter().next())
    }

    async fn list(&self) -> Result<Vec<Company>> {
        self.client.query("companies", None).await
    }
}

pub struct PostgrestTranscriptRepository {
    client: Arc<DatabaseClient>,
}

impl PostgrestTranscriptRepository {
    pub fn new(client: Arc<DatabaseClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl TranscriptRepository for PostgrestTranscriptRepository {
    async fn upsert(&self, insert: TranscriptInsert) -> Result<Transcript> {
        if let Some(existing) = self
            .find(insert.company_id, insert.fiscal_year, insert.fiscal_quarter)
            .await?
        {
            return Ok(existing);
        }
        let inserted: Option<Transcript> = self.client.insert_ignore_duplicates("transcripts", &insert).await?;
        match inserted {
            Some(t) => Ok(t),
            None => self
                .find(insert.company_id, insert.fiscal_year, insert.fiscal_quarter)
                .await?
                .ok_or_else(|| claim_auditor_core::Error::DatabaseError("transcript vanished after insert race".into())),
        }
    }

    async fn find(&self, company_id: i64, fiscal_year: i32, fiscal_quarter: i32) -> Result<Option<Transcript>> {
        let filter = format!(
            "company_id=eq.{company_id}&fiscal_year=eq.{fiscal_year}&fiscal_quarter=eq.{fiscal_quarter}"
        );
        let rows: Vec<Transcript> = self.client.query("transcripts", Some(&filter)).await?;
        Ok(rows.into_iter().next())
    }

    async fn without_claims(&self, claims: &dyn ClaimRepository) -> Result<Vec<Transcript>> {
        let all: Vec<Transcript> = self.client.query("transcripts", None).await?;
        let mut result = Vec::new();
        for transcript in all {
            let existing = claims.for_transcript(transcript.id.unwrap_or_default()).await?;
            if existing.is_empty() {
                result.push(transcript);
            }
        }
        Ok(result)
    }
}

pub struct PostgrestFinancialPeriodRepository {
    client: Arc<DatabaseClient>,
}

impl PostgrestFinancialPeriodRepository {
    pub fn new(client: Arc<DatabaseClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl FinancialPeriodRepository for PostgrestFinancialPeriodRepository {
    async fn upsert(&self, insert: FinancialPeriodInsert) -> Result<FinancialPeriod> {
        if let Some(existing) = self
            .find(insert.company_id, insert.fiscal_year, insert.fiscal_quarter)
            .await?
        {
            return Ok(existing);
        }
        let inserted: Option<FinancialPeriod> =
            self.client.insert_ignore_duplicates("financial_periods", &insert).await?;
        match inserted {
            Some(p) => Ok(p),
            None => self
                .find(insert.company_id, insert.fiscal_year, insert.fiscal_quarter)
                .await?
                .ok_or_else(|| claim_auditor_core::Error::DatabaseError("period vanished after insert race".into())),
        }
    }

    async fn find(&self, company_id: i64, fiscal_year: i32, fiscal_quarter: i32) -> Result<Option<FinancialPeriod>> {
        let filter = format!(
            "company_id=eq.{company_id}&fiscal_year=eq.{fiscal_year}&fiscal_quarter=eq.{fiscal_quarter}"
        );
        let rows: Vec<FinancialPeriod> = self.client.query("financial_periods", Some(&filter)).await?;
        Ok(rows.into_iter().next())
    }

    async fn list_for_company(&self, company_id: i64) -> Result<Vec<FinancialPeriod>> {
        self.client
            .query("financial_periods", Some(&format!("company_id=eq.{company_id}")))
            .await
    }
}

pub struct PostgrestClaimRepository {
    client: Arc<DatabaseClient>,
}

impl PostgrestClaimRepository {
    pub fn new(client: Arc<DatabaseClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ClaimRepository for PostgrestClaimRepository {
    async fn insert(&self, insert: ClaimInsert) -> Result<Claim> {
        self.client.insert("claims", &insert).await
    }

    async fn for_transcript(&self, transcript_id: i64) -> Result<Vec<Claim>> {
        self.client
            .query("claims", Some(&format!("transcript_id=eq.{transcript_id}")))
            .await
    }

    async fn all(&self) -> Result<Vec<Claim>> {
        self.client.query("claims", None).await
    }
}

pub struct PostgrestVerificationRepository {
    client: Arc<DatabaseClient>,
}

impl PostgrestVerificationRepository {
    pub fn new(client: Arc<DatabaseClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl VerificationRepository for PostgrestVerificationRepository {
    async fn insert_if_absent(&self, insert: VerificationInsert) -> Result<Option<Verification>> {
        if self.find_by_claim(insert.claim_id).await?.is_some() {
            return Ok(None);
        }
        self.client.insert_ignore_duplicates("verifications", &insert).await
    }

    async fn find_by_claim(&self, claim_id: i64) -> Result<Option<Verification>> {
        let rows: Vec<Verification> = self
            .client
            .query("verifications", Some(&format!("claim_id=eq.{claim_id}")))
            .await?;
        Ok(rows.into_iter().next())
    }

    async fn all(&self) -> Result<Vec<Verification>> {
        self.client.query("verifications", None).await
    }
}

pub struct PostgrestPatternRepository {
    client: Arc<DatabaseClient>,
}

impl PostgrestPatternRepository {
    pub fn new(client: Arc<DatabaseClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PatternRepository for PostgrestPatternRepository {
    /// Best-effort atomicity: PostgREST gives no cross-request transaction,
    /// so this is a delete followed by an insert. A crash between the two
    /// leaves the company with zero patterns until the next Analyze run,
    /// never with a mixed old/new set.
    async fn replace_all(&self, company_id: i64, patterns: Vec<PatternInsert>) -> Result<Vec<Pattern>> {
        self.client
            .delete("patterns", &format!("company_id=eq.{company_id}"))
            .await?;
        let mut inserted = Vec::with_capacity(patterns.len());
        for pattern in patterns {
            inserted.push(self.client.insert("patterns", &pattern).await?);
        }
        Ok(inserted)
    }

    async fn list_for_company(&self, company_id: i64) -> Result<Vec<Pattern>> {
        self.client
            .query("patterns", Some(&format!("company_id=eq.{company_id}")))
            .await
    }
}
