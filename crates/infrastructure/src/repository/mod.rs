pub mod client;
pub mod in_memory;
pub mod postgrest;

use async_trait::async_trait;
use claim_auditor_core::Result;
use claim_auditor_model::{
    Claim, ClaimInsert, Company, CompanyInsert, FinancialPeriod, FinancialPeriodInsert, Pattern, PatternInsert,
    Transcript, TranscriptInsert, Verification, VerificationInsert,
};

pub use client::{DatabaseClient, DatabaseConfig};

/// Write-once upsert: returns the existing or newly created row. Company is
/// keyed by ticker.
#[async_trait]
pub trait CompanyRepository: Send + Sync {
    async fn upsert(&self, insert: CompanyInsert) -> Result<Company>;
    async fn find_by_ticker(&self, ticker: &str) -> Result<Option<Company>>;
    async fn list(&self) -> Result<Vec<Company>>;
}

/// Write-once upsert keyed by `(company_id, fiscal_year, fiscal_quarter)`.
#[async_trait]
pub trait TranscriptRepository: Send + Sync {
    async fn upsert(&self, insert: TranscriptInsert) -> Result<Transcript>;
    async fn find(&self, company_id: i64, fiscal_year: i32, fiscal_quarter: i32) -> Result<Option<Transcript>>;
    async fn without_claims(&self, claims: &dyn ClaimRepository) -> Result<Vec<Transcript>>;
}

/// Write-once upsert keyed by `(company_id, fiscal_year, fiscal_quarter)`.
#[async_trait]
pub trait FinancialPeriodRepository: Send + Sync {
    async fn upsert(&self, insert: FinancialPeriodInsert) -> Result<FinancialPeriod>;
    async fn find(&self, company_id: i64, fiscal_year: i32, fiscal_quarter: i32) -> Result<Option<FinancialPeriod>>;
    async fn list_for_company(&self, company_id: i64) -> Result<Vec<FinancialPeriod>>;
}

/// Write-once insert (claims are immutable facts about what was said).
#[async_trait]
pub trait ClaimRepository: Send + Sync {
    async fn insert(&self, insert: ClaimInsert) -> Result<Claim>;
    async fn for_transcript(&self, transcript_id: i64) -> Result<Vec<Claim>>;
    async fn all(&self) -> Result<Vec<Claim>>;
}

/// Write-once insert, at most one per claim.
#[async_trait]
pub trait VerificationRepository: Send + Sync {
    async fn insert_if_absent(&self, insert: VerificationInsert) -> Result<Option<Verification>>;
    async fn find_by_claim(&self, claim_id: i64) -> Result<Option<Verification>>;
    async fn all(&self) -> Result<Vec<Verification>>;
}

/// A company's pattern set is replaced wholesale on every analysis run.
#[async_trait]
pub trait PatternRepository: Send + Sync {
    async fn replace_all(&self, company_id: i64, patterns: Vec<PatternInsert>) -> Result<Vec<Pattern>>;
    async fn list_for_company(&self, company_id: i64) -> Result<Vec<Pattern>>;
}
