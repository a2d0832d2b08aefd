//! In-memory repository implementations. Used by the pipeline's own test
//! suite and by anyone exercising the orchestrator without a live
//! PostgREST-compatible backend — the Design Notes call for stage
//! functions to take repositories as explicit, mockable dependencies.

use std::sync::Mutex;

use async_trait::async_trait;
use claim_auditor_core::Result;
use claim_auditor_model::{
    Claim, ClaimInsert, Company, CompanyInsert, FinancialPeriod, FinancialPeriodInsert, Pattern, PatternInsert,
    Transcript, TranscriptInsert, Verification, VerificationInsert,
};

use super::{ClaimRepository, CompanyRepository, FinancialPeriodRepository, PatternRepository, TranscriptRepository, VerificationRepository};

#[derive(Default)]
pub struct InMemoryCompanyRepository {
    rows: Mutex<Vec<Company>>,
    next_id: Mutex<i64>,
}

#[async_trait]
impl CompanyRepository for InMemoryCompanyRepository {
    async fn upsert(&self, insert: CompanyInsert) -> Result<Company> {
        let mut rows = self.rows.lock().unwrap();
        if let Some(existing) = rows.iter().find(|c| c.ticker == insert.ticker) {
            return Ok(existing.clone());
        }
        let mut next_id = self.next_id.lock().unwrap();
        *next_id += 1;
        let company = Company {
            id: Some(*next_id),
            ticker: insert.ticker,
            name: insert.name,
            sector: insert.sector,
            created_at: None,
        };
        rows.push(company.clone());
        Ok(company)
    }

    async fn find_by_ticker(&self, ticker: &str) -> Result<Option<Company>> {
        Ok(self.rows.lock().unwrap().iter().find(|c| c.ticker == ticker).cloned())
    }

    async fn list(&self) -> Result<Vec<Company>> {
        Ok(self.rows.lock().unwrap().clone())
    }
}

#[derive(Default)]
pub struct InMemoryTranscriptRepository {
    rows: Mutex<Vec<Transcript>>,
    next_id: Mutex<i64>,
}

#[async_trait]
impl TranscriptRepository for InMemoryTranscriptRepository {
    async fn upsert(&self, insert: TranscriptInsert) -> Result<Transcript> {
        let mut rows = self.rows.lock().unwrap();
        if let Some(existing) = rows.iter().find(|t| {
            t.company_id == insert.company_id
                && t.fiscal_year == insert.fiscal_year
                && t.fiscal_quarter == insert.fiscal_quarter
        }) {
            return Ok(existing.clone());
        }
        let mut next_id = self.next_id.lock().unwrap();
        *next_id += 1;
        let transcript = Transcript {
            id: Some(*next_id),
            company_id: insert.company_id,
            fiscal_year: insert.fiscal_year,
            fiscal_quarter: insert.fiscal_quarter,
            call_date: insert.call_date,
            text: insert.text,
            created_at: None,
        };
        rows.push(transcript.clone());
        Ok(transcript)
    }

    async fn find(&self, company_id: i64, fiscal_year: i32, fiscal_quarter: i32) -> Result<Option<Transcript>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|t| t.company_id == company_id && t.fiscal_year == fiscal_year && t.fiscal_quarter == fiscal_quarter)
            .cloned())
    }

    async fn without_claims(&self, claims: &dyn ClaimRepository) -> Result<Vec<Transcript>> {
        let rows = self.rows.lock().unwrap().clone();
        let mut result = Vec::new();
        for transcript in rows {
            let existing = claims.for_transcript(transcript.id.unwrap_or_default()).await?;
            if existing.is_empty() {
                result.push(transcript);
            }
        }
        Ok(result)
    }
}

#[derive(Default)]
pub struct InMemoryFinancialPeriodRepository {
    rows: Mutex<Vec<FinancialPeriod>>,
    next_id: Mutex<i64>,
}

#[async_trait]
impl FinancialPeriodRepository for InMemoryFinancialPeriodRepository {
    async fn upsert(&self, insert: FinancialPeriodInsert) -> Result<FinancialPeriod> {
        let mut rows = self.rows.lock().unwrap();
        if let Some(existing) = rows.iter().find(|p| {
            p.company_id == insert.company_id
                && p.fiscal_year == insert.fiscal_year
                && p.fiscal_quarter == insert.fiscal_quarter
        }) {
            return Ok(existing.clone());
        }
        let mut next_id = self.next_id.lock().unwrap();
        *next_id += 1;
        let period = FinancialPeriod {
            id: Some(*next_id),
            company_id: insert.company_id,
            fiscal_year: insert.fiscal_year,
            fiscal_quarter: insert.fiscal_quarter,
            revenue: insert.revenue,
            cost_of_revenue: insert.cost_of_revenue,
            gross_profit: insert.gross_profit,
            operating_income: insert.operating_income,
            operating_expenses: insert.operating_expenses,
            net_income: insert.net_income,
            eps_basic: insert.eps_basic,
            eps_diluted: insert.eps_diluted,
            ebitda: insert.ebitda,
            research_and_development: insert.research_and_development,
            selling_general_admin: insert.selling_general_admin,
            interest_expense: insert.interest_expense,
            income_tax_expense: insert.income_tax_expense,
            operating_cash_flow: insert.operating_cash_flow,
            capital_expenditure: insert.capital_expenditure,
            free_cash_flow: insert.free_cash_flow,
            total_assets: insert.total_assets,
            total_liabilities: insert.total_liabilities,
            total_debt: insert.total_debt,
            cash_and_equivalents: insert.cash_and_equivalents,
            shareholders_equity: insert.shareholders_equity,
        };
        rows.push(period.clone());
        Ok(period)
    }

    async fn find(&self, company_id: i64, fiscal_year: i32, fiscal_quarter: i32) -> Result<Option<FinancialPeriod>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.company_id == company_id && p.fiscal_year == fiscal_year && p.fiscal_quarter == fiscal_quarter)
            .cloned())
    }

    async fn list_for_company(&self, company_id: i64) -> Result<Vec<FinancialPeriod>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.company_id == company_id)
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub struct InMemoryClaimRepository {
    rows: Mutex<Vec<Claim>>,
    next_id: Mutex<i64>,
}

#[async_trait]
impl ClaimRepository for InMemoryClaimRepository {
    async fn insert(&self, insert: ClaimInsert) -> Result<Claim> {
        let mut rows = self.rows.lock().unwrap();
        let mut next_id = self.next_id.lock().unwrap();
        *next_id += 1;
        let claim = Claim {
            id: Some(*next_id),
            transcript_id: insert.transcript_id,
            speaker: insert.speaker,
            speaker_role: insert.speaker_role,
            claim_text: insert.claim_text,
            metric: insert.metric,
            metric_kind: insert.metric_kind,
            stated_value: insert.stated_value,
            unit: insert.unit,
            comparison_period: insert.comparison_period,
            is_gaap: insert.is_gaap,
            segment: insert.segment,
            confidence: insert.confidence,
            context: insert.context,
        };
        rows.push(claim.clone());
        Ok(claim)
    }

    async fn for_transcript(&self, transcript_id: i64) -> Result<Vec<Claim>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.transcript_id == transcript_id)
            .cloned()
            .collect())
    }

    async fn all(&self) -> Result<Vec<Claim>> {
        Ok(self.rows.lock().unwrap().clone())
    }
}

#[derive(Default)]
pub struct InMemoryVerificationRepository {
    rows: Mutex<Vec<Verification>>,
    next_id: Mutex<i64>,
}

#[async_trait]
impl VerificationRepository for InMemoryVerificationRepository {
    async fn insert_if_absent(&self, insert: VerificationInsert) -> Result<Option<Verification>> {
        let mut rows = self.rows.lock().unwrap();
        if rows.iter().any(|v| v.claim_id == insert.claim_id) {
            return Ok(None);
        }
        let mut next_id = self.next_id.lock().unwrap();
        *next_id += 1;
        let verification = Verification {
            id: Some(*next_id),
            claim_id: insert.claim_id,
            actual_value: insert.actual_value,
            accuracy_score: insert.accuracy_score,
            verdict: insert.verdict,
            explanation: insert.explanation,
            periods_consulted: insert.periods_consulted,
            flags: insert.flags,
        };
        rows.push(verification.clone());
        Ok(Some(verification))
    }

    async fn find_by_claim(&self, claim_id: i64) -> Result<Option<Verification>> {
        Ok(self.rows.lock().unwrap().iter().find(|v| v.claim_id == claim_id).cloned())
    }

    async fn all(&self) -> Result<Vec<Verification>> {
        Ok(self.rows.lock().unwrap().clone())
    }
}

#[derive(Default)]
pub struct InMemoryPatternRepository {
    rows: Mutex<Vec<Pattern>>,
    next_id: Mutex<i64>,
}

#[async_trait]
impl PatternRepository for InMemoryPatternRepository {
    async fn replace_all(&self, company_id: i64, patterns: Vec<PatternInsert>) -> Result<Vec<Pattern>> {
        let mut rows = self.rows.lock().unwrap();
        rows.retain(|p| p.company_id != company_id);
        let mut next_id = self.next_id.lock().unwrap();
        let mut inserted = Vec::new();
        for insert in patterns {
            *next_id += 1;
            let pattern = Pattern {
                id: Some(*next_id),
                company_id: insert.company_id,
                kind: insert.kind,
                severity: insert.severity,
                description: insert.description,
                affected_quarters: insert.affected_quarters,
                evidence: insert.evidence,
            };
            rows.push(pattern.clone());
            inserted.push(pattern);
        }
        Ok(inserted)
    }

    async fn list_for_company(&self, company_id: i64) -> Result<Vec<Pattern>> {
        Ok(self.rows.lock().unwrap().iter().filter(|p| p.company_id == company_id).cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[tokio::test]
    async fn company_upsert_is_idempotent() {
        let repo = InMemoryCompanyRepository::default();
        let a = repo
            .upsert(CompanyInsert {
                ticker: "AAPL".to_string(),
                name: "Apple".to_string(),
                sector: None,
            })
            .await
            .unwrap();
        let b = repo
            .upsert(CompanyInsert {
                ticker: "AAPL".to_string(),
                name: "Apple Inc. (renamed)".to_string(),
                sector: None,
            })
            .await
            .unwrap();
        assert_eq!(a.id, b.id);
        assert_eq!(b.name, "Apple");
    }

    #[tokio::test]
    async fn transcript_upsert_skips_existing_key() {
        let repo = InMemoryTranscriptRepository::default();
        let insert = TranscriptInsert {
            company_id: 1,
            fiscal_year: 2024,
            fiscal_quarter: 1,
            call_date: Utc::now(),
            text: "hello".to_string(),
        };
        let first = repo.upsert(insert.clone()).await.unwrap();
        let mut second_insert = insert;
        second_insert.text = "goodbye".to_string();
        let second = repo.upsert(second_insert).await.unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(second.text, "hello");
    }

    #[tokio::test]
    async fn verification_insert_if_absent_only_writes_once() {
        let repo = InMemoryVerificationRepository::default();
        let insert = VerificationInsert {
            claim_id: 1,
            actual_value: Some(1.0),
            accuracy_score: Some(1.0),
            verdict: claim_auditor_model::Verdict::Verified,
            explanation: "ok".to_string(),
            periods_consulted: vec![],
            flags: vec![],
        };
        let first = repo.insert_if_absent(insert.clone()).await.unwrap();
        assert!(first.is_some());
        let second = repo.insert_if_absent(insert).await.unwrap();
        assert!(second.is_none());
    }

    #[tokio::test]
    async fn pattern_replace_all_clears_previous_set() {
        let repo = InMemoryPatternRepository::default();
        repo.replace_all(
            1,
            vec![PatternInsert {
                company_id: 1,
                kind: claim_auditor_model::PatternKind::MetricSwitching,
                severity: 0.5,
                description: "first run".to_string(),
                affected_quarters: vec![],
                evidence: vec![],
            }],
        )
        .await
        .unwrap();
        let second = repo.replace_all(1, vec![]).await.unwrap();
        assert!(second.is_empty());
        assert!(repo.list_for_company(1).await.unwrap().is_empty());
    }
}
