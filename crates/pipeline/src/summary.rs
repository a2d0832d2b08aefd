use serde::Serialize;

#[derive(Debug, Clone, Default, Serialize)]
pub struct IngestSummary {
    pub ok: bool,
    pub companies_touched: u32,
    pub companies_skipped: u32,
    pub transcripts_fetched: u32,
    pub transcripts_skipped: u32,
    pub periods_fetched: u32,
    pub periods_skipped: u32,
    pub errors: u32,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ExtractSummary {
    pub ok: bool,
    pub transcripts_processed: u32,
    pub claims_extracted: u32,
    pub claims_invalid: u32,
    pub claims_deduped: u32,
    pub errors: u32,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct VerifySummary {
    pub ok: bool,
    pub verified: u32,
    pub approximately_correct: u32,
    pub misleading: u32,
    pub incorrect: u32,
    pub unverifiable: u32,
    pub skipped_existing: u32,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct AnalyzeSummary {
    pub ok: bool,
    pub companies_analyzed: u32,
    pub patterns_found: u32,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PipelineSummary {
    pub ingest: Option<IngestSummary>,
    pub extract: Option<ExtractSummary>,
    pub verify: Option<VerifySummary>,
    pub analyze: Option<AnalyzeSummary>,
}
