// Lambda handler wrapping `run_pipeline` for scheduled/ad-hoc batch
// invocations, mirroring the teacher's one-binary-per-handler batch jobs.

use std::sync::Arc;

use claim_auditor_extraction::{LlmClient, LlmExtractionAdapter};
use claim_auditor_infrastructure::repository::client::{DatabaseClient, DatabaseConfig};
use claim_auditor_infrastructure::repository::postgrest::{
    PostgrestClaimRepository, PostgrestCompanyRepository, PostgrestFinancialPeriodRepository,
    PostgrestPatternRepository, PostgrestTranscriptRepository, PostgrestVerificationRepository,
};
use claim_auditor_infrastructure::retry::RetryPolicy;
use claim_auditor_infrastructure::source::FmpSource;
use claim_auditor_infrastructure::Config;
use claim_auditor_lambda::utils::init_tracing;
use claim_auditor_pipeline::{Orchestrator, PipelineSummary, Stage, ALL_STAGES};
use claim_auditor_scoring::Thresholds;
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use serde::{Deserialize, Serialize};
use tracing::info;

/// One fiscal period to target, serialized as `{"year": 2024, "quarter": 2}`.
#[derive(Debug, Deserialize)]
struct QuarterSpec {
    year: i32,
    quarter: i32,
}

#[derive(Debug, Deserialize)]
struct Request {
    tickers: Vec<String>,
    #[serde(default)]
    quarters: Vec<QuarterSpec>,
    #[serde(default)]
    steps: Vec<String>,
}

#[derive(Debug, Serialize)]
struct Response {
    ok: bool,
    summary: PipelineSummary,
}

fn parse_stage(raw: &str) -> Result<Stage, Error> {
    match raw {
        "ingest" => Ok(Stage::Ingest),
        "extract" => Ok(Stage::Extract),
        "verify" => Ok(Stage::Verify),
        "analyze" => Ok(Stage::Analyze),
        other => Err(format!("unknown stage '{other}'").into()),
    }
}

async fn function_handler(event: LambdaEvent<Request>) -> Result<Response, Error> {
    let config = Config::from_env()?;
    let request = event.payload;

    let quarters: Vec<(i32, i32)> = request.quarters.iter().map(|q| (q.year, q.quarter)).collect();
    let steps: Vec<Stage> = if request.steps.is_empty() {
        ALL_STAGES.to_vec()
    } else {
        request
            .steps
            .iter()
            .map(|s| parse_stage(s))
            .collect::<Result<_, _>>()?
    };

    let db_client = Arc::new(DatabaseClient::new(DatabaseConfig {
        base_url: config.database_url.clone(),
        api_key: config.database_api_key.clone(),
    }));
    let retry_policy = RetryPolicy {
        max_attempts: config.retry_max_attempts,
        base_delay_ms: config.retry_base_delay_ms,
    };
    let source = Arc::new(FmpSource::new(
        config.fmp_api_key.clone(),
        config.cache_dir.clone(),
        config.transcript_fallback_dir.clone(),
        retry_policy,
    ));
    let extraction = Arc::new(LlmExtractionAdapter::new(LlmClient::new(
        config.extraction_api_key.clone(),
        config.extraction_model.clone(),
    )));
    let thresholds = Thresholds {
        verified_tolerance: config.verification_tolerance,
        approximate_tolerance: config.approximate_tolerance,
        misleading_threshold: config.misleading_threshold,
    };

    let orchestrator = Orchestrator::new(
        Arc::new(PostgrestCompanyRepository::new(db_client.clone())),
        Arc::new(PostgrestTranscriptRepository::new(db_client.clone())),
        Arc::new(PostgrestFinancialPeriodRepository::new(db_client.clone())),
        Arc::new(PostgrestClaimRepository::new(db_client.clone())),
        Arc::new(PostgrestVerificationRepository::new(db_client.clone())),
        Arc::new(PostgrestPatternRepository::new(db_client.clone())),
        source,
        extraction,
        thresholds,
        config.worker_pool_size,
        config.max_claims_per_transcript,
    );

    info!("invoking pipeline for {} ticker(s), steps {:?}", request.tickers.len(), steps);
    let summary = orchestrator.run_pipeline(&request.tickers, &quarters, &steps).await?;

    Ok(Response { ok: true, summary })
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    dotenv::dotenv().ok();
    init_tracing();
    run(service_fn(function_handler)).await
}
