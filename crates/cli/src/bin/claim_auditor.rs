// Runs the four-stage claim-verification pipeline from the command line.

use std::sync::Arc;

use clap::Parser;
use claim_auditor_extraction::{LlmClient, LlmExtractionAdapter};
use claim_auditor_infrastructure::repository::client::{DatabaseClient, DatabaseConfig};
use claim_auditor_infrastructure::repository::postgrest::{
    PostgrestClaimRepository, PostgrestCompanyRepository, PostgrestFinancialPeriodRepository,
    PostgrestPatternRepository, PostgrestTranscriptRepository, PostgrestVerificationRepository,
};
use claim_auditor_infrastructure::retry::RetryPolicy;
use claim_auditor_infrastructure::source::FmpSource;
use claim_auditor_infrastructure::Config;
use claim_auditor_pipeline::orchestrator::{Orchestrator, Stage, ALL_STAGES};
use claim_auditor_scoring::Thresholds;
use tracing::info;

/// Target tickers and quarters, and which pipeline stages to run.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Comma-separated tickers, e.g. AAPL,MSFT. Falls back to TARGET_TICKERS.
    #[arg(long, value_delimiter = ',')]
    tickers: Vec<String>,

    /// Comma-separated year:quarter pairs, e.g. 2024:1,2024:2.
    #[arg(long, value_delimiter = ',')]
    quarters: Vec<String>,

    /// Comma-separated stages to run: ingest,extract,verify,analyze. Default: all.
    #[arg(long, value_delimiter = ',')]
    steps: Vec<String>,
}

fn parse_quarter(raw: &str) -> anyhow::Result<(i32, i32)> {
    let (year, quarter) = raw
        .split_once(':')
        .ok_or_else(|| anyhow::anyhow!("expected YEAR:QUARTER, got '{raw}'"))?;
    Ok((year.parse()?, quarter.parse()?))
}

fn parse_stage(raw: &str) -> anyhow::Result<Stage> {
    match raw {
        "ingest" => Ok(Stage::Ingest),
        "extract" => Ok(Stage::Extract),
        "verify" => Ok(Stage::Verify),
        "analyze" => Ok(Stage::Analyze),
        other => Err(anyhow::anyhow!("unknown stage '{other}'")),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    dotenv::dotenv().ok();

    let args = Args::parse();
    let config = Config::from_env()?;

    let tickers = if args.tickers.is_empty() {
        std::env::var("TARGET_TICKERS")
            .unwrap_or_default()
            .split(',')
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    } else {
        args.tickers
    };

    let quarters = args
        .quarters
        .iter()
        .map(|q| parse_quarter(q))
        .collect::<anyhow::Result<Vec<_>>>()?;

    let steps: Vec<Stage> = if args.steps.is_empty() {
        ALL_STAGES.to_vec()
    } else {
        args.steps.iter().map(|s| parse_stage(s)).collect::<anyhow::Result<_>>()?
    };

    let db_config = DatabaseConfig {
        base_url: config.database_url.clone(),
        api_key: config.database_api_key.clone(),
    };
    let db_client = Arc::new(DatabaseClient::new(db_config));

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

    info!("running pipeline for {} ticker(s), steps {:?}", tickers.len(), steps);
    let summary = orchestrator.run_pipeline(&tickers, &quarters, &steps).await?;

    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
