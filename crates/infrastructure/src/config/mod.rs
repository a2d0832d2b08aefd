//! Environment-driven configuration, following the same `from_env` shape
//! used throughout this codebase's API and database configs.

use claim_auditor_core::{Error, Result};

#[derive(Debug, Clone)]
pub struct Config {
    pub fmp_api_key: String,
    pub extraction_api_key: String,
    pub database_url: String,
    pub database_api_key: String,
    pub extraction_model: String,
    pub max_claims_per_transcript: usize,
    pub verification_tolerance: f64,
    pub approximate_tolerance: f64,
    pub misleading_threshold: f64,
    pub retry_max_attempts: u32,
    pub retry_base_delay_ms: u64,
    pub cache_dir: String,
    pub transcript_fallback_dir: String,
    pub worker_pool_size: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            fmp_api_key: require_env("FMP_API_KEY")?,
            extraction_api_key: require_env("EXTRACTION_API_KEY")?,
            database_url: require_env("DATABASE_URL")?,
            database_api_key: require_env("DATABASE_API_KEY")?,
            extraction_model: std::env::var("EXTRACTION_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string()),
            max_claims_per_transcript: parse_env_or("MAX_CLAIMS_PER_TRANSCRIPT", 50),
            verification_tolerance: parse_env_or("VERIFICATION_TOLERANCE", 0.02),
            approximate_tolerance: parse_env_or("APPROXIMATE_TOLERANCE", 0.10),
            misleading_threshold: parse_env_or("MISLEADING_THRESHOLD", 0.25),
            retry_max_attempts: parse_env_or("RETRY_MAX_ATTEMPTS", 5),
            retry_base_delay_ms: parse_env_or("RETRY_BASE_DELAY_MS", 250),
            cache_dir: std::env::var("CACHE_DIR").unwrap_or_else(|_| "./cache".to_string()),
            transcript_fallback_dir: std::env::var("TRANSCRIPT_FALLBACK_DIR")
                .unwrap_or_else(|_| "./transcripts".to_string()),
            worker_pool_size: parse_env_or("WORKER_POOL_SIZE", 4),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| Error::ConfigError(format!("missing required environment variable {key}")))
}

fn parse_env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}
