pub mod orchestrator;
pub mod statement_parsing;
pub mod summary;

pub use orchestrator::{Orchestrator, Stage, ALL_STAGES};
pub use summary::{AnalyzeSummary, ExtractSummary, IngestSummary, PipelineSummary, VerifySummary};
