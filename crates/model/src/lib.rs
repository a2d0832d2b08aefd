pub mod claim;
pub mod company;
pub mod financial_period;
pub mod pattern;
pub mod transcript;
pub mod verification;

pub use claim::{Claim, ClaimInsert, ClaimUnit, ComparisonPeriod, MetricKind};
pub use company::{Company, CompanyInsert};
pub use financial_period::{FinancialPeriod, FinancialPeriodInsert, PeriodKey};
pub use pattern::{Pattern, PatternInsert, PatternKind};
pub use transcript::{Transcript, TranscriptInsert};
pub use verification::{MisleadingFlag, Verdict, Verification, VerificationInsert};
