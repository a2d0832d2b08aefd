//! Pure classification rules: turning an accuracy score and a set of
//! misleading flags into a [`Verdict`], and aggregating a company's
//! verification history into a single trust score.

use claim_auditor_model::{MisleadingFlag, Verdict};

/// Tolerances and thresholds the verdict rule is parameterized on. Defaults
/// mirror the configuration surface's documented defaults.
#[derive(Debug, Clone, Copy)]
pub struct Thresholds {
    pub verified_tolerance: f64,
    pub approximate_tolerance: f64,
    pub misleading_threshold: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            verified_tolerance: 0.02,
            approximate_tolerance: 0.10,
            misleading_threshold: 0.25,
        }
    }
}

/// Flags that are substantive enough to upgrade an otherwise-favorable
/// verdict to `misleading`.
fn is_substantive(flag: MisleadingFlag) -> bool {
    matches!(
        flag,
        MisleadingFlag::RoundingBias
            | MisleadingFlag::GaapNongaapMismatch
            | MisleadingFlag::SegmentVsTotal
            | MisleadingFlag::MisleadingComparison
    )
}

/// Assigns a verdict from an accuracy score (absent means unverifiable) and
/// the flags raised during verification.
pub fn assign_verdict(score: Option<f64>, flags: &[MisleadingFlag], thresholds: Thresholds) -> Verdict {
    let Some(score) = score else {
        return Verdict::Unverifiable;
    };

    let base = if score >= 1.0 - thresholds.verified_tolerance {
        Verdict::Verified
    } else if score >= 1.0 - thresholds.approximate_tolerance {
        Verdict::ApproximatelyCorrect
    } else if score >= 1.0 - thresholds.misleading_threshold {
        Verdict::Misleading
    } else {
        Verdict::Incorrect
    };

    let has_substantive_flag = flags.iter().copied().any(is_substantive);
    match base {
        Verdict::Verified | Verdict::ApproximatelyCorrect if has_substantive_flag => Verdict::Misleading,
        other => other,
    }
}

/// Verdict counts for one company, feeding [`trust_score`].
#[derive(Debug, Clone, Copy, Default)]
pub struct VerdictCounts {
    pub verified: u32,
    pub approximately_correct: u32,
    pub misleading: u32,
    pub incorrect: u32,
    pub unverifiable: u32,
}

impl VerdictCounts {
    pub fn record(&mut self, verdict: Verdict) {
        match verdict {
            Verdict::Verified => self.verified += 1,
            Verdict::ApproximatelyCorrect => self.approximately_correct += 1,
            Verdict::Misleading => self.misleading += 1,
            Verdict::Incorrect => self.incorrect += 1,
            Verdict::Unverifiable => self.unverifiable += 1,
        }
    }

    fn verifiable(&self) -> u32 {
        self.verified + self.approximately_correct + self.misleading + self.incorrect
    }
}

/// A company's overall trust score in `[0, 100]`. A company with no
/// verifiable claims at all scores a neutral 50.
pub fn trust_score(counts: VerdictCounts) -> f64 {
    let verifiable = counts.verifiable();
    if verifiable == 0 {
        return 50.0;
    }
    let raw = (1.0 * counts.verified as f64 + 0.7 * counts.approximately_correct as f64
        - 0.3 * counts.misleading as f64
        - 1.0 * counts.incorrect as f64)
        / verifiable as f64;
    ((raw + 1.0) * 50.0).clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verdict_verified_when_within_tolerance() {
        let v = assign_verdict(Some(0.99), &[], Thresholds::default());
        assert_eq!(v, Verdict::Verified);
    }

    #[test]
    fn verdict_unverifiable_when_score_missing() {
        let v = assign_verdict(None, &[], Thresholds::default());
        assert_eq!(v, Verdict::Unverifiable);
    }

    #[test]
    fn verdict_incorrect_below_misleading_threshold() {
        let v = assign_verdict(Some(0.5), &[], Thresholds::default());
        assert_eq!(v, Verdict::Incorrect);
    }

    #[test]
    fn substantive_flag_upgrades_verified_to_misleading() {
        let v = assign_verdict(Some(0.99), &[MisleadingFlag::GaapNongaapMismatch], Thresholds::default());
        assert_eq!(v, Verdict::Misleading);
    }

    #[test]
    fn non_substantive_flag_does_not_upgrade() {
        let v = assign_verdict(Some(0.99), &[MisleadingFlag::OmitsContext], Thresholds::default());
        assert_eq!(v, Verdict::Verified);
    }

    #[test]
    fn trust_score_neutral_with_no_verifiable_claims() {
        assert_eq!(trust_score(VerdictCounts::default()), 50.0);
    }

    #[test]
    fn trust_score_perfect_record() {
        let mut counts = VerdictCounts::default();
        counts.verified = 10;
        assert_eq!(trust_score(counts), 100.0);
    }

    #[test]
    fn trust_score_all_incorrect() {
        let mut counts = VerdictCounts::default();
        counts.incorrect = 10;
        assert_eq!(trust_score(counts), 0.0);
    }
}
