//! Pure financial-arithmetic primitives. No I/O, no fallible paths beyond
//! `Option` — every function here is a total function of its numeric inputs.

use claim_auditor_model::ClaimUnit;

/// Percentage change from `previous` to `current`. Undefined when
/// `previous` is zero.
pub fn growth_rate(current: f64, previous: f64) -> Option<f64> {
    if previous == 0.0 {
        None
    } else {
        Some(((current - previous) / previous.abs()) * 100.0)
    }
}

/// `numerator / denominator` expressed as a percentage. Undefined when
/// `denominator` is zero.
pub fn margin(numerator: f64, denominator: f64) -> Option<f64> {
    if denominator == 0.0 {
        None
    } else {
        Some((numerator / denominator) * 100.0)
    }
}

/// Converts a raw value in native dollars (or native units, for ratios and
/// share counts) into the unit a claim declared. `basis_points` is treated
/// as hundredths of a percentage point.
pub fn normalize_to_unit(raw: f64, unit: ClaimUnit) -> f64 {
    match unit {
        ClaimUnit::UsdBillions => raw / 1_000_000_000.0,
        ClaimUnit::UsdMillions => raw / 1_000_000.0,
        ClaimUnit::Usd => raw,
        ClaimUnit::BasisPoints => raw / 100.0,
        ClaimUnit::Percent | ClaimUnit::Ratio | ClaimUnit::Shares => raw,
    }
}

/// How close a stated value is to the actual value, in `[0, 1]`. `actual = 0`
/// is a boundary case: a stated value of exactly zero is a perfect match,
/// any other stated value scores zero (division by zero is otherwise
/// undefined).
pub fn accuracy_score(stated: f64, actual: f64) -> f64 {
    if actual == 0.0 {
        return if stated == 0.0 { 1.0 } else { 0.0 };
    }
    (1.0 - (stated - actual).abs() / actual.abs()).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn growth_rate_basic() {
        assert_eq!(growth_rate(110.0, 100.0), Some(10.0));
        assert_eq!(growth_rate(90.0, 100.0), Some(-10.0));
    }

    #[test]
    fn growth_rate_zero_previous_is_undefined() {
        assert_eq!(growth_rate(10.0, 0.0), None);
    }

    #[test]
    fn growth_rate_uses_absolute_previous_for_sign_flips() {
        // previous negative, current positive: still a meaningful percentage move
        assert_eq!(growth_rate(10.0, -10.0), Some(200.0));
    }

    #[test]
    fn margin_basic() {
        assert_eq!(margin(25.0, 100.0), Some(25.0));
    }

    #[test]
    fn margin_zero_denominator_is_undefined() {
        assert_eq!(margin(25.0, 0.0), None);
    }

    #[test]
    fn normalize_units() {
        assert_eq!(normalize_to_unit(2_500_000_000.0, ClaimUnit::UsdBillions), 2.5);
        assert_eq!(normalize_to_unit(2_500_000.0, ClaimUnit::UsdMillions), 2.5);
        assert_eq!(normalize_to_unit(42.0, ClaimUnit::Usd), 42.0);
        assert_eq!(normalize_to_unit(250.0, ClaimUnit::BasisPoints), 2.5);
        assert_eq!(normalize_to_unit(12.5, ClaimUnit::Percent), 12.5);
    }

    #[test]
    fn accuracy_score_exact_match() {
        assert_eq!(accuracy_score(10.0, 10.0), 1.0);
    }

    #[test]
    fn accuracy_score_half_off() {
        assert_eq!(accuracy_score(5.0, 10.0), 0.5);
    }

    #[test]
    fn accuracy_score_clamped_at_zero() {
        assert_eq!(accuracy_score(100.0, 10.0), 0.0);
    }

    #[test]
    fn accuracy_score_zero_actual_zero_stated() {
        assert_eq!(accuracy_score(0.0, 0.0), 1.0);
    }

    #[test]
    fn accuracy_score_zero_actual_nonzero_stated() {
        assert_eq!(accuracy_score(5.0, 0.0), 0.0);
    }
}
