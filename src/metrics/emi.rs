//! Equated monthly installment

/// Monthly installment for a reducing-balance loan.
///
/// EMI = P * r * (1+r)^n / ((1+r)^n - 1), with r = annual_rate / 12 / 100.
/// A zero rate degenerates to straight-line `principal / tenure_months`.
///
/// `tenure_months` must be at least 1. Zero is not checked and propagates
/// NaN or Infinity. No rounding is applied.
pub fn calculate_emi(principal: f64, annual_rate: f64, tenure_months: u32) -> f64 {
    let n = tenure_months as f64;
    if annual_rate == 0.0 {
        return principal / n;
    }
    let r = monthly_rate(annual_rate);
    let growth = (1.0 + r).powf(n);
    principal * r * growth / (growth - 1.0)
}

/// Annual percent to monthly decimal rate
pub fn monthly_rate(annual_rate: f64) -> f64 {
    annual_rate / 12.0 / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_zero_rate_is_straight_line() {
        for (p, n) in [(120_000.0, 12), (1.0, 7), (5_000_000.0, 360)] {
            assert_relative_eq!(calculate_emi(p, 0.0, n), p / n as f64);
        }
    }

    #[test]
    fn test_known_home_loan_emi() {
        // 25 lakh at 8.5% over 20 years
        let emi = calculate_emi(2_500_000.0, 8.5, 240);
        assert_relative_eq!(emi, 21_695.55, epsilon = 0.5);
    }

    #[test]
    fn test_interest_is_non_negative() {
        for rate in [0.5, 8.5, 9.5, 36.0] {
            for n in [1, 12, 48, 240] {
                let p = 100_000.0;
                assert!(calculate_emi(p, rate, n) * n as f64 >= p);
            }
        }
    }

    #[test]
    fn test_single_month_tenure() {
        // One payment covers principal plus one month of interest
        let emi = calculate_emi(1_000.0, 12.0, 1);
        assert_relative_eq!(emi, 1_010.0, epsilon = 1e-9);
    }

    #[test]
    fn test_zero_tenure_is_not_finite() {
        assert!(!calculate_emi(1_000.0, 0.0, 0).is_finite());
        assert!(!calculate_emi(1_000.0, 10.0, 0).is_finite());
    }
}
