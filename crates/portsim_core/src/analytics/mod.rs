//! Distributional analytics over simulated portfolio outcomes
//!
//! Everything here works on final returns (`(V_T - V_0) / V_0`) or on the
//! portfolio value paths. Degenerate inputs never raise: a metric with a zero
//! denominator or too few tail observations resolves to a sentinel and a
//! `DegenerateMetric` warning is recorded instead.

mod paths;
mod risk;

pub use paths::{max_drawdown, percentile_bands, summarize_drawdowns};
pub use risk::{compute_risk_metrics, probability_of_profit, target_probabilities, tail_risk};

/// Linear-interpolation percentile of already sorted data.
///
/// `p` is a fraction in `[0, 1]`. Uses rank `p · (n - 1)` and interpolates
/// between the neighbouring order statistics. Empty input yields NaN.
#[must_use]
pub fn percentile(sorted: &[f64], p: f64) -> f64 {
    match sorted.len() {
        0 => f64::NAN,
        1 => sorted[0],
        n => {
            let rank = p.clamp(0.0, 1.0) * (n - 1) as f64;
            let lo = rank.floor() as usize;
            let hi = rank.ceil() as usize;
            let frac = rank - lo as f64;
            sorted[lo] + (sorted[hi] - sorted[lo]) * frac
        }
    }
}

/// Sorted copy of `values`
#[must_use]
pub fn sorted(values: &[f64]) -> Vec<f64> {
    let mut out = values.to_vec();
    out.sort_by(f64::total_cmp);
    out
}

/// Population standard deviation (divisor `n`)
#[must_use]
pub fn population_std(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    (values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentile_interpolates() {
        let data = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(percentile(&data, 0.0), 1.0);
        assert_eq!(percentile(&data, 0.5), 3.0);
        assert_eq!(percentile(&data, 1.0), 5.0);
        // rank 0.1 * 4 = 0.4
        assert!((percentile(&data, 0.1) - 1.4).abs() < 1e-12);
        assert!(percentile(&[], 0.5).is_nan());
        assert_eq!(percentile(&[7.0], 0.05), 7.0);
    }

    #[test]
    fn test_population_std() {
        assert_eq!(population_std(&[]), 0.0);
        assert_eq!(population_std(&[3.0, 3.0]), 0.0);
        assert!((population_std(&[1.0, 3.0]) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_sorted_handles_negative_values() {
        assert_eq!(sorted(&[0.1, -0.3, 0.0]), vec![-0.3, 0.0, 0.1]);
    }
}
