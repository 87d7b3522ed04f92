//! Batch-relative quantiles.
//!
//! Quantiles use linear interpolation between order statistics: for `n` sorted
//! values and probability `p`, the position is `h = p * (n - 1)` and the result
//! is `s[floor(h)] + (h - floor(h)) * (s[ceil(h)] - s[floor(h)])`. This is the
//! default of the usual dataframe libraries, and tag boundaries depend on it.

use crate::core::Quartiles;

pub const Q1: f64 = 0.25;
pub const Q3: f64 = 0.75;

/// Quantile of already sorted values. `None` when empty or `p` is outside [0, 1].
pub fn quantile_sorted(sorted: &[f64], p: f64) -> Option<f64> {
    if sorted.is_empty() || !(0.0..=1.0).contains(&p) {
        return None;
    }

    let h = p * (sorted.len() - 1) as f64;
    let lo = h.floor() as usize;
    let hi = h.ceil() as usize;
    let fraction = h - lo as f64;

    let (a, b) = (sorted[lo], sorted[hi]);
    let span = b - a;
    if span.is_finite() {
        Some(a + fraction * span)
    } else {
        Some(a * (1.0 - fraction) + b * fraction)
    }
}

/// Finite values of `values`, sorted by IEEE total order
pub fn sorted_finite(values: &[f64]) -> Vec<f64> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    sorted.sort_by(f64::total_cmp);
    sorted
}

/// Quantile over the finite values of an unsorted column
pub fn quantile(values: &[f64], p: f64) -> Option<f64> {
    quantile_sorted(&sorted_finite(values), p)
}

/// Q1 and Q3 of a column, computed from a single sort
pub fn compute_quantiles(values: &[f64]) -> Option<Quartiles> {
    let sorted = sorted_finite(values);
    Some(Quartiles::new(
        quantile_sorted(&sorted, Q1)?,
        quantile_sorted(&sorted, Q3)?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quartiles_of_four_values() {
        let q = compute_quantiles(&[10.0, 20.0, 30.0, 40.0]).unwrap();
        assert_eq!(q.q1, 17.5);
        assert_eq!(q.q3, 32.5);
    }

    #[test]
    fn test_quantile_ignores_input_order() {
        let q = compute_quantiles(&[40.0, 10.0, 30.0, 20.0]).unwrap();
        assert_eq!(q, Quartiles::new(17.5, 32.5));
    }

    #[test]
    fn test_quantile_exact_order_statistic() {
        // n = 5 puts Q1 and Q3 exactly on elements 1 and 3
        let q = compute_quantiles(&[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        assert_eq!(q, Quartiles::new(2.0, 4.0));
    }

    #[test]
    fn test_single_value_quantiles_collapse() {
        let q = compute_quantiles(&[7.0]).unwrap();
        assert_eq!(q, Quartiles::new(7.0, 7.0));
    }

    #[test]
    fn test_quantile_extremes() {
        let values = [3.0, 1.0, 2.0];
        assert_eq!(quantile(&values, 0.0), Some(1.0));
        assert_eq!(quantile(&values, 1.0), Some(3.0));
        assert_eq!(quantile(&values, 0.5), Some(2.0));
    }

    #[test]
    fn test_quantile_between_opposite_extremes() {
        let values = [-1e308, 1e308];
        assert_eq!(quantile(&values, 0.5), Some(0.0));
        assert_eq!(quantile(&values, 0.75), Some(5e307));
    }

    #[test]
    fn test_quantile_skips_non_finite() {
        let values = [1.0, f64::NAN, 3.0, f64::INFINITY];
        assert_eq!(quantile(&values, 0.5), Some(2.0));
    }

    #[test]
    fn test_quantile_rejects_empty_and_bad_probability() {
        assert_eq!(quantile(&[], 0.5), None);
        assert_eq!(quantile(&[1.0], 1.5), None);
        assert!(compute_quantiles(&[f64::NAN]).is_none());
    }
}
