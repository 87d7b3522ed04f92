//! Min-max scaling of metric columns.

use crate::config::DegeneratePolicy;
use crate::core::{Metric, MinMax};
use crate::errors::{Error, Result};

/// Rescale one column to [0, 1] with `(x - min) / (max - min)`.
///
/// A zero-variance column maps every value to 0.0 under [`DegeneratePolicy::Zero`]
/// and fails with `DegenerateColumn` under [`DegeneratePolicy::Error`].
pub fn normalize_column(
    metric: Metric,
    values: &[f64],
    bounds: MinMax,
    policy: DegeneratePolicy,
) -> Result<Vec<f64>> {
    if bounds.is_degenerate() {
        return match policy {
            DegeneratePolicy::Zero => {
                tracing::warn!(
                    metric = %metric,
                    value = bounds.min,
                    "zero-variance column, normalizing every value to 0.0"
                );
                Ok(vec![0.0; values.len()])
            }
            DegeneratePolicy::Error => Err(Error::DegenerateColumn { metric }),
        };
    }

    Ok(values.iter().map(|&v| scale(v, bounds)).collect())
}

/// `(v - min) / (max - min)` clamped to [0, 1].
///
/// Columns whose span overflows `f64` are scaled on halved values, which keeps
/// every finite input finite.
fn scale(v: f64, bounds: MinMax) -> f64 {
    let range = bounds.range();
    let scaled = if range.is_finite() {
        (v - bounds.min) / range
    } else {
        (v / 2.0 - bounds.min / 2.0) / (bounds.max / 2.0 - bounds.min / 2.0)
    };
    scaled.clamp(0.0, 1.0)
}

/// Normalize all four metric columns. `columns[i]` holds the values of `Metric::ALL[i]`.
pub fn normalize(
    columns: &[Vec<f64>; 4],
    bounds: &[MinMax; 4],
    policy: DegeneratePolicy,
) -> Result<[Vec<f64>; 4]> {
    let mut out: [Vec<f64>; 4] = Default::default();
    for metric in Metric::ALL {
        let i = metric.index();
        out[i] = normalize_column(metric, &columns[i], bounds[i], policy)?;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_min_max_scaling() {
        let values = [10.0, 20.0, 30.0, 50.0];
        let bounds = MinMax::of(&values).unwrap();
        let scaled =
            normalize_column(Metric::Blur, &values, bounds, DegeneratePolicy::Zero).unwrap();
        assert_eq!(scaled, vec![0.0, 0.25, 0.5, 1.0]);
    }

    #[test]
    fn test_column_spanning_the_f64_range_stays_finite() {
        let values = [-1e308, 1e308, 0.0];
        let bounds = MinMax::of(&values).unwrap();
        assert!(bounds.range().is_infinite());
        let scaled =
            normalize_column(Metric::Brightness, &values, bounds, DegeneratePolicy::Zero).unwrap();
        assert_eq!(scaled, vec![0.0, 1.0, 0.5]);
    }

    #[test]
    fn test_constant_column_zero_fallback() {
        let values = [100.0; 4];
        let bounds = MinMax::of(&values).unwrap();
        let scaled =
            normalize_column(Metric::Brightness, &values, bounds, DegeneratePolicy::Zero).unwrap();
        assert_eq!(scaled, vec![0.0; 4]);
    }

    #[test]
    fn test_constant_column_error_policy() {
        let values = [100.0; 4];
        let bounds = MinMax::of(&values).unwrap();
        let result = normalize_column(Metric::Brightness, &values, bounds, DegeneratePolicy::Error);
        assert!(matches!(
            result,
            Err(Error::DegenerateColumn {
                metric: Metric::Brightness
            })
        ));
    }
}
