//! Scoring configuration for the Acquisition Quality Index
//!
//! This module contains the AQI weight vector and the policy applied to
//! zero-variance metric columns during min-max normalization.

use crate::core::Metric;
use serde::{Deserialize, Serialize};

/// Tolerance used when checking that the weights sum to 1.0
pub const WEIGHT_SUM_TOLERANCE: f64 = 0.001;

/// AQI weights, one per metric
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    /// Weight for the blur (Laplacian variance) factor (0.0-1.0)
    #[serde(default = "default_blur_weight")]
    pub blur: f64,

    /// Weight for the brightness factor (0.0-1.0)
    #[serde(default = "default_brightness_weight")]
    pub brightness: f64,

    /// Weight for the contrast factor (0.0-1.0)
    #[serde(default = "default_contrast_weight")]
    pub contrast: f64,

    /// Weight for the entropy factor (0.0-1.0)
    #[serde(default = "default_entropy_weight")]
    pub entropy: f64,
}

pub fn default_blur_weight() -> f64 {
    0.3
}

pub fn default_brightness_weight() -> f64 {
    0.2
}

pub fn default_contrast_weight() -> f64 {
    0.3
}

pub fn default_entropy_weight() -> f64 {
    0.2
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            blur: default_blur_weight(),
            brightness: default_brightness_weight(),
            contrast: default_contrast_weight(),
            entropy: default_entropy_weight(),
        }
    }
}

impl ScoringWeights {
    pub fn new(blur: f64, brightness: f64, contrast: f64, entropy: f64) -> Self {
        Self {
            blur,
            brightness,
            contrast,
            entropy,
        }
    }

    /// Weights in [`Metric::ALL`] order
    pub fn as_array(&self) -> [f64; 4] {
        [self.blur, self.brightness, self.contrast, self.entropy]
    }

    pub fn weight(&self, metric: Metric) -> f64 {
        self.as_array()[metric.index()]
    }

    pub fn sum(&self) -> f64 {
        self.as_array().iter().sum()
    }

    // Pure function: Check if a weight is in valid range
    pub fn is_valid_weight(weight: f64) -> bool {
        weight.is_finite() && (0.0..=1.0).contains(&weight)
    }

    // Pure function: Validate a single weight with name
    pub fn validate_weight(weight: f64, metric: Metric) -> Result<(), String> {
        if Self::is_valid_weight(weight) {
            Ok(())
        } else {
            Err(format!(
                "{} weight must be between 0.0 and 1.0, got {}",
                metric, weight
            ))
        }
    }

    // Pure function: Validate weights sum to 1.0
    pub fn validate_sum(sum: f64) -> Result<(), String> {
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            Err(format!(
                "AQI weights (blur, brightness, contrast, entropy) must sum to 1.0, but sum to {:.3}",
                sum
            ))
        } else {
            Ok(())
        }
    }

    /// Validate every weight individually, then their sum
    pub fn validate(&self) -> Result<(), String> {
        for metric in Metric::ALL {
            Self::validate_weight(self.weight(metric), metric)?;
        }
        Self::validate_sum(self.sum())
    }

    /// Rescale weights so they sum to exactly 1.0
    pub fn normalize(&mut self) {
        let sum = self.sum();
        if sum > 0.0 && sum != 1.0 {
            self.blur /= sum;
            self.brightness /= sum;
            self.contrast /= sum;
            self.entropy /= sum;
        }
    }
}

/// What to do with a metric column whose min equals its max
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DegeneratePolicy {
    /// Normalize every value of the column to 0.0
    #[default]
    Zero,
    /// Fail the batch with `DegenerateColumn`
    Error,
}

/// Normalization configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizationConfig {
    #[serde(default)]
    pub degenerate_columns: DegeneratePolicy,
}
