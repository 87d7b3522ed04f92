use serde::{Deserialize, Serialize};

use super::scoring::{DegeneratePolicy, NormalizationConfig, ScoringWeights};
use crate::scoring::EngineConfig;

/// Root configuration structure for aqimap
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct AqimapConfig {
    /// AQI weights
    #[serde(default)]
    pub scoring: Option<ScoringWeights>,

    /// Min-max normalization configuration
    #[serde(default)]
    pub normalization: Option<NormalizationConfig>,

    /// Cluster interpretation thresholds
    #[serde(default)]
    pub interpretation: Option<InterpretationConfig>,

    /// Image discovery configuration
    #[serde(default)]
    pub extraction: Option<ExtractionConfig>,
}

impl AqimapConfig {
    pub fn weights(&self) -> ScoringWeights {
        self.scoring.unwrap_or_default()
    }

    pub fn degenerate_policy(&self) -> DegeneratePolicy {
        self.normalization
            .map(|n| n.degenerate_columns)
            .unwrap_or_default()
    }

    /// Engine configuration passed to [`crate::scoring::score_batch`]
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            weights: self.weights(),
            degenerate_columns: self.degenerate_policy(),
        }
    }

    pub fn interpretation(&self) -> InterpretationConfig {
        self.interpretation.clone().unwrap_or_default()
    }

    pub fn extraction(&self) -> ExtractionConfig {
        self.extraction.clone().unwrap_or_default()
    }
}

/// Thresholds used to turn cluster stability into a verdict
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterpretationConfig {
    /// Stability strictly above this is "highly stable"
    #[serde(default = "default_stable_threshold")]
    pub stable_threshold: f64,

    /// Stability strictly above this (and not highly stable) is "moderately stable"
    #[serde(default = "default_moderate_threshold")]
    pub moderate_threshold: f64,

    /// Quantile of `cluster_distance` above which an image is ambiguous
    #[serde(default = "default_outlier_quantile")]
    pub outlier_quantile: f64,
}

pub fn default_stable_threshold() -> f64 {
    0.7
}

pub fn default_moderate_threshold() -> f64 {
    0.4
}

pub fn default_outlier_quantile() -> f64 {
    0.95
}

impl Default for InterpretationConfig {
    fn default() -> Self {
        Self {
            stable_threshold: default_stable_threshold(),
            moderate_threshold: default_moderate_threshold(),
            outlier_quantile: default_outlier_quantile(),
        }
    }
}

impl InterpretationConfig {
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.outlier_quantile) {
            return Err(format!(
                "outlier_quantile must be between 0.0 and 1.0, got {}",
                self.outlier_quantile
            ));
        }
        if self.moderate_threshold > self.stable_threshold {
            return Err(format!(
                "moderate_threshold ({}) must not exceed stable_threshold ({})",
                self.moderate_threshold, self.stable_threshold
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// File extensions (case-insensitive, without dot) treated as images
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
}

pub fn default_extensions() -> Vec<String> {
    ["png", "jpg", "jpeg", "bmp", "tif", "tiff"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
        }
    }
}

impl ExtractionConfig {
    pub fn accepts_extension(&self, ext: &str) -> bool {
        self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: AqimapConfig = toml::from_str("").unwrap();
        assert_eq!(config, AqimapConfig::default());
        assert_eq!(config.weights(), ScoringWeights::default());
        assert_eq!(config.degenerate_policy(), DegeneratePolicy::Zero);
        assert_eq!(config.interpretation(), InterpretationConfig::default());
    }

    #[test]
    fn test_sections_parse() {
        let config: AqimapConfig = toml::from_str(
            r#"
[scoring]
blur = 0.25
brightness = 0.25
contrast = 0.25
entropy = 0.25

[normalization]
degenerate_columns = "error"

[interpretation]
stable_threshold = 0.8

[extraction]
extensions = ["PNG"]
"#,
        )
        .unwrap();

        assert_eq!(config.weights().as_array(), [0.25; 4]);
        assert_eq!(config.degenerate_policy(), DegeneratePolicy::Error);
        assert_eq!(config.interpretation().stable_threshold, 0.8);
        assert_eq!(config.interpretation().moderate_threshold, 0.4);
        assert!(config.extraction().accepts_extension("png"));
        assert!(!config.extraction().accepts_extension("jpg"));
    }

    #[test]
    fn test_interpretation_validation() {
        let mut config = InterpretationConfig::default();
        assert!(config.validate().is_ok());
        config.moderate_threshold = 0.9;
        assert!(config.validate().is_err());
        config = InterpretationConfig {
            outlier_quantile: 1.5,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
