//! Domain types shared by extraction, scoring and reporting.

pub mod types;

pub use types::{Metric, Tag};

use serde::{Deserialize, Serialize};

/// Raw metrics of one image. Created once at ingestion and never mutated.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MetricRecord {
    #[serde(rename = "image")]
    pub image_id: String,
    pub blur: f64,
    pub brightness: f64,
    pub contrast: f64,
    pub entropy: f64,
}

impl MetricRecord {
    pub fn new(
        image_id: impl Into<String>,
        blur: f64,
        brightness: f64,
        contrast: f64,
        entropy: f64,
    ) -> Self {
        Self {
            image_id: image_id.into(),
            blur,
            brightness,
            contrast,
            entropy,
        }
    }

    pub fn value(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Blur => self.blur,
            Metric::Brightness => self.brightness,
            Metric::Contrast => self.contrast,
            Metric::Entropy => self.entropy,
        }
    }

    /// Metric values in [`Metric::ALL`] order
    pub fn values(&self) -> [f64; 4] {
        [self.blur, self.brightness, self.contrast, self.entropy]
    }
}

/// Min-max bounds of one column
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MinMax {
    pub min: f64,
    pub max: f64,
}

impl MinMax {
    /// Bounds of a non-empty slice; `None` when empty
    pub fn of(values: &[f64]) -> Option<Self> {
        let first = *values.first()?;
        Some(values.iter().fold(
            Self {
                min: first,
                max: first,
            },
            |acc, &v| Self {
                min: acc.min.min(v),
                max: acc.max.max(v),
            },
        ))
    }

    pub fn range(&self) -> f64 {
        self.max - self.min
    }

    /// Zero-variance column
    pub fn is_degenerate(&self) -> bool {
        self.range() == 0.0
    }
}

/// 25th and 75th percentile of one column
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Quartiles {
    pub q1: f64,
    pub q3: f64,
}

impl Quartiles {
    pub fn new(q1: f64, q3: f64) -> Self {
        Self { q1, q3 }
    }
}
