//! Common type definitions used across the codebase

use serde::{Deserialize, Serialize};
use std::fmt;

/// Raw acquisition metrics measured for every image, in the engine's canonical order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    /// Laplacian variance (sharpness)
    Blur,
    /// Mean pixel intensity
    Brightness,
    /// Pixel standard deviation
    Contrast,
    /// Shannon entropy in bits
    Entropy,
}

impl Metric {
    /// All metrics in column order `[blur, brightness, contrast, entropy]`
    pub const ALL: [Metric; 4] = [
        Metric::Blur,
        Metric::Brightness,
        Metric::Contrast,
        Metric::Entropy,
    ];

    /// Column name used in CSV tables
    pub fn name(&self) -> &'static str {
        match self {
            Metric::Blur => "blur",
            Metric::Brightness => "brightness",
            Metric::Contrast => "contrast",
            Metric::Entropy => "entropy",
        }
    }

    /// Position of the metric in [`Metric::ALL`]
    pub fn index(&self) -> usize {
        match self {
            Metric::Blur => 0,
            Metric::Brightness => 1,
            Metric::Contrast => 2,
            Metric::Entropy => 3,
        }
    }

    pub fn tag_column(&self) -> String {
        format!("{}_tag", self.name())
    }

    pub fn ambiguity_column(&self) -> String {
        format!("{}_acq_ambiguity", self.name())
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Quartile bucket of a value relative to its batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Tag {
    /// At or below the 25th percentile
    Low,
    /// Strictly between the quartiles
    Normal,
    /// At or above the 75th percentile
    High,
}

impl Tag {
    pub const ALL: [Tag; 3] = [Tag::Low, Tag::Normal, Tag::High];

    /// Label written to CSV tables
    pub fn label(&self) -> &'static str {
        match self {
            Tag::Low => "LOW",
            Tag::Normal => "NORMAL",
            Tag::High => "HIGH",
        }
    }

    /// LOW and HIGH are the out-of-band buckets
    pub fn is_extreme(&self) -> bool {
        matches!(self, Tag::Low | Tag::High)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_order_matches_index() {
        for (i, metric) in Metric::ALL.iter().enumerate() {
            assert_eq!(metric.index(), i);
        }
    }

    #[test]
    fn test_metric_column_names() {
        assert_eq!(Metric::Blur.tag_column(), "blur_tag");
        assert_eq!(Metric::Entropy.ambiguity_column(), "entropy_acq_ambiguity");
    }

    #[test]
    fn test_only_low_and_high_are_extreme() {
        assert!(Tag::Low.is_extreme());
        assert!(Tag::High.is_extreme());
        assert!(!Tag::Normal.is_extreme());
    }
}
