//! Quartile tagging, boundary ambiguity and the derived image flags.

use crate::core::{Quartiles, Tag};
use serde::{Deserialize, Serialize};

/// Bucket a value against its batch quartiles.
///
/// Ties resolve outward: a value equal to Q1 is LOW and a value equal to Q3 is HIGH.
/// When Q1 == Q3 every value is LOW or HIGH, with LOW checked first.
pub fn tag(value: f64, quartiles: Quartiles) -> Tag {
    if value <= quartiles.q1 {
        Tag::Low
    } else if value >= quartiles.q3 {
        Tag::High
    } else {
        Tag::Normal
    }
}

/// Distance of a value from the nearest tag boundary.
///
/// Out-of-band values measure how far past the threshold they are; in-band values
/// measure the closer of the two boundaries. The result is never negative.
pub fn ambiguity(value: f64, quartiles: Quartiles) -> f64 {
    if value < quartiles.q1 {
        quartiles.q1 - value
    } else if value > quartiles.q3 {
        value - quartiles.q3
    } else {
        (value - quartiles.q1).min(quartiles.q3 - value)
    }
}

/// Unweighted mean of the per-metric ambiguities
pub fn mean_ambiguity(per_metric: &[f64; 4]) -> f64 {
    let n = per_metric.len() as f64;
    per_metric.iter().map(|a| a / n).sum()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageFlags {
    /// Overall ambiguity is at or above the batch's ambiguity Q3
    pub high_ambiguity: bool,
    /// The AQI tag is LOW or HIGH and the image is highly ambiguous
    pub extreme_and_ambiguous: bool,
}

pub fn derive_flags(aqi_tag: Tag, acquisition_ambiguity: f64, ambiguity_q3: f64) -> ImageFlags {
    let high_ambiguity = acquisition_ambiguity >= ambiguity_q3;
    ImageFlags {
        high_ambiguity,
        extreme_and_ambiguous: aqi_tag.is_extreme() && high_ambiguity,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q() -> Quartiles {
        Quartiles::new(17.5, 32.5)
    }

    #[test]
    fn test_tag_boundaries_resolve_outward() {
        assert_eq!(tag(17.5, q()), Tag::Low);
        assert_eq!(tag(32.5, q()), Tag::High);
        assert_eq!(tag(17.500001, q()), Tag::Normal);
        assert_eq!(tag(10.0, q()), Tag::Low);
        assert_eq!(tag(40.0, q()), Tag::High);
    }

    #[test]
    fn test_tag_with_collapsed_quartiles() {
        let collapsed = Quartiles::new(5.0, 5.0);
        assert_eq!(tag(5.0, collapsed), Tag::Low);
        assert_eq!(tag(4.0, collapsed), Tag::Low);
        assert_eq!(tag(6.0, collapsed), Tag::High);
    }

    #[test]
    fn test_ambiguity_examples() {
        assert_eq!(ambiguity(10.0, q()), 7.5);
        assert_eq!(ambiguity(25.0, q()), 7.5);
        assert_eq!(ambiguity(40.0, q()), 7.5);
        assert_eq!(ambiguity(20.0, q()), 2.5);
        assert_eq!(ambiguity(17.5, q()), 0.0);
        assert_eq!(ambiguity(32.5, q()), 0.0);
    }

    #[test]
    fn test_mean_ambiguity_is_unweighted() {
        assert_eq!(mean_ambiguity(&[1.0, 2.0, 3.0, 6.0]), 3.0);
    }

    #[test]
    fn test_derive_flags() {
        let flags = derive_flags(Tag::Low, 2.0, 2.0);
        assert!(flags.high_ambiguity);
        assert!(flags.extreme_and_ambiguous);

        let flags = derive_flags(Tag::Normal, 3.0, 2.0);
        assert!(flags.high_ambiguity);
        assert!(!flags.extreme_and_ambiguous);

        let flags = derive_flags(Tag::High, 1.9, 2.0);
        assert!(!flags.high_ambiguity);
        assert!(!flags.extreme_and_ambiguous);
    }
}
