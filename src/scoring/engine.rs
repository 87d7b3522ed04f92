//! The Quality Scoring Engine.
//!
//! Scoring is strictly two-phase after validation: every global statistic (column
//! bounds, quartiles, AQI quartiles, ambiguity Q3) is reduced over the whole batch
//! and frozen in [`BatchStatistics`] before any per-image value is derived from it.

use super::batch::MetricBatch;
use super::normalize::normalize;
use super::quantile::{compute_quantiles, quantile, Q3};
use super::tagging::{ambiguity, derive_flags, mean_ambiguity, tag, ImageFlags};
use crate::config::{DegeneratePolicy, ScoringWeights};
use crate::core::{Metric, MetricRecord, MinMax, Quartiles, Tag};
use crate::errors::{Error, Result};
use crate::observability::{set_phase, ScoringPhase};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Explicit engine configuration, passed to [`score_batch`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub weights: ScoringWeights,
    pub degenerate_columns: DegeneratePolicy,
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        self.weights.validate().map_err(Error::Configuration)
    }
}

/// Weighted sum of the normalized metrics, clamped to [0, 1].
pub fn compute_aqi(normalized: &[f64; 4], weights: &ScoringWeights) -> f64 {
    normalized
        .iter()
        .zip(weights.as_array())
        .map(|(value, weight)| value * weight)
        .sum::<f64>()
        .clamp(0.0, 1.0)
}

/// Bounds and quartiles of one raw metric column
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColumnStatistics {
    pub metric: Metric,
    pub bounds: MinMax,
    pub quartiles: Quartiles,
}

/// Global statistics of one batch, computed once per run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchStatistics {
    pub columns: [ColumnStatistics; 4],
    pub aqi_quartiles: Quartiles,
    pub ambiguity_q3: f64,
    /// Zero-variance columns that were normalized with the zero fallback
    pub degenerate: Vec<Metric>,
}

impl BatchStatistics {
    pub fn column(&self, metric: Metric) -> &ColumnStatistics {
        &self.columns[metric.index()]
    }

    pub fn quartiles(&self, metric: Metric) -> Quartiles {
        self.column(metric).quartiles
    }
}

/// All derived values for one image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredImage {
    pub record: MetricRecord,
    pub normalized: [f64; 4],
    pub aqi: f64,
    pub tags: [Tag; 4],
    pub ambiguities: [f64; 4],
    pub acquisition_ambiguity: f64,
    pub aqi_tag: Tag,
    pub flags: ImageFlags,
}

impl ScoredImage {
    pub fn image_id(&self) -> &str {
        &self.record.image_id
    }

    pub fn tag(&self, metric: Metric) -> Tag {
        self.tags[metric.index()]
    }

    pub fn ambiguity(&self, metric: Metric) -> f64 {
        self.ambiguities[metric.index()]
    }
}

/// Count of images per tag
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagCounts {
    pub low: usize,
    pub normal: usize,
    pub high: usize,
}

impl TagCounts {
    pub fn from_tags(tags: impl IntoIterator<Item = Tag>) -> Self {
        tags.into_iter().fold(Self::default(), |mut counts, t| {
            match t {
                Tag::Low => counts.low += 1,
                Tag::Normal => counts.normal += 1,
                Tag::High => counts.high += 1,
            }
            counts
        })
    }

    pub fn get(&self, tag: Tag) -> usize {
        match tag {
            Tag::Low => self.low,
            Tag::Normal => self.normal,
            Tag::High => self.high,
        }
    }

    pub fn total(&self) -> usize {
        self.low + self.normal + self.high
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Range {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

impl Range {
    fn of(values: &[f64]) -> Option<Self> {
        let bounds = MinMax::of(values)?;
        Some(Self {
            min: bounds.min,
            max: bounds.max,
            mean: values.iter().sum::<f64>() / values.len() as f64,
        })
    }
}

/// Dataset-level summary of a scored batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub image_count: usize,
    pub aqi: Range,
    pub ambiguity: Range,
    pub metric_tags: BTreeMap<Metric, TagCounts>,
    pub aqi_tags: TagCounts,
    pub high_ambiguity_count: usize,
    pub extreme_and_ambiguous_count: usize,
}

/// Result of scoring one batch. Images keep the input order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredBatch {
    pub images: Vec<ScoredImage>,
    pub stats: BatchStatistics,
}

impl ScoredBatch {
    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Images matching a predicate, in batch order
    pub fn select<'a>(
        &'a self,
        predicate: impl Fn(&ScoredImage) -> bool + 'a,
    ) -> impl Iterator<Item = &'a ScoredImage> + 'a {
        self.images.iter().filter(move |image| predicate(image))
    }

    pub fn summary(&self) -> BatchSummary {
        let aqi: Vec<f64> = self.images.iter().map(|i| i.aqi).collect();
        let ambiguity: Vec<f64> = self
            .images
            .iter()
            .map(|i| i.acquisition_ambiguity)
            .collect();
        let empty = Range {
            min: 0.0,
            max: 0.0,
            mean: 0.0,
        };

        BatchSummary {
            image_count: self.images.len(),
            aqi: Range::of(&aqi).unwrap_or(empty),
            ambiguity: Range::of(&ambiguity).unwrap_or(empty),
            metric_tags: Metric::ALL
                .iter()
                .map(|&m| (m, TagCounts::from_tags(self.images.iter().map(|i| i.tag(m)))))
                .collect(),
            aqi_tags: TagCounts::from_tags(self.images.iter().map(|i| i.aqi_tag)),
            high_ambiguity_count: self.select(|i| i.flags.high_ambiguity).count(),
            extreme_and_ambiguous_count: self.select(|i| i.flags.extreme_and_ambiguous).count(),
        }
    }
}

/// Validate, reduce and derive: the batch entry point of the engine.
pub fn score_batch(records: Vec<MetricRecord>, config: &EngineConfig) -> Result<ScoredBatch> {
    config.validate()?;

    let batch = {
        let _phase = set_phase(ScoringPhase::Validation);
        MetricBatch::new(records)?
    };

    score_validated(batch, config)
}

/// Score a batch that has already passed validation.
pub fn score_validated(batch: MetricBatch, config: &EngineConfig) -> Result<ScoredBatch> {
    config.validate()?;

    let (stats, normalized, aqi, ambiguities) = {
        let _phase = set_phase(ScoringPhase::Statistics);
        reduce_statistics(&batch, config)?
    };

    let _phase = set_phase(ScoringPhase::Derivation);
    let images = batch
        .into_records()
        .into_iter()
        .enumerate()
        .map(|(i, record)| {
            let tags = Metric::ALL.map(|m| tag(record.value(m), stats.quartiles(m)));
            let acquisition_ambiguity = mean_ambiguity(&ambiguities[i]);
            let aqi_tag = tag(aqi[i], stats.aqi_quartiles);

            ScoredImage {
                normalized: normalized[i],
                aqi: aqi[i],
                tags,
                ambiguities: ambiguities[i],
                acquisition_ambiguity,
                aqi_tag,
                flags: derive_flags(aqi_tag, acquisition_ambiguity, stats.ambiguity_q3),
                record,
            }
        })
        .collect::<Vec<_>>();

    tracing::debug!(
        images = images.len(),
        aqi_q1 = stats.aqi_quartiles.q1,
        aqi_q3 = stats.aqi_quartiles.q3,
        ambiguity_q3 = stats.ambiguity_q3,
        "scored batch"
    );

    Ok(ScoredBatch { images, stats })
}

type Reduction = (BatchStatistics, Vec<[f64; 4]>, Vec<f64>, Vec<[f64; 4]>);

fn reduce_statistics(batch: &MetricBatch, config: &EngineConfig) -> Result<Reduction> {
    let columns = batch.columns();

    let mut column_stats = Vec::with_capacity(4);
    for metric in Metric::ALL {
        let values = &columns[metric.index()];
        column_stats.push(ColumnStatistics {
            metric,
            bounds: MinMax::of(values).ok_or(Error::EmptyBatch)?,
            quartiles: compute_quantiles(values).ok_or(Error::EmptyBatch)?,
        });
    }
    let column_stats: [ColumnStatistics; 4] = column_stats
        .try_into()
        .map_err(|_| Error::EmptyBatch)?;

    let bounds = column_stats.map(|c| c.bounds);
    let degenerate: Vec<Metric> = column_stats
        .iter()
        .filter(|c| c.bounds.is_degenerate())
        .map(|c| c.metric)
        .collect();
    let scaled = normalize(&columns, &bounds, config.degenerate_columns)?;

    let normalized: Vec<[f64; 4]> = (0..batch.len())
        .map(|i| Metric::ALL.map(|m| scaled[m.index()][i]))
        .collect();
    let aqi: Vec<f64> = normalized
        .iter()
        .map(|n| compute_aqi(n, &config.weights))
        .collect();
    let aqi_quartiles = compute_quantiles(&aqi).ok_or(Error::EmptyBatch)?;

    let ambiguities: Vec<[f64; 4]> = batch
        .records()
        .iter()
        .map(|r| Metric::ALL.map(|m| ambiguity(r.value(m), column_stats[m.index()].quartiles)))
        .collect();
    let overall: Vec<f64> = ambiguities.iter().map(mean_ambiguity).collect();
    let ambiguity_q3 = quantile(&overall, Q3).ok_or(Error::EmptyBatch)?;

    let stats = BatchStatistics {
        columns: column_stats,
        aqi_quartiles,
        ambiguity_q3,
        degenerate,
    };

    Ok((stats, normalized, aqi, ambiguities))
}
