//! CSV tables read and written by the pipeline.
//!
//! Column names are part of the external contract: downstream stages select rows
//! by `AQI_tag` and the two flag columns, so headers and flag spelling are fixed.

use crate::core::{Metric, MetricRecord, Tag};
use crate::errors::{Error, Result};
use crate::interpretation::{
    detect_cluster_column, ClusterInterpretation, ClusterRow, ClusterStability, ClusterTable,
    DISTANCE_COLUMN,
};
use crate::scoring::{ScoredBatch, ScoredImage};
use serde::Deserialize;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

/// Column order of the scored table
pub const SCORED_HEADER: [&str; 18] = [
    "image",
    "blur",
    "brightness",
    "contrast",
    "entropy",
    "blur_tag",
    "brightness_tag",
    "contrast_tag",
    "entropy_tag",
    "blur_acq_ambiguity",
    "brightness_acq_ambiguity",
    "contrast_acq_ambiguity",
    "entropy_acq_ambiguity",
    "acquisition_ambiguity",
    "AQI",
    "AQI_tag",
    "high_ambiguity_flag",
    "extreme_and_ambiguous_flag",
];

const IMAGE_COLUMN: &str = "image";

fn flag(value: bool) -> &'static str {
    if value {
        "True"
    } else {
        "False"
    }
}

fn optional(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn open(path: &Path) -> Result<BufReader<File>> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|e| Error::file_system("failed to open table", path, e))
}

fn create(path: &Path) -> Result<BufWriter<File>> {
    super::ensure_parent(path)?;
    File::create(path)
        .map(BufWriter::new)
        .map_err(|e| Error::file_system("failed to create table", path, e))
}

fn require_columns(headers: &csv::StringRecord, required: &[&str]) -> Result<()> {
    let missing: Vec<&str> = required
        .iter()
        .copied()
        .filter(|col| !headers.iter().any(|h| h == *col))
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(Error::Input(format!(
            "table is missing required column(s): {}",
            missing.join(", ")
        )))
    }
}

#[derive(Debug, Deserialize)]
struct RawMetricRow {
    image: String,
    blur: Option<f64>,
    brightness: Option<f64>,
    contrast: Option<f64>,
    entropy: Option<f64>,
}

impl RawMetricRow {
    fn into_record(self) -> Result<MetricRecord> {
        let raw = [self.blur, self.brightness, self.contrast, self.entropy];
        let mut values = [0.0; 4];
        for metric in Metric::ALL {
            values[metric.index()] = raw[metric.index()]
                .ok_or_else(|| Error::invalid_metric(&self.image, metric, "missing value"))?;
        }
        let [blur, brightness, contrast, entropy] = values;
        Ok(MetricRecord::new(self.image, blur, brightness, contrast, entropy))
    }
}

/// Read a raw metrics table. Extra columns are ignored; empty cells are rejected.
pub fn read_metrics<R: Read>(reader: R) -> Result<Vec<MetricRecord>> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut required = vec![IMAGE_COLUMN];
    required.extend(Metric::ALL.iter().map(|m| m.name()));
    require_columns(rdr.headers()?, &required)?;

    rdr.deserialize::<RawMetricRow>()
        .map(|row| row.map_err(Error::from).and_then(RawMetricRow::into_record))
        .collect()
}

pub fn read_metrics_file(path: &Path) -> Result<Vec<MetricRecord>> {
    read_metrics(open(path)?)
}

pub fn write_metrics<W: Write>(writer: W, records: &[MetricRecord]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for record in records {
        wtr.serialize(record)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_metrics_file(path: &Path, records: &[MetricRecord]) -> Result<()> {
    write_metrics(create(path)?, records)
}

fn scored_row(image: &ScoredImage) -> Vec<String> {
    let mut row = Vec::with_capacity(SCORED_HEADER.len());
    row.push(image.image_id().to_string());
    row.extend(image.record.values().iter().map(|v| v.to_string()));
    row.extend(image.tags.iter().map(|t| t.label().to_string()));
    row.extend(image.ambiguities.iter().map(|a| a.to_string()));
    row.push(image.acquisition_ambiguity.to_string());
    row.push(image.aqi.to_string());
    row.push(image.aqi_tag.label().to_string());
    row.push(flag(image.flags.high_ambiguity).to_string());
    row.push(flag(image.flags.extreme_and_ambiguous).to_string());
    row
}

pub fn write_scored<'a, W: Write>(
    writer: W,
    images: impl IntoIterator<Item = &'a ScoredImage>,
) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(SCORED_HEADER)?;
    for image in images {
        wtr.write_record(scored_row(image))?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_scored_file<'a>(
    path: &Path,
    images: impl IntoIterator<Item = &'a ScoredImage>,
) -> Result<()> {
    write_scored(create(path)?, images)
}

/// Row subsets exported next to the scored table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subset {
    LowQuality,
    HighQuality,
    HighAmbiguity,
    ExtremeAndAmbiguous,
}

impl Subset {
    pub const ALL: [Subset; 4] = [
        Subset::LowQuality,
        Subset::HighQuality,
        Subset::HighAmbiguity,
        Subset::ExtremeAndAmbiguous,
    ];

    pub fn file_name(&self) -> &'static str {
        match self {
            Subset::LowQuality => "low_quality_images.csv",
            Subset::HighQuality => "high_quality_images.csv",
            Subset::HighAmbiguity => "high_ambiguity_images.csv",
            Subset::ExtremeAndAmbiguous => "extreme_and_ambiguous_images.csv",
        }
    }

    pub fn contains(&self, image: &ScoredImage) -> bool {
        match self {
            Subset::LowQuality => image.aqi_tag == Tag::Low,
            Subset::HighQuality => image.aqi_tag == Tag::High,
            Subset::HighAmbiguity => image.flags.high_ambiguity,
            Subset::ExtremeAndAmbiguous => image.flags.extreme_and_ambiguous,
        }
    }
}

/// Write the four subset tables into `dir`, returning each path with its row count.
pub fn write_subsets(dir: &Path, batch: &ScoredBatch) -> Result<Vec<(Subset, PathBuf, usize)>> {
    super::ensure_dir(dir)?;
    Subset::ALL
        .iter()
        .map(|&subset| {
            let path = dir.join(subset.file_name());
            let rows: Vec<&ScoredImage> = batch.select(move |img| subset.contains(img)).collect();
            write_scored_file(&path, rows.iter().copied())?;
            Ok((subset, path, rows.len()))
        })
        .collect()
}

fn parse_cluster_id(raw: &str, row: usize) -> Result<i64> {
    if let Ok(id) = raw.parse::<i64>() {
        return Ok(id);
    }
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() && v.fract() == 0.0 => Ok(v as i64),
        _ => Err(Error::Input(format!(
            "row {}: cluster id '{}' is not an integer",
            row + 1,
            raw
        ))),
    }
}

fn parse_distance(raw: &str, row: usize) -> Result<f64> {
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(Error::Input(format!(
            "row {}: {} '{}' is not a finite number",
            row + 1,
            DISTANCE_COLUMN,
            raw
        ))),
    }
}

/// Read a clustering table, detecting the cluster id column unless one is given.
pub fn read_cluster_table<R: Read>(reader: R, cluster_column: Option<&str>) -> Result<ClusterTable> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = rdr.headers()?.iter().map(String::from).collect();
    let cluster_column = detect_cluster_column(&headers, cluster_column)?;
    let position = |name: &str| headers.iter().position(|h| h == name);

    let cluster_idx = position(&cluster_column)
        .ok_or_else(|| Error::Input(format!("cluster column '{}' not found", cluster_column)))?;
    let distance_idx = position(DISTANCE_COLUMN).ok_or_else(|| {
        Error::Input(format!("table is missing required column: {}", DISTANCE_COLUMN))
    })?;
    let image_idx = position(IMAGE_COLUMN);

    let mut rows = Vec::new();
    for (i, record) in rdr.records().enumerate() {
        let record = record?;
        let field = |idx: usize| record.get(idx).unwrap_or("");
        rows.push(ClusterRow {
            image: image_idx.map(|idx| field(idx).to_string()),
            cluster: parse_cluster_id(field(cluster_idx), i)?,
            distance: parse_distance(field(distance_idx), i)?,
            fields: record.iter().map(String::from).collect(),
        });
    }

    Ok(ClusterTable {
        headers,
        cluster_column,
        rows,
    })
}

pub fn read_cluster_table_file(path: &Path, cluster_column: Option<&str>) -> Result<ClusterTable> {
    read_cluster_table(open(path)?, cluster_column)
}

/// Per-cluster statistics, keyed by the clustering table's own cluster column name.
pub fn write_stability<W: Write>(
    writer: W,
    cluster_column: &str,
    stability: &[ClusterStability],
) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record([cluster_column, "mean", "std", "count", "stability_score"])?;
    for s in stability {
        wtr.write_record([
            s.cluster.to_string(),
            s.mean.to_string(),
            optional(s.std),
            s.count.to_string(),
            optional(s.stability_score),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_interpretations<W: Write>(
    writer: W,
    cluster_column: &str,
    interpretations: &[ClusterInterpretation],
) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record([
        cluster_column,
        "mean_distance",
        "std_distance",
        "stability_score",
        "interpretation",
    ])?;
    for i in interpretations {
        wtr.write_record([
            i.cluster.to_string(),
            i.mean_distance.to_string(),
            optional(i.std_distance),
            optional(i.stability_score),
            i.verdict.description().to_string(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Re-export the flagged rows unchanged, with an `ambiguous` column appended.
pub fn write_ambiguous<W: Write>(writer: W, table: &ClusterTable, outliers: &[usize]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    let mut header = table.headers.clone();
    header.push("ambiguous".to_string());
    wtr.write_record(&header)?;
    for row in outliers.iter().filter_map(|&i| table.rows.get(i)) {
        let mut fields = row.fields.clone();
        fields.push(flag(true).to_string());
        wtr.write_record(&fields)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Open a writer for one of the interpretation tables under `dir`.
pub fn create_in(dir: &Path, file_name: &str) -> Result<BufWriter<File>> {
    create(&dir.join(file_name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::{score_batch, EngineConfig};
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_read_metrics_ignores_extra_columns() {
        let csv = indoc! {"
            image,blur,brightness,contrast,entropy,camera
            a.png,10,100,20,5,left
            b.png, 20 ,110,25,6,right
        "};
        let records = read_metrics(csv.as_bytes()).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[1].image_id, "b.png");
        assert_eq!(records[1].blur, 20.0);
    }

    #[test]
    fn test_read_metrics_missing_value_is_invalid_input() {
        let csv = indoc! {"
            image,blur,brightness,contrast,entropy
            a.png,10,,20,5
        "};
        let err = read_metrics(csv.as_bytes()).unwrap_err();
        match err {
            Error::InvalidInput { image, metric, .. } => {
                assert_eq!(image, "a.png");
                assert_eq!(metric, Some(Metric::Brightness));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_read_metrics_missing_column() {
        let csv = "image,blur,brightness,contrast\na.png,1,2,3\n";
        let err = read_metrics(csv.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("entropy"));
    }

    #[test]
    fn test_scored_table_header_and_flags() {
        let records = vec![
            MetricRecord::new("a.png", 10.0, 100.0, 20.0, 5.0),
            MetricRecord::new("b.png", 40.0, 130.0, 50.0, 7.0),
        ];
        let batch = score_batch(records, &EngineConfig::default()).unwrap();

        let mut out = Vec::new();
        write_scored(&mut out, &batch.images).unwrap();
        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();

        assert_eq!(lines.next().unwrap(), SCORED_HEADER.join(","));
        let first: Vec<&str> = lines.next().unwrap().split(',').collect();
        assert_eq!(first.len(), SCORED_HEADER.len());
        assert_eq!(first[0], "a.png");
        assert_eq!(first[14], "0");
        assert_eq!(first[15], "LOW");
        assert!(first[16] == "True" || first[16] == "False");
    }

    #[test]
    fn test_cluster_table_detects_column_and_parses_float_ids() {
        let csv = indoc! {"
            image,kmeans_cluster,cluster_distance
            a.png,0,0.5
            b.png,1.0,1.5
        "};
        let table = read_cluster_table(csv.as_bytes(), None).unwrap();

        assert_eq!(table.cluster_column, "kmeans_cluster");
        assert_eq!(table.rows[1].cluster, 1);
        assert_eq!(table.rows[1].image.as_deref(), Some("b.png"));
    }

    #[test]
    fn test_cluster_table_requires_distance() {
        let csv = "image,cluster\na.png,0\n";
        let err = read_cluster_table(csv.as_bytes(), None).unwrap_err();
        assert!(err.to_string().contains("cluster_distance"));
    }

    #[test]
    fn test_stability_table_leaves_undefined_std_empty() {
        let stability = vec![ClusterStability {
            cluster: 3,
            mean: 2.0,
            std: None,
            count: 1,
            stability_score: None,
        }];
        let mut out = Vec::new();
        write_stability(&mut out, "kmeans_cluster", &stability).unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "kmeans_cluster,mean,std,count,stability_score\n3,2,,1,\n"
        );
    }
}
