use crate::core::{Metric, Tag};
use crate::scoring::{BatchStatistics, BatchSummary, ScoredBatch};
use chrono::{DateTime, Utc};
use colored::*;
use comfy_table::{presets::UTF8_FULL, Table};
use serde::{Deserialize, Serialize};
use std::io::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Markdown,
    Terminal,
}

/// Batch-level report rendered after scoring
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub generated_at: DateTime<Utc>,
    pub version: String,
    pub summary: BatchSummary,
    pub statistics: BatchStatistics,
}

impl Report {
    pub fn new(batch: &ScoredBatch) -> Self {
        Self {
            generated_at: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            summary: batch.summary(),
            statistics: batch.stats.clone(),
        }
    }
}

pub trait OutputWriter {
    fn write_report(&mut self, report: &Report) -> anyhow::Result<()>;
}

pub struct JsonWriter<W: Write> {
    writer: W,
}

impl<W: Write> JsonWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write> OutputWriter for JsonWriter<W> {
    fn write_report(&mut self, report: &Report) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(report)?;
        self.writer.write_all(json.as_bytes())?;
        writeln!(self.writer)?;
        self.writer.flush()?;
        Ok(())
    }
}

pub struct MarkdownWriter<W: Write> {
    writer: W,
}

impl<W: Write> MarkdownWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write> OutputWriter for MarkdownWriter<W> {
    fn write_report(&mut self, report: &Report) -> anyhow::Result<()> {
        self.write_header(report)?;
        self.write_summary(&report.summary)?;
        self.write_tag_distribution(&report.summary)?;
        self.write_statistics(&report.statistics)?;
        self.writer.flush()?;
        Ok(())
    }
}

impl<W: Write> MarkdownWriter<W> {
    fn write_header(&mut self, report: &Report) -> anyhow::Result<()> {
        writeln!(self.writer, "# Acquisition Quality Report")?;
        writeln!(self.writer)?;
        writeln!(
            self.writer,
            "Generated: {}",
            report.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
        )?;
        writeln!(self.writer, "Version: {}", report.version)?;
        writeln!(self.writer)?;
        Ok(())
    }

    fn write_summary(&mut self, summary: &BatchSummary) -> anyhow::Result<()> {
        writeln!(self.writer, "## Summary")?;
        writeln!(self.writer)?;
        writeln!(self.writer, "| Metric | Value |")?;
        writeln!(self.writer, "|--------|-------|")?;
        self.write_row("Images", &summary.image_count.to_string())?;
        self.write_row(
            "AQI (min / mean / max)",
            &format!(
                "{:.3} / {:.3} / {:.3}",
                summary.aqi.min, summary.aqi.mean, summary.aqi.max
            ),
        )?;
        self.write_row(
            "Acquisition ambiguity (min / mean / max)",
            &format!(
                "{:.3} / {:.3} / {:.3}",
                summary.ambiguity.min, summary.ambiguity.mean, summary.ambiguity.max
            ),
        )?;
        self.write_row(
            "High ambiguity images",
            &summary.high_ambiguity_count.to_string(),
        )?;
        self.write_row(
            "Extreme and ambiguous images",
            &summary.extreme_and_ambiguous_count.to_string(),
        )?;
        writeln!(self.writer)?;
        Ok(())
    }

    fn write_row(&mut self, metric: &str, value: &str) -> anyhow::Result<()> {
        writeln!(self.writer, "| {metric} | {value} |")?;
        Ok(())
    }

    fn write_tag_distribution(&mut self, summary: &BatchSummary) -> anyhow::Result<()> {
        writeln!(self.writer, "## Tag Distribution")?;
        writeln!(self.writer)?;
        writeln!(self.writer, "| Column | LOW | NORMAL | HIGH |")?;
        writeln!(self.writer, "|--------|-----|--------|------|")?;
        for (metric, counts) in &summary.metric_tags {
            writeln!(
                self.writer,
                "| {} | {} | {} | {} |",
                metric, counts.low, counts.normal, counts.high
            )?;
        }
        let aqi = &summary.aqi_tags;
        writeln!(
            self.writer,
            "| AQI | {} | {} | {} |",
            aqi.low, aqi.normal, aqi.high
        )?;
        writeln!(self.writer)?;
        Ok(())
    }

    fn write_statistics(&mut self, stats: &BatchStatistics) -> anyhow::Result<()> {
        writeln!(self.writer, "## Batch Statistics")?;
        writeln!(self.writer)?;
        writeln!(self.writer, "| Column | Min | Max | Q1 | Q3 |")?;
        writeln!(self.writer, "|--------|-----|-----|----|----|")?;
        for column in &stats.columns {
            writeln!(
                self.writer,
                "| {} | {:.4} | {:.4} | {:.4} | {:.4} |",
                column.metric,
                column.bounds.min,
                column.bounds.max,
                column.quartiles.q1,
                column.quartiles.q3
            )?;
        }
        writeln!(
            self.writer,
            "| AQI | - | - | {:.4} | {:.4} |",
            stats.aqi_quartiles.q1, stats.aqi_quartiles.q3
        )?;
        writeln!(self.writer)?;
        writeln!(
            self.writer,
            "High ambiguity threshold (Q3): {:.4}",
            stats.ambiguity_q3
        )?;
        if !stats.degenerate.is_empty() {
            let names: Vec<&str> = stats.degenerate.iter().map(|m| m.name()).collect();
            writeln!(self.writer)?;
            writeln!(
                self.writer,
                "> Zero-variance columns mapped to 0.0: {}",
                names.join(", ")
            )?;
        }
        Ok(())
    }
}

pub struct TerminalWriter<W: Write> {
    writer: W,
}

impl<W: Write> TerminalWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write> OutputWriter for TerminalWriter<W> {
    fn write_report(&mut self, report: &Report) -> anyhow::Result<()> {
        writeln!(self.writer, "{}", "Acquisition Quality Report".bold().blue())?;
        writeln!(self.writer, "{}", "==========================".blue())?;
        writeln!(self.writer)?;
        self.write_summary(&report.summary)?;
        writeln!(self.writer, "{}", tag_table(&report.summary))?;
        writeln!(self.writer)?;
        writeln!(self.writer, "{}", statistics_table(&report.statistics))?;
        if !report.statistics.degenerate.is_empty() {
            let names: Vec<&str> = report
                .statistics
                .degenerate
                .iter()
                .map(|m| m.name())
                .collect();
            writeln!(
                self.writer,
                "{} zero-variance columns mapped to 0.0: {}",
                "warning:".yellow().bold(),
                names.join(", ")
            )?;
        }
        self.writer.flush()?;
        Ok(())
    }
}

impl<W: Write> TerminalWriter<W> {
    fn write_summary(&mut self, summary: &BatchSummary) -> anyhow::Result<()> {
        writeln!(self.writer, "Summary:")?;
        writeln!(self.writer, "  Images scored: {}", summary.image_count)?;
        writeln!(
            self.writer,
            "  AQI: min {:.3}, mean {:.3}, max {:.3}",
            summary.aqi.min, summary.aqi.mean, summary.aqi.max
        )?;
        writeln!(
            self.writer,
            "  Acquisition ambiguity: mean {:.3}",
            summary.ambiguity.mean
        )?;
        writeln!(
            self.writer,
            "  High ambiguity: {}",
            summary.high_ambiguity_count.to_string().yellow()
        )?;
        writeln!(
            self.writer,
            "  Extreme and ambiguous: {}",
            summary.extreme_and_ambiguous_count.to_string().red()
        )?;
        writeln!(self.writer)?;
        Ok(())
    }
}

fn colored_tag(tag: Tag, count: usize) -> String {
    let text = count.to_string();
    match tag {
        Tag::Low => text.red().to_string(),
        Tag::Normal => text,
        Tag::High => text.green().to_string(),
    }
}

fn tag_table(summary: &BatchSummary) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Column", "LOW", "NORMAL", "HIGH"]);

    let rows = Metric::ALL
        .iter()
        .filter_map(|m| summary.metric_tags.get(m).map(|c| (m.name(), c)))
        .chain(std::iter::once(("AQI", &summary.aqi_tags)));
    for (name, counts) in rows {
        let mut row = vec![name.to_string()];
        row.extend(Tag::ALL.iter().map(|&t| colored_tag(t, counts.get(t))));
        table.add_row(row);
    }
    table
}

fn statistics_table(stats: &BatchStatistics) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Column", "Min", "Max", "Q1", "Q3"]);
    for column in &stats.columns {
        table.add_row(vec![
            column.metric.to_string(),
            format!("{:.4}", column.bounds.min),
            format!("{:.4}", column.bounds.max),
            format!("{:.4}", column.quartiles.q1),
            format!("{:.4}", column.quartiles.q3),
        ]);
    }
    table.add_row(vec![
        "AQI".to_string(),
        "-".to_string(),
        "-".to_string(),
        format!("{:.4}", stats.aqi_quartiles.q1),
        format!("{:.4}", stats.aqi_quartiles.q3),
    ]);
    table
}

pub fn create_writer(format: OutputFormat, writer: Box<dyn Write>) -> Box<dyn OutputWriter> {
    match format {
        OutputFormat::Json => Box::new(JsonWriter::new(writer)),
        OutputFormat::Markdown => Box::new(MarkdownWriter::new(writer)),
        OutputFormat::Terminal => Box::new(TerminalWriter::new(writer)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::MetricRecord;
    use crate::scoring::{score_batch, EngineConfig};

    fn report() -> Report {
        let records = (0..4)
            .map(|i| {
                let v = i as f64;
                MetricRecord::new(format!("img_{i}.png"), v, 100.0 + v, 10.0 * v, 4.0 + v)
            })
            .collect();
        Report::new(&score_batch(records, &EngineConfig::default()).unwrap())
    }

    #[test]
    fn test_json_report_round_trips() {
        let report = report();
        let mut out = Vec::new();
        JsonWriter::new(&mut out).write_report(&report).unwrap();

        let parsed: Report = serde_json::from_slice(&out).unwrap();
        assert_eq!(parsed.summary.image_count, 4);
        assert_eq!(parsed.summary.aqi_tags, report.summary.aqi_tags);
        assert_eq!(parsed.summary.metric_tags[&Metric::Blur].total(), 4);
        assert_eq!(parsed.statistics.degenerate, report.statistics.degenerate);
    }

    #[test]
    fn test_markdown_report_sections() {
        let mut out = Vec::new();
        MarkdownWriter::new(&mut out).write_report(&report()).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.starts_with("# Acquisition Quality Report"));
        assert!(text.contains("## Tag Distribution"));
        assert!(text.contains("| blur |"));
        assert!(text.contains("| AQI |"));
    }

    #[test]
    fn test_terminal_report_contains_tables() {
        colored::control::set_override(false);
        let mut out = Vec::new();
        TerminalWriter::new(&mut out).write_report(&report()).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("Images scored: 4"));
        assert!(text.contains("NORMAL"));
        assert!(text.contains("entropy"));
    }
}
