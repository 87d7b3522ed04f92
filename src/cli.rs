use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "aqimap")]
#[command(about = "Acquisition quality scoring for medical image batches", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Configuration file (defaults to the nearest .aqimap.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Increase verbosity level (can be repeated: -v, -vv, -vvv)
    /// -v: info
    /// -vv: debug
    /// -vvv: trace
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    pub verbosity: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Measure blur, brightness, contrast and entropy for every image in a directory
    Extract {
        /// Directory containing the images (not searched recursively)
        dir: PathBuf,

        /// Metrics table to write
        #[arg(short, long, default_value = "image_metrics.csv")]
        output: PathBuf,

        /// Disable the progress bar
        #[arg(long = "no-progress")]
        no_progress: bool,
    },

    /// Score a metrics table: AQI, quartile tags, ambiguity and flags
    Score {
        /// Metrics table with image, blur, brightness, contrast, entropy columns
        input: PathBuf,

        /// Scored table to write
        #[arg(short, long, default_value = "image_acquisition_metrics.csv")]
        output: PathBuf,

        /// Also write the low/high quality and ambiguity subsets into this directory
        #[arg(long = "split-dir")]
        split_dir: Option<PathBuf>,

        /// Report format
        #[arg(short, long, value_enum, default_value = "terminal")]
        format: OutputFormat,

        /// Report file (defaults to stdout)
        #[arg(long)]
        report: Option<PathBuf>,

        /// Override the zero-variance column policy from the configuration
        #[arg(long = "degenerate-columns", value_enum)]
        degenerate_columns: Option<DegenerateArg>,
    },

    /// Interpret a clustering table: cluster stability and distance outliers
    Interpret {
        /// Clustering table with a cluster id column and cluster_distance
        input: PathBuf,

        /// Cluster id column (detected from common names when omitted)
        #[arg(long = "cluster-column")]
        cluster_column: Option<String>,

        /// Directory for the interpretation tables
        #[arg(short = 'o', long = "output-dir", default_value = ".")]
        output_dir: PathBuf,

        /// Override the distance quantile above which images are ambiguous
        #[arg(long = "outlier-quantile")]
        outlier_quantile: Option<f64>,
    },

    /// Initialize configuration file
    Init {
        /// Force overwrite existing config
        #[arg(short, long)]
        force: bool,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub enum OutputFormat {
    Json,
    Markdown,
    Terminal,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum DegenerateArg {
    /// Map zero-variance columns to 0.0 and warn
    Zero,
    /// Fail the batch
    Error,
}

impl From<OutputFormat> for crate::io::output::OutputFormat {
    fn from(f: OutputFormat) -> Self {
        match f {
            OutputFormat::Json => crate::io::output::OutputFormat::Json,
            OutputFormat::Markdown => crate::io::output::OutputFormat::Markdown,
            OutputFormat::Terminal => crate::io::output::OutputFormat::Terminal,
        }
    }
}

impl From<DegenerateArg> for crate::config::DegeneratePolicy {
    fn from(arg: DegenerateArg) -> Self {
        match arg {
            DegenerateArg::Zero => crate::config::DegeneratePolicy::Zero,
            DegenerateArg::Error => crate::config::DegeneratePolicy::Error,
        }
    }
}
