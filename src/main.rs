use anyhow::Result;
use aqimap::cli::{Cli, Commands};
use aqimap::commands::{ExtractConfig, InterpretConfig, ScoreConfig};
use aqimap::observability::{init_tracing, install_panic_hook};
use clap::Parser;

fn main() -> Result<()> {
    install_panic_hook();
    let cli = Cli::parse();
    init_tracing(cli.verbosity);

    match cli.command {
        Commands::Extract {
            dir,
            output,
            no_progress,
        } => aqimap::commands::extract_metrics(ExtractConfig {
            dir,
            output,
            show_progress: !no_progress,
            config: cli.config,
        }),
        Commands::Score {
            input,
            output,
            split_dir,
            format,
            report,
            degenerate_columns,
        } => {
            aqimap::commands::score_metrics(ScoreConfig {
                input,
                output,
                split_dir,
                format: format.into(),
                report,
                degenerate_columns: degenerate_columns.map(Into::into),
                config: cli.config,
            })?;
            Ok(())
        }
        Commands::Interpret {
            input,
            cluster_column,
            output_dir,
            outlier_quantile,
        } => aqimap::commands::interpret_clusters(InterpretConfig {
            input,
            cluster_column,
            output_dir,
            outlier_quantile,
            config: cli.config,
        }),
        Commands::Init { force } => aqimap::commands::init_config(force),
    }
}
