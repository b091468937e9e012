use bourse::cli::{self, Cli, Commands};
use clap::Parser;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Inspect { data_dir } => {
            init_logging_quiet();
            cli::run_inspect(&data_dir)?;
        }
        Commands::Replay {
            data_dir,
            cash,
            security,
            policy,
            seed,
            export_dir,
            debug,
        } => {
            init_logging();
            cli::run_replay(
                &data_dir,
                cash,
                security,
                policy,
                seed,
                export_dir.as_deref(),
                debug,
            )?;
        }
        Commands::Sample {
            out_dir,
            steps,
            levels,
            volatility,
            rows_per_file,
        } => {
            init_logging_quiet();
            cli::run_sample(&out_dir, steps, levels, volatility, rows_per_file)?;
        }
    }

    Ok(())
}

fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,bourse=debug"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();
}

fn init_logging_quiet() {
    // Minimal logging for plain CLI output
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::WARN)
        .try_init();
}
