//! Command line interface
//!
//! Thin wrapper over the library: inspect datasets, replay scripted
//! episodes, and generate sample data.

use clap::{Parser, Subcommand, ValueEnum};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::path::{Path, PathBuf};

use crate::book::{generate_sample_books, write_csv_chunks, SnapshotStore};
use crate::config::EnvConfig;
use crate::env::{export_episode, ReplayEnvironment};
use crate::error::Result;

#[derive(Parser)]
#[command(name = "bourse")]
#[command(version = "0.1.0")]
#[command(about = "Order-book replay environment for evaluating trading agents", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Summarise a directory of order book snapshots
    Inspect {
        /// Directory of snapshot CSV files
        data_dir: PathBuf,
    },
    /// Replay one episode with a scripted policy
    Replay {
        /// Directory of snapshot CSV files
        data_dir: PathBuf,
        /// Starting cash balance
        #[arg(long, default_value = "1000")]
        cash: f64,
        /// Starting security balance
        #[arg(long, default_value = "0")]
        security: f64,
        /// Scripted policy driving the episode
        #[arg(long, value_enum, default_value = "churn")]
        policy: Policy,
        /// Seed for the random policy
        #[arg(long)]
        seed: Option<u64>,
        /// Export per-step price/reward series into this directory
        #[arg(long)]
        export_dir: Option<PathBuf>,
        /// Log per-step diagnostics
        #[arg(long)]
        debug: bool,
    },
    /// Generate sample order book CSVs
    Sample {
        /// Output directory
        out_dir: PathBuf,
        /// Number of snapshots
        #[arg(long, default_value = "600")]
        steps: usize,
        /// Depth levels per side
        #[arg(long, default_value = "5")]
        levels: usize,
        /// Mid-price step volatility
        #[arg(long, default_value = "0.5")]
        volatility: f64,
        /// Rows per CSV file
        #[arg(long, default_value = "250")]
        rows_per_file: usize,
    },
}

/// Scripted replay policies
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Policy {
    /// Hold every step
    Hold,
    /// Uniform random orders
    Random,
    /// Alternate quarter-size buys and sells
    Churn,
}

/// Print a dataset summary
pub fn run_inspect(data_dir: &Path) -> Result<()> {
    let store = SnapshotStore::load_dir(data_dir)?;
    let first = &store[0];
    let last = &store[store.final_step()];

    let mean_imbalance: f64 = store
        .iter()
        .map(|s| s.volume_imbalance().to_f64().unwrap_or(0.0))
        .sum::<f64>()
        / store.len() as f64;

    println!("Snapshots:        {}", store.len());
    println!("Time range:       {} .. {}", first.time(), last.time());
    println!(
        "First top of book: {} / {}",
        first.top_bid_f32(),
        first.top_ask_f32()
    );
    println!(
        "Last top of book:  {} / {}",
        last.top_bid_f32(),
        last.top_ask_f32()
    );
    println!("Mean imbalance:   {mean_imbalance:.4}");

    Ok(())
}

/// Replay one full episode under a scripted policy
pub fn run_replay(
    data_dir: &Path,
    cash: f64,
    security: f64,
    policy: Policy,
    seed: Option<u64>,
    export_dir: Option<&Path>,
    debug: bool,
) -> Result<()> {
    let mut config = EnvConfig::new(
        data_dir,
        Decimal::from_f64_retain(cash).unwrap_or(Decimal::ZERO),
        Decimal::from_f64_retain(security).unwrap_or(Decimal::ZERO),
    );
    config.debug = debug;

    let mut env = ReplayEnvironment::new(config)?;
    env.reset();

    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let mut step = 0usize;
    let mut last = None;
    loop {
        let result = env.step(next_action(policy, step, &mut rng))?;
        step += 1;
        let done = result.done;
        last = Some(result);
        if done {
            break;
        }
    }

    env.render();
    if let Some(result) = last {
        println!("Episode complete: {} steps", result.info.step);
        println!(
            "Final net worth:  {:.4} (high water {:.4})",
            result.info.net_worth, result.info.max_net_worth
        );
        println!("Trades executed:  {}", result.info.num_trades);
    }

    if let Some(dir) = export_dir {
        export_episode(dir, env.historical())?;
        println!("Series exported to {}", dir.display());
    }

    Ok(())
}

/// Generate and write sample snapshot CSVs
pub fn run_sample(
    out_dir: &Path,
    steps: usize,
    levels: usize,
    volatility: f64,
    rows_per_file: usize,
) -> Result<()> {
    // An episode needs at least two snapshots
    let books = generate_sample_books(steps.max(2), levels.max(1), volatility);
    write_csv_chunks(out_dir, &books, rows_per_file)?;
    println!("Wrote {} snapshots to {}", books.len(), out_dir.display());
    Ok(())
}

fn next_action(policy: Policy, step: usize, rng: &mut StdRng) -> (f32, f32) {
    match policy {
        Policy::Hold => (2.0, 0.0),
        Policy::Random => (rng.gen_range(0.0..3.0), rng.gen_range(0.0..1.0)),
        Policy::Churn => {
            if step % 2 == 0 {
                (0.0, 0.25)
            } else {
                (1.0, 0.25)
            }
        }
    }
}
