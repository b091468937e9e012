//! Episode export
//!
//! On-demand dump of per-step series from an episode log for offline
//! analysis: one file per quantity, each a single comma-delimited row of
//! floats.

use std::fs::{create_dir_all, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::info;

use super::replay::EpisodeRecord;
use crate::error::Result;

/// Write a slice of floats as one comma-delimited row
pub fn write_series<P: AsRef<Path>>(path: P, values: &[f64]) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    let row: Vec<String> = values.iter().map(|v| v.to_string()).collect();
    writeln!(writer, "{}", row.join(","))?;
    writer.flush()?;
    Ok(())
}

/// Export an episode's per-step top-of-book price (`prices.csv`, best bid)
/// and reward (`rewards.csv`) series under `dir`
pub fn export_episode<P: AsRef<Path>>(dir: P, log: &[EpisodeRecord]) -> Result<()> {
    let dir = dir.as_ref();
    create_dir_all(dir)?;

    let prices: Vec<f64> = log.iter().map(|r| f64::from(r.features.top_bid)).collect();
    let rewards: Vec<f64> = log.iter().map(|r| r.reward).collect();

    write_series(dir.join("prices.csv"), &prices)?;
    write_series(dir.join("rewards.csv"), &rewards)?;

    info!("Exported {} steps to {}", log.len(), dir.display());
    Ok(())
}
