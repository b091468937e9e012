//! Snapshot store and CSV ingestion
//!
//! Loads a directory of historical order book CSV files into one
//! time-ordered, read-only sequence. Each file carries `Time,Bids,Asks`
//! columns; the depth cells are JSON arrays of `[price, size]` pairs.
//! Malformed rows abort the load, never a running episode.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{debug, info};

use super::snapshot::{BookSnapshot, PriceLevel};
use crate::error::{BourseError, Result};

const REQUIRED_COLUMNS: [&str; 3] = ["Time", "Bids", "Asks"];

/// Raw CSV row before depth cells are decoded
#[derive(Debug, Deserialize)]
struct RawRow {
    #[serde(rename = "Time")]
    time: i64,
    #[serde(rename = "Bids")]
    bids: String,
    #[serde(rename = "Asks")]
    asks: String,
}

/// Ordered, immutable sequence of order book snapshots
///
/// Indexed `0..len()`; the final episode step is fixed at load time.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    snapshots: Vec<BookSnapshot>,
}

impl SnapshotStore {
    /// Load every `*.csv` file under `dir` into one sequence sorted by time.
    ///
    /// Gaps in the time column are permitted and simply become consecutive
    /// indices; filling them is the data-cleaning pipeline's job.
    pub fn load_dir<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();

        let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.extension()
                    .map(|ext| ext.eq_ignore_ascii_case("csv"))
                    .unwrap_or(false)
            })
            .collect();
        // Deterministic concatenation order before the time sort
        files.sort();

        let mut snapshots = Vec::new();
        for path in &files {
            let before = snapshots.len();
            read_file(path, &mut snapshots)?;
            debug!("Loaded {} rows from {}", snapshots.len() - before, path.display());
        }

        if snapshots.is_empty() {
            return Err(BourseError::EmptyStore(dir.display().to_string()));
        }

        snapshots.sort_by_key(|s| s.time());

        info!(
            "Snapshot store ready: {} snapshots from {} files, time {}..{}",
            snapshots.len(),
            files.len(),
            snapshots[0].time(),
            snapshots[snapshots.len() - 1].time(),
        );

        Ok(Self { snapshots })
    }

    /// Build a store from snapshots already in memory (sample data, tests).
    ///
    /// Depth validity is the caller's concern here; file ingestion is the
    /// validated path.
    pub fn from_snapshots(mut snapshots: Vec<BookSnapshot>) -> Result<Self> {
        if snapshots.is_empty() {
            return Err(BourseError::EmptyStore("no snapshots supplied".to_string()));
        }
        snapshots.sort_by_key(|s| s.time());
        Ok(Self { snapshots })
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn get(&self, step: usize) -> Option<&BookSnapshot> {
        self.snapshots.get(step)
    }

    /// Index of the last snapshot; episodes terminate here
    pub fn final_step(&self) -> usize {
        self.snapshots.len() - 1
    }

    pub fn iter(&self) -> impl Iterator<Item = &BookSnapshot> {
        self.snapshots.iter()
    }
}

impl std::ops::Index<usize> for SnapshotStore {
    type Output = BookSnapshot;

    fn index(&self, step: usize) -> &BookSnapshot {
        &self.snapshots[step]
    }
}

fn read_file(path: &Path, out: &mut Vec<BookSnapshot>) -> Result<()> {
    let file = File::open(path)?;
    let mut reader = csv::Reader::from_reader(file);

    let headers = reader.headers()?.clone();
    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == column) {
            return Err(BourseError::MissingColumn {
                file: path.to_path_buf(),
                column,
            });
        }
    }

    for row in reader.deserialize() {
        let row: RawRow = row?;
        let bids = parse_depth(&row.bids).map_err(|reason| BourseError::BadDepth {
            file: path.to_path_buf(),
            time: row.time,
            reason,
        })?;
        let asks = parse_depth(&row.asks).map_err(|reason| BourseError::BadDepth {
            file: path.to_path_buf(),
            time: row.time,
            reason,
        })?;

        if bids.is_empty() {
            return Err(BourseError::EmptyDepth {
                file: path.to_path_buf(),
                time: row.time,
                side: "bid",
            });
        }
        if asks.is_empty() {
            return Err(BourseError::EmptyDepth {
                file: path.to_path_buf(),
                time: row.time,
                side: "ask",
            });
        }

        out.push(BookSnapshot::new(row.time, bids, asks));
    }

    Ok(())
}

/// Decode one depth cell: a JSON array of `[price, size]` pairs.
///
/// Numbers go through their textual form so `101.5` stays exactly `101.5`
/// instead of picking up binary float residue.
fn parse_depth(cell: &str) -> std::result::Result<Vec<PriceLevel>, String> {
    let pairs: Vec<(serde_json::Number, serde_json::Number)> =
        serde_json::from_str(cell).map_err(|e| e.to_string())?;

    pairs
        .into_iter()
        .map(|(price, size)| {
            let price = Decimal::from_str(&price.to_string()).map_err(|e| e.to_string())?;
            let size = Decimal::from_str(&size.to_string()).map_err(|e| e.to_string())?;
            Ok(PriceLevel::new(price, size))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::io::Write;

    fn write_file(dir: &Path, name: &str, contents: &str) {
        let mut file = File::create(dir.join(name)).unwrap();
        write!(file, "{contents}").unwrap();
    }

    #[test]
    fn test_load_concatenates_and_sorts_by_time() {
        let dir = tempfile::tempdir().unwrap();
        write_file(
            dir.path(),
            "b.csv",
            "Time,Bids,Asks\n3,\"[[100.0, 2.0]]\",\"[[101.0, 1.0]]\"\n",
        );
        write_file(
            dir.path(),
            "a.csv",
            "Time,Bids,Asks\n\
             7,\"[[100.5, 2.0]]\",\"[[101.5, 1.0]]\"\n\
             1,\"[[99.0, 2.0]]\",\"[[102.0, 1.0]]\"\n",
        );

        let store = SnapshotStore::load_dir(dir.path()).unwrap();
        assert_eq!(store.len(), 3);
        assert_eq!(store[0].time(), 1);
        assert_eq!(store[1].time(), 3);
        assert_eq!(store[2].time(), 7);
        assert_eq!(store.final_step(), 2);
        assert_eq!(store[1].best_bid().unwrap().price, dec!(100.0));
    }

    #[test]
    fn test_missing_column_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "bad.csv", "Time,Bids\n1,\"[[100.0, 2.0]]\"\n");

        let err = SnapshotStore::load_dir(dir.path()).unwrap_err();
        assert!(matches!(
            err,
            BourseError::MissingColumn { column: "Asks", .. }
        ));
    }

    #[test]
    fn test_unparsable_depth_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        write_file(
            dir.path(),
            "bad.csv",
            "Time,Bids,Asks\n5,not-a-list,\"[[101.0, 1.0]]\"\n",
        );

        let err = SnapshotStore::load_dir(dir.path()).unwrap_err();
        assert!(matches!(err, BourseError::BadDepth { time: 5, .. }));
    }

    #[test]
    fn test_empty_depth_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        write_file(
            dir.path(),
            "bad.csv",
            "Time,Bids,Asks\n5,\"[]\",\"[[101.0, 1.0]]\"\n",
        );

        let err = SnapshotStore::load_dir(dir.path()).unwrap_err();
        assert!(matches!(
            err,
            BourseError::EmptyDepth {
                time: 5,
                side: "bid",
                ..
            }
        ));
    }

    #[test]
    fn test_empty_directory_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let err = SnapshotStore::load_dir(dir.path()).unwrap_err();
        assert!(matches!(err, BourseError::EmptyStore(_)));
    }

    #[test]
    fn test_depth_cell_parsing_is_exact() {
        let levels = parse_depth("[[101.5, 2.0], [103.25, 0.1]]").unwrap();
        assert_eq!(levels[0].price, dec!(101.5));
        assert_eq!(levels[1].price, dec!(103.25));
        assert_eq!(levels[1].size, dec!(0.1));
    }
}
