//! Sample order book generation
//!
//! Random-walk book series for demos and tests, plus a writer that lays the
//! series out as loader-compatible CSV files.

use std::fs::{create_dir_all, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::str::FromStr;

use rand::Rng;
use rust_decimal::Decimal;
use tracing::info;

use super::snapshot::{BookSnapshot, PriceLevel};
use crate::error::Result;

/// Generate a random-walk book series (simulates a realistic market).
///
/// Mid price follows a mean-reverting walk around the starting value; each
/// snapshot carries `levels` levels per side with randomised sizes. Prices
/// are rounded to cents so they survive a CSV round trip unchanged.
pub fn generate_sample_books(steps: usize, levels: usize, volatility: f64) -> Vec<BookSnapshot> {
    let mut rng = rand::thread_rng();
    let mut books = Vec::with_capacity(steps);
    let volatility = volatility.abs().max(0.01);

    let start = 100.0;
    let mut mid = start;

    for step in 0..steps {
        // Random walk with mean reversion
        let change = rng.gen_range(-volatility..volatility) + 0.001 * (start - mid);
        mid = (mid + change).clamp(start * 0.5, start * 1.5);

        let spread = 0.05 + rng.gen_range(0.0..0.10);
        let tick = 0.05;

        let mut bids = Vec::with_capacity(levels);
        let mut asks = Vec::with_capacity(levels);
        for depth in 0..levels {
            let bid_price = (mid - spread / 2.0 - depth as f64 * tick).max(0.01);
            let ask_price = mid + spread / 2.0 + depth as f64 * tick;
            bids.push(PriceLevel::new(
                cents(bid_price),
                cents(rng.gen_range(0.5..5.0)),
            ));
            asks.push(PriceLevel::new(
                cents(ask_price),
                cents(rng.gen_range(0.5..5.0)),
            ));
        }

        books.push(BookSnapshot::new(step as i64, bids, asks));
    }

    books
}

/// Write a book series as loader-compatible CSV files under `dir`,
/// `rows_per_file` rows apiece.
pub fn write_csv_chunks<P: AsRef<Path>>(
    dir: P,
    books: &[BookSnapshot],
    rows_per_file: usize,
) -> Result<()> {
    let dir = dir.as_ref();
    create_dir_all(dir)?;

    let rows_per_file = rows_per_file.max(1);
    for (index, chunk) in books.chunks(rows_per_file).enumerate() {
        let path = dir.join(format!("books-{index:03}.csv"));
        let mut writer = BufWriter::new(File::create(&path)?);
        writeln!(writer, "Time,Bids,Asks")?;
        for book in chunk {
            writeln!(
                writer,
                "{},\"{}\",\"{}\"",
                book.time(),
                depth_cell(book.bids()),
                depth_cell(book.asks()),
            )?;
        }
        writer.flush()?;
    }

    info!(
        "Wrote {} snapshots to {} ({} rows per file)",
        books.len(),
        dir.display(),
        rows_per_file,
    );
    Ok(())
}

fn depth_cell(levels: &[PriceLevel]) -> String {
    let pairs: Vec<String> = levels
        .iter()
        .map(|l| format!("[{}, {}]", l.price, l.size))
        .collect();
    format!("[{}]", pairs.join(", "))
}

fn cents(value: f64) -> Decimal {
    // Exact two-decimal Decimal via the rounded textual form
    Decimal::from_str(&format!("{value:.2}")).unwrap_or(Decimal::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::book::SnapshotStore;
    use rust_decimal::Decimal;

    #[test]
    fn test_generated_books_are_well_formed() {
        let books = generate_sample_books(50, 4, 0.5);
        assert_eq!(books.len(), 50);

        for book in &books {
            assert_eq!(book.bids().len(), 4);
            assert_eq!(book.asks().len(), 4);
            let bid = book.best_bid().unwrap();
            let ask = book.best_ask().unwrap();
            assert!(bid.price < ask.price);
            assert!(bid.size > Decimal::ZERO);
        }
    }

    #[test]
    fn test_csv_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let books = generate_sample_books(30, 3, 0.5);
        write_csv_chunks(dir.path(), &books, 10).unwrap();

        let store = SnapshotStore::load_dir(dir.path()).unwrap();
        assert_eq!(store.len(), 30);
        for (step, book) in books.iter().enumerate() {
            assert_eq!(&store[step], book);
        }
    }
}
