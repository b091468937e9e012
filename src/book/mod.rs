//! Order book snapshot model and ingestion

mod sample;
mod snapshot;
mod store;

pub use sample::{generate_sample_books, write_csv_chunks};
pub use snapshot::{BookSnapshot, PriceLevel};
pub use store::SnapshotStore;
