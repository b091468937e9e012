pub mod book;
pub mod cli;
pub mod config;
pub mod env;
pub mod error;

pub use book::{generate_sample_books, BookSnapshot, PriceLevel, SnapshotStore};
pub use config::EnvConfig;
pub use env::{
    Action, EpisodeRecord, EpisodeState, FeatureTriple, FillReport, ObservationFrame, OrderKind,
    OrderSide, PortfolioLedger, ReplayEnvironment, StepInfo, StepResult,
};
pub use error::{BourseError, Result};
