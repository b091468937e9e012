//! Simulated exchange environment
//!
//! Gym-like replay of historical order book snapshots: the clearing house
//! matches orders against resting depth, the ledger tracks balances, and the
//! state machine hands observations, rewards, and termination back to the
//! calling agent.

mod action;
mod clearing;
mod export;
mod ledger;
mod observation;
mod replay;

pub use action::{Action, OrderKind};
pub use clearing::{fill, FillReport, OrderSide};
pub use export::{export_episode, write_series};
pub use ledger::PortfolioLedger;
pub use observation::{FeatureHistory, FeatureTriple, ObservationFrame, LOOKBACK_OFFSETS};
pub use replay::{EpisodeRecord, EpisodeState, ReplayEnvironment, StepInfo, StepResult};
