//! Observation builder
//!
//! Derives a compact feature triple per time step and assembles a fixed
//! multi-horizon frame from an append-only history addressed by absolute
//! step index. Offsets that reach before the start of history pad with zero
//! rows rather than shifting the window.

use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use crate::book::BookSnapshot;

/// Lookback offsets of the observation frame, in steps
pub const LOOKBACK_OFFSETS: [usize; 4] = [0, 1, 10, 100];

/// Per-step top-of-book features
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureTriple {
    pub top_bid: f32,
    pub top_ask: f32,
    pub imbalance: f32,
}

impl FeatureTriple {
    /// Derive the triple for one snapshot
    pub fn from_snapshot(snapshot: &BookSnapshot) -> Self {
        Self {
            top_bid: snapshot.top_bid_f32(),
            top_ask: snapshot.top_ask_f32(),
            imbalance: snapshot.volume_imbalance().to_f32().unwrap_or(0.0),
        }
    }
}

/// Fixed 4×3 observation frame: one [`FeatureTriple`] row per lookback
/// offset in [`LOOKBACK_OFFSETS`] order
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ObservationFrame {
    rows: [FeatureTriple; 4],
}

impl ObservationFrame {
    pub fn rows(&self) -> &[FeatureTriple; 4] {
        &self.rows
    }

    /// The offset-0 row: features of the current step
    pub fn current(&self) -> &FeatureTriple {
        &self.rows[0]
    }

    /// Flatten to a feature vector for the agent
    pub fn to_features(&self) -> Vec<f32> {
        let mut features = Vec::with_capacity(12);
        for row in &self.rows {
            features.push(row.top_bid);
            features.push(row.top_ask);
            features.push(row.imbalance);
        }
        features
    }
}

/// Append-only feature history addressed by absolute step index
///
/// Each index is populated exactly once; repeat recordings for an
/// already-populated index are ignored, which makes observing the same step
/// twice idempotent.
#[derive(Debug, Clone, Default)]
pub struct FeatureHistory {
    entries: Vec<FeatureTriple>,
}

impl FeatureHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the triple for `step`. Only the next unpopulated index is
    /// accepted; duplicates are ignored.
    pub fn record(&mut self, step: usize, triple: FeatureTriple) {
        if step != self.entries.len() {
            debug_assert!(step < self.entries.len(), "history gap at step {step}");
            return;
        }
        self.entries.push(triple);
    }

    pub fn get(&self, step: usize) -> Option<&FeatureTriple> {
        self.entries.get(step)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Record the step's features and assemble its multi-horizon frame.
    ///
    /// Rows with `step < offset`, or whose index is not yet populated, are
    /// zero rows.
    pub fn observe(&mut self, snapshot: &BookSnapshot, step: usize) -> ObservationFrame {
        self.record(step, FeatureTriple::from_snapshot(snapshot));

        let mut rows = [FeatureTriple::default(); 4];
        for (row, &offset) in rows.iter_mut().zip(LOOKBACK_OFFSETS.iter()) {
            if step >= offset {
                if let Some(triple) = self.get(step - offset) {
                    *row = *triple;
                }
            }
        }

        ObservationFrame { rows }
    }
}
