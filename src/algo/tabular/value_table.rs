use strum::VariantArray;

use crate::{
    env::{Action, State},
    metrics::TableStats,
};

/// One row of action values, indexed by [`Action::index`]
pub type ActionValues = [f64; Action::COUNT];

/// A dense table holding one value estimate per state-action pair
#[derive(Debug, Clone, PartialEq)]
pub struct ValueTable {
    rows: Vec<ActionValues>,
}

impl ValueTable {
    /// Initialize every entry to `init`
    pub fn new(num_states: usize, init: f64) -> Self {
        Self {
            rows: vec![[init; Action::COUNT]; num_states],
        }
    }

    pub fn num_states(&self) -> usize {
        self.rows.len()
    }

    pub fn get(&self, state: State, action: Action) -> f64 {
        self.rows[state][action.index()]
    }

    pub fn set(&mut self, state: State, action: Action, value: f64) {
        self.rows[state][action.index()] = value;
    }

    pub fn row(&self, state: State) -> &ActionValues {
        &self.rows[state]
    }

    /// The highest value in a state's row
    pub fn max_value(&self, state: State) -> f64 {
        self.rows[state]
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max)
    }

    /// The action with the highest value, the lowest-indexed one among ties
    pub fn greedy(&self, state: State) -> Action {
        let row = &self.rows[state];
        let best = (1..Action::COUNT).fold(0, |best, ix| if row[ix] > row[best] { ix } else { best });
        Action::VARIANTS[best]
    }

    /// Statistics over every entry in the table
    pub fn stats(&self) -> TableStats {
        let values: Vec<f64> = self.rows.iter().flatten().copied().collect();
        TableStats::of(&values)
    }

    /// An owned copy of the table, one row per state
    pub fn snapshot(&self) -> Vec<ActionValues> {
        self.rows.clone()
    }
}
