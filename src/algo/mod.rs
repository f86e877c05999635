use rand::{rngs::StdRng, SeedableRng};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, VariantArray};

use crate::{
    env::{Action, Environment, State},
    episode::{EpisodeOptions, EpisodeOutcome},
    metrics::{MetricsRecorder, MetricsSummary},
};

use self::tabular::ValueTable;

pub mod tabular;

/// The capabilities shared by every tabular control agent
///
/// ### Generics
/// - `E` - The [`Environment`] the agent learns in. Agents only rely on its reset/step contract,
///   plus the queries used for exploring starts and policy extraction.
pub trait Agent<E: Environment> {
    /// Epsilon greedy action selection over the current value table
    ///
    /// With `epsilon == 0` this is deterministic: the lowest-indexed action among the maxima.
    fn select_action(&mut self, state: State, epsilon: f64) -> Action;

    /// Run one full training episode, updating the value table and all tracked histories
    fn run_episode(&mut self, env: &E, options: EpisodeOptions) -> EpisodeOutcome;

    fn value_table(&self) -> &ValueTable;

    fn metrics(&self) -> &MetricsRecorder;

    /// Summary statistics over the last `window` episodes
    fn metrics_summary(&self, window: usize) -> Option<MetricsSummary> {
        self.metrics().summary(window)
    }

    /// Greedy action for every state, `None` where no decision is made (walls and the goal)
    fn policy(&self, env: &E) -> Vec<Option<Action>> {
        let table = self.value_table();
        (0..env.num_states())
            .map(|s| env.is_decision_state(s).then(|| table.greedy(s)))
            .collect()
    }
}

/// Selector for the agent variant a training job runs
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumString,
    VariantArray,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Algorithm {
    /// Off-policy temporal-difference control
    QLearning,
    /// Every-visit or first-visit Monte Carlo control with exploring starts
    MonteCarlo,
    /// On-policy temporal-difference control
    Sarsa,
}

impl Algorithm {
    /// Whether the maze adds the distance-to-goal shaping term for this algorithm
    pub fn uses_shaping(self) -> bool {
        matches!(self, Algorithm::MonteCarlo)
    }

    /// Whether episodes may start away from the canonical start
    pub fn uses_exploring_starts(self) -> bool {
        matches!(self, Algorithm::MonteCarlo)
    }
}

/// Seeded when reproducibility is requested, from OS entropy otherwise
pub(crate) fn build_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}
