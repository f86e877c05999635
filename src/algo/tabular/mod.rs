use rand::Rng;
use strum::VariantArray;

use crate::{
    env::{Action, State},
    exploration::{self, Choice},
};

pub mod monte_carlo;
pub mod q_learning;
pub mod sarsa;
pub mod value_table;

pub use monte_carlo::{MonteCarloAgent, MonteCarloConfig, VisitMethod};
pub use q_learning::{QLearningAgent, TdAgentConfig};
pub use sarsa::SarsaAgent;
pub use value_table::{ActionValues, ValueTable};

/// Choose an action based on the current state and an epsilon greedy policy over `table`
pub(crate) fn epsilon_greedy<R: Rng + ?Sized>(
    table: &ValueTable,
    state: State,
    epsilon: f64,
    rng: &mut R,
) -> Action {
    match exploration::choose(epsilon, rng) {
        Choice::Explore => random_action(rng),
        Choice::Exploit => table.greedy(state),
    }
}

/// A uniformly random action
pub(crate) fn random_action<R: Rng + ?Sized>(rng: &mut R) -> Action {
    Action::VARIANTS[rng.gen_range(0..Action::COUNT)]
}
