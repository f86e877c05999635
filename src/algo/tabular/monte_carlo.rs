use std::collections::{HashMap, HashSet};

use rand::{rngs::StdRng, Rng};
use rand_distr::{Distribution, WeightedIndex};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::{
    algo::{build_rng, Agent},
    assert_interval,
    env::{Action, Environment, State},
    episode::{EpisodeOptions, EpisodeOutcome, EpisodeTally, Exp},
    metrics::MetricsRecorder,
};

use super::{epsilon_greedy, ValueTable};

/// Probability that an episode with exploring starts enabled samples its initial state
pub const EXPLORING_START_PROBABILITY: f64 = 0.85;

/// Which occurrences of a state-action pair in an episode contribute a return
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum VisitMethod {
    /// Only the first occurrence of each pair per episode
    #[default]
    FirstVisit,
    /// Every occurrence
    EveryVisit,
}

/// Configuration for the [`MonteCarloAgent`]
#[derive(Debug, Clone, PartialEq)]
pub struct MonteCarloConfig {
    /// The discount factor - must be between 0 and 1
    ///
    /// **Default**: `0.99`
    pub gamma: f64,
    /// **Default**: [`VisitMethod::FirstVisit`]
    pub method: VisitMethod,
    /// Initial value of every table entry. An optimistic value draws the greedy policy
    /// toward pairs it has not tried yet.
    ///
    /// **Default**: `0.0`
    pub initial_value: f64,
    pub seed: Option<u64>,
}

impl Default for MonteCarloConfig {
    fn default() -> Self {
        Self {
            gamma: 0.99,
            method: VisitMethod::FirstVisit,
            initial_value: 0.0,
            seed: None,
        }
    }
}

/// Every return observed for one state-action pair
#[derive(Debug, Clone, Default)]
struct ReturnLog {
    returns: Vec<f64>,
    sum: f64,
}

impl ReturnLog {
    fn push(&mut self, value: f64) {
        self.returns.push(value);
        self.sum += value;
    }

    fn mean(&self) -> f64 {
        self.sum / self.returns.len() as f64
    }
}

/// Monte Carlo control: learns from complete episodes
///
/// An episode is generated in full before any update. Each contributing occurrence of a
/// state-action pair appends its discounted return to that pair's log, and the table entry
/// becomes the mean of every return observed for the pair so far.
pub struct MonteCarloAgent {
    q_table: ValueTable,
    returns: HashMap<State, HashMap<Action, ReturnLog>>,
    gamma: f64,
    method: VisitMethod,
    rng: StdRng,
    metrics: MetricsRecorder,
}

impl MonteCarloAgent {
    /// **Panics** if `gamma` is not in the interval `[0,1]`
    pub fn new(num_states: usize, config: MonteCarloConfig) -> Self {
        assert_interval!(config.gamma, 0.0, 1.0);
        Self {
            q_table: ValueTable::new(num_states, config.initial_value),
            returns: HashMap::new(),
            gamma: config.gamma,
            method: config.method,
            rng: build_rng(config.seed),
            metrics: MetricsRecorder::new(),
        }
    }

    pub fn method(&self) -> VisitMethod {
        self.method
    }

    /// Number of returns recorded for a state-action pair
    pub fn visit_count(&self, state: State, action: Action) -> usize {
        self.returns
            .get(&state)
            .and_then(|row| row.get(&action))
            .map_or(0, |log| log.returns.len())
    }

    /// Pick the initial state of an episode
    ///
    /// With exploring starts, most episodes begin at an open cell drawn with weight
    /// `max_distance + 1 - distance`, so cells nearer the goal are favored.
    fn initial_state<E: Environment>(&mut self, env: &E, exploring_start: bool) -> State {
        if !exploring_start || !self.rng.gen_bool(EXPLORING_START_PROBABILITY) {
            return env.reset();
        }

        let candidates = env.open_states();
        let distances: Vec<usize> = candidates.iter().map(|&s| env.distance_to_goal(s)).collect();
        let Some(&max_distance) = distances.iter().max() else {
            return env.reset();
        };
        let weights = distances.iter().map(|&d| max_distance + 1 - d);

        match WeightedIndex::new(weights) {
            Ok(dist) => candidates[dist.sample(&mut self.rng)],
            Err(_) => env.reset(),
        }
    }

    /// Run through the environment once, collecting the trajectory
    ///
    /// **Returns** the trajectory and whether the goal was reached within the step budget
    fn generate_episode<E: Environment>(
        &mut self,
        env: &E,
        options: EpisodeOptions,
    ) -> (Vec<Exp>, bool) {
        let mut state = self.initial_state(env, options.exploring_start);
        let mut trajectory = Vec::new();

        for _ in 0..options.max_steps {
            let action = epsilon_greedy(&self.q_table, state, options.epsilon, &mut self.rng);
            let transition = env.step(state, action);
            trajectory.push(Exp {
                state,
                action,
                reward: transition.reward,
            });
            state = transition.next_state;
            if transition.done {
                return (trajectory, true);
            }
        }

        (trajectory, false)
    }

    /// Discounted return from every step to the end of the episode
    fn returns_of(&self, trajectory: &[Exp]) -> Vec<f64> {
        let mut g = 0.0;
        let mut returns: Vec<f64> = trajectory
            .iter()
            .rev()
            .map(|exp| {
                g = exp.reward + self.gamma * g;
                g
            })
            .collect();
        returns.reverse();
        returns
    }

    /// Update the table from a finished trajectory, recording prediction errors in `tally`
    fn learn(&mut self, trajectory: &[Exp], tally: &mut EpisodeTally) {
        let returns = self.returns_of(trajectory);
        let mut visited = HashSet::new();

        for (exp, &g) in trajectory.iter().zip(&returns) {
            let first_visit = visited.insert((exp.state, exp.action));
            if self.method == VisitMethod::FirstVisit && !first_visit {
                continue;
            }

            let old_q = self.q_table.get(exp.state, exp.action);
            let log = self
                .returns
                .entry(exp.state)
                .or_default()
                .entry(exp.action)
                .or_default();
            log.push(g);
            self.q_table.set(exp.state, exp.action, log.mean());
            tally.error(g - old_q);
        }
    }
}

impl<E: Environment> Agent<E> for MonteCarloAgent {
    fn select_action(&mut self, state: State, epsilon: f64) -> Action {
        epsilon_greedy(&self.q_table, state, epsilon, &mut self.rng)
    }

    fn run_episode(&mut self, env: &E, options: EpisodeOptions) -> EpisodeOutcome {
        let (trajectory, success) = self.generate_episode(env, options);

        let mut tally = EpisodeTally::new(self.gamma);
        for exp in &trajectory {
            tally.step(exp.reward);
        }
        self.learn(&trajectory, &mut tally);

        self.metrics.record_episode(&tally, self.q_table.stats());
        EpisodeOutcome {
            total_reward: tally.total_reward,
            success,
        }
    }

    fn value_table(&self) -> &ValueTable {
        &self.q_table
    }

    fn metrics(&self) -> &MetricsRecorder {
        &self.metrics
    }
}
