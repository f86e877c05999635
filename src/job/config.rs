use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{
    algo::{
        tabular::{MonteCarloConfig, TdAgentConfig, VisitMethod},
        Algorithm,
    },
    decay::{Constant, Decay, Step},
    episode::DEFAULT_MAX_STEPS,
    error::{Error, Result},
    exploration::EpsilonGreedy,
    maze::Maze,
};

/// Monte Carlo never starts exploring below this rate
pub const MC_MIN_INITIAL_EPSILON: f64 = 0.2;
/// Lowest exploration floor a Monte Carlo job accepts
pub const MC_MIN_EPSILON_FLOOR: f64 = 0.05;
/// Initial value of every Monte Carlo table entry
pub const MC_OPTIMISTIC_INIT: f64 = 100.0;

/// A per-episode exploration rate schedule
pub type ExplorationSchedule = EpsilonGreedy<Box<dyn Decay + Send>>;

/// Everything needed to run one training job
///
/// Missing fields fall back to their defaults when deserialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainConfig {
    /// `q_learning`, `monte_carlo` or `sarsa`, resolved when the job starts
    pub algorithm: String,
    pub episodes: usize,
    /// Learning rate of the TD agents
    pub alpha: f64,
    /// Discount factor
    pub gamma: f64,
    /// Base exploration rate
    pub epsilon: f64,
    /// Step budget per episode
    pub max_steps: usize,
    pub mc_method: VisitMethod,
    /// Per-episode multiplicative exploration decay (Monte Carlo only)
    pub epsilon_decay: f64,
    /// Exploration floor (Monte Carlo only)
    pub min_epsilon: f64,
    /// Flat row-major cell codes (`0=wall, 1=path, 2=start, 3=goal`)
    pub maze: Option<Vec<i64>>,
    pub rows: Option<usize>,
    pub cols: Option<usize>,
    /// Seed for the agent's RNG
    pub seed: Option<u64>,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::QLearning.to_string(),
            episodes: 5000,
            alpha: 0.3,
            gamma: 0.99,
            epsilon: 0.15,
            max_steps: DEFAULT_MAX_STEPS,
            mc_method: VisitMethod::FirstVisit,
            epsilon_decay: 0.9996,
            min_epsilon: 0.01,
            maze: None,
            rows: None,
            cols: None,
            seed: None,
        }
    }
}

impl TrainConfig {
    /// The same configuration targeting another algorithm
    pub fn with_algorithm(&self, algorithm: Algorithm) -> Self {
        Self {
            algorithm: algorithm.to_string(),
            ..self.clone()
        }
    }

    /// Resolve the algorithm selector
    pub fn resolve_algorithm(&self) -> Result<Algorithm> {
        Algorithm::from_str(&self.algorithm)
            .map_err(|_| Error::UnknownAlgorithm(self.algorithm.clone()))
    }

    /// Build the maze, using the explicit grid only when the grid and both dimensions are given
    pub fn build_maze(&self, shaping: bool) -> Result<Maze> {
        match (&self.maze, self.rows, self.cols) {
            (Some(grid), Some(rows), Some(cols)) if !grid.is_empty() && rows > 0 && cols > 0 => {
                Maze::from_codes(grid, rows, cols, shaping)
            }
            _ => Maze::default_maze(shaping),
        }
    }

    /// Exploration schedule for an algorithm
    ///
    /// TD agents explore at the constant base rate. Monte Carlo decays from
    /// `max(epsilon, 0.2)` by `epsilon_decay` per episode, never below `max(min_epsilon, 0.05)`.
    pub fn exploration(&self, algorithm: Algorithm) -> Result<ExplorationSchedule> {
        let decay: Box<dyn Decay + Send> = match algorithm {
            Algorithm::MonteCarlo => Box::new(Step::new(
                self.epsilon_decay,
                self.epsilon.max(MC_MIN_INITIAL_EPSILON),
                self.min_epsilon.max(MC_MIN_EPSILON_FLOOR),
                1.0,
            )?),
            Algorithm::QLearning | Algorithm::Sarsa => Box::new(Constant::new(self.epsilon)),
        };
        Ok(EpsilonGreedy::new(decay))
    }

    pub fn td_agent_config(&self) -> TdAgentConfig {
        TdAgentConfig {
            alpha: self.alpha,
            gamma: self.gamma,
            seed: self.seed,
        }
    }

    pub fn monte_carlo_config(&self) -> MonteCarloConfig {
        MonteCarloConfig {
            gamma: self.gamma,
            method: self.mc_method,
            initial_value: MC_OPTIMISTIC_INIT,
            seed: self.seed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::Environment;

    #[test]
    fn missing_fields_use_defaults() {
        let config: TrainConfig =
            serde_json::from_str(r#"{"algorithm": "sarsa", "episodes": 10}"#).unwrap();
        assert_eq!(config.algorithm, "sarsa");
        assert_eq!(config.episodes, 10);
        assert_eq!(config.alpha, 0.3);
        assert_eq!(config.max_steps, 200);
        assert_eq!(config.mc_method, VisitMethod::FirstVisit);
        assert!(config.maze.is_none());

        let config: TrainConfig = serde_json::from_str(r#"{"mc_method": "every_visit"}"#).unwrap();
        assert_eq!(config.mc_method, VisitMethod::EveryVisit);
        assert_eq!(config, TrainConfig { mc_method: VisitMethod::EveryVisit, ..Default::default() });
    }

    #[test]
    fn unknown_algorithm_is_reported() {
        let config = TrainConfig {
            algorithm: "dqn".into(),
            ..Default::default()
        };
        assert_eq!(
            config.resolve_algorithm(),
            Err(Error::UnknownAlgorithm("dqn".into()))
        );
        assert_eq!(
            config.with_algorithm(Algorithm::Sarsa).resolve_algorithm(),
            Ok(Algorithm::Sarsa)
        );
    }

    #[test]
    fn explicit_maze_requires_grid_and_dimensions() {
        let mut config = TrainConfig {
            maze: Some(vec![2, 1, 1, 3]),
            rows: Some(2),
            cols: None,
            ..Default::default()
        };
        assert_eq!(config.build_maze(false).unwrap().num_states(), 16 * 17);

        config.cols = Some(2);
        let maze = config.build_maze(true).unwrap();
        assert_eq!(maze.num_states(), 4);
        assert!(maze.shaping());

        config.rows = Some(3);
        assert!(matches!(config.build_maze(false), Err(Error::Config { .. })));
    }

    #[test]
    fn td_exploration_is_constant() {
        let config = TrainConfig {
            epsilon: 0.1,
            ..Default::default()
        };
        let schedule = config.exploration(Algorithm::QLearning).unwrap();
        assert_eq!(schedule.epsilon(0), 0.1);
        assert_eq!(schedule.epsilon(10_000), 0.1);
    }

    #[test]
    fn monte_carlo_exploration_is_floored_and_decays() {
        let config = TrainConfig {
            epsilon: 0.1,
            epsilon_decay: 0.5,
            min_epsilon: 0.01,
            ..Default::default()
        };
        let schedule = config.exploration(Algorithm::MonteCarlo).unwrap();
        assert_eq!(schedule.epsilon(0), 0.2, "initial rate raised to 0.2");
        assert_eq!(schedule.epsilon(1), 0.1);
        assert_eq!(schedule.epsilon(50), 0.05, "floor raised to 0.05");

        // Zero decay explores at the base rate once, then sits on the floor
        let abrupt = TrainConfig {
            epsilon: 0.3,
            epsilon_decay: 0.0,
            min_epsilon: 0.01,
            ..Default::default()
        };
        let schedule = abrupt.exploration(Algorithm::MonteCarlo).unwrap();
        assert_eq!(schedule.epsilon(0), 0.3);
        assert_eq!(schedule.epsilon(1), 0.05);
        assert_eq!(schedule.epsilon(2), 0.05);

        let growing = TrainConfig {
            epsilon_decay: 1.5,
            ..Default::default()
        };
        assert!(growing.exploration(Algorithm::MonteCarlo).is_ok());

        let nan = TrainConfig {
            epsilon_decay: f64::NAN,
            ..Default::default()
        };
        assert!(matches!(
            nan.exploration(Algorithm::MonteCarlo),
            Err(Error::InvalidSchedule { .. })
        ));
        assert!(nan.exploration(Algorithm::Sarsa).is_ok());
    }

    #[test]
    fn monte_carlo_table_is_optimistic() {
        let config = TrainConfig {
            mc_method: VisitMethod::EveryVisit,
            seed: Some(4),
            ..Default::default()
        };
        let mc = config.monte_carlo_config();
        assert_eq!(mc.initial_value, MC_OPTIMISTIC_INIT);
        assert_eq!(mc.method, VisitMethod::EveryVisit);
        assert_eq!(mc.seed, Some(4));
    }
}
