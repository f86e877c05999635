use crate::env::{Action, State};

/// Default step budget per episode
pub const DEFAULT_MAX_STEPS: usize = 200;

/// Parameters for driving a single episode
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpisodeOptions {
    /// Step budget, after which the episode is truncated as a failure
    pub max_steps: usize,
    /// Probability of taking a uniformly random action
    pub epsilon: f64,
    /// Sample the initial state instead of starting from the canonical start.
    /// Agents without an exploring-start scheme ignore this flag.
    pub exploring_start: bool,
}

impl Default for EpisodeOptions {
    fn default() -> Self {
        Self {
            max_steps: DEFAULT_MAX_STEPS,
            epsilon: 0.15,
            exploring_start: false,
        }
    }
}

/// What a finished episode reports back to the training driver
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpisodeOutcome {
    pub total_reward: f64,
    /// `true` iff the goal was reached within the step budget
    pub success: bool,
}

/// Represents a single step of an episode trajectory
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Exp {
    /// The state before taking the action
    pub state: State,
    /// The action taken in the given state
    pub action: Action,
    /// The reward received after taking the action
    pub reward: f64,
}

/// Running statistics of one episode, handed to the
/// [`MetricsRecorder`](crate::metrics::MetricsRecorder) when the episode ends
#[derive(Debug, Clone, PartialEq)]
pub struct EpisodeTally {
    gamma: f64,
    discount: f64,
    pub length: usize,
    pub total_reward: f64,
    pub discounted_return: f64,
    squared_error_sum: f64,
    error_count: usize,
}

impl EpisodeTally {
    pub fn new(gamma: f64) -> Self {
        Self {
            gamma,
            discount: 1.0,
            length: 0,
            total_reward: 0.0,
            discounted_return: 0.0,
            squared_error_sum: 0.0,
            error_count: 0,
        }
    }

    /// Account for one environment step
    pub fn step(&mut self, reward: f64) {
        self.length += 1;
        self.total_reward += reward;
        self.discounted_return += self.discount * reward;
        self.discount *= self.gamma;
    }

    /// Account for one prediction error
    pub fn error(&mut self, error: f64) {
        self.squared_error_sum += error * error;
        self.error_count += 1;
    }

    /// Mean squared prediction error of the episode, `0` if nothing was updated
    pub fn loss(&self) -> f64 {
        if self.error_count == 0 {
            0.0
        } else {
            self.squared_error_sum / self.error_count as f64
        }
    }
}
