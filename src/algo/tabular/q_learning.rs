use rand::rngs::StdRng;

use crate::{
    algo::{build_rng, Agent},
    assert_interval,
    env::{Action, Environment, State, Transition},
    episode::{EpisodeOptions, EpisodeOutcome, EpisodeTally},
    metrics::MetricsRecorder,
};

use super::{epsilon_greedy, ValueTable};

/// Configuration shared by the temporal-difference agents ([`QLearningAgent`], [`SarsaAgent`](super::SarsaAgent))
#[derive(Debug, Clone, PartialEq)]
pub struct TdAgentConfig {
    /// The learning rate - must be between 0 and 1
    pub alpha: f64,
    /// The discount factor - must be between 0 and 1
    pub gamma: f64,
    /// Seed for the exploration RNG, drawn from OS entropy when `None`
    pub seed: Option<u64>,
}

impl Default for TdAgentConfig {
    fn default() -> Self {
        Self {
            alpha: 0.3,
            gamma: 0.99,
            seed: None,
        }
    }
}

/// A Q-learning agent (off-policy TD control) over a dense value table
///
/// Every step moves `Q(s, a)` toward `r + γ max_a' Q(s', a')`, regardless of the
/// action the exploration policy actually takes next. Terminal transitions bootstrap from zero.
pub struct QLearningAgent {
    q_table: ValueTable,
    alpha: f64, // learning rate
    gamma: f64, // discount factor
    rng: StdRng,
    metrics: MetricsRecorder,
}

impl QLearningAgent {
    /// Initialize a new `QLearningAgent` for an environment with `num_states` states
    ///
    /// **Panics** if `alpha` or `gamma` is not in the interval `[0,1]`
    pub fn new(num_states: usize, config: TdAgentConfig) -> Self {
        assert_interval!(config.alpha, 0.0, 1.0);
        assert_interval!(config.gamma, 0.0, 1.0);
        Self {
            q_table: ValueTable::new(num_states, 0.0),
            alpha: config.alpha,
            gamma: config.gamma,
            rng: build_rng(config.seed),
            metrics: MetricsRecorder::new(),
        }
    }

    /// Apply one update and return the TD error
    fn learn(&mut self, state: State, action: Action, transition: Transition) -> f64 {
        let Transition {
            next_state,
            reward,
            done,
        } = transition;

        let max_next_q = if done {
            0.0
        } else {
            self.q_table.max_value(next_state)
        };
        let q_value = self.q_table.get(state, action);
        let td_error = reward + self.gamma * max_next_q - q_value;
        self.q_table.set(state, action, q_value + self.alpha * td_error);
        td_error
    }
}

impl<E: Environment> Agent<E> for QLearningAgent {
    fn select_action(&mut self, state: State, epsilon: f64) -> Action {
        epsilon_greedy(&self.q_table, state, epsilon, &mut self.rng)
    }

    fn run_episode(&mut self, env: &E, options: EpisodeOptions) -> EpisodeOutcome {
        let mut tally = EpisodeTally::new(self.gamma);
        let mut state = env.reset();
        let mut success = false;

        for _ in 0..options.max_steps {
            let action = epsilon_greedy(&self.q_table, state, options.epsilon, &mut self.rng);
            let transition = env.step(state, action);
            let td_error = self.learn(state, action, transition);

            self.metrics.record_td_error(td_error);
            tally.error(td_error);
            tally.step(transition.reward);
            state = transition.next_state;

            if transition.done {
                success = true;
                break;
            }
        }

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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{maze::Maze, metrics::DEFAULT_WINDOW};

    /// A 1x6 corridor with the start at the west end and the goal five steps east
    fn corridor() -> Maze {
        Maze::from_codes(&[2, 1, 1, 1, 1, 3], 1, 6, false).unwrap()
    }

    fn greedy_rollout(agent: &QLearningAgent, env: &Maze, limit: usize) -> Option<usize> {
        let mut state = env.reset();
        for steps in 1..=limit {
            let t = env.step(state, agent.q_table.greedy(state));
            if t.done {
                return Some(steps);
            }
            state = t.next_state;
        }
        None
    }

    fn agent(seed: u64) -> QLearningAgent {
        QLearningAgent::new(
            6,
            TdAgentConfig {
                alpha: 0.5,
                gamma: 0.9,
                seed: Some(seed),
            },
        )
    }

    #[test]
    fn update_follows_td_rule() {
        let mut agent = agent(0);
        agent.q_table.set(1, Action::Right, 10.0);
        agent.q_table.set(1, Action::Left, 4.0);

        let env = corridor();
        let td_error = agent.learn(0, Action::Right, env.step(0, Action::Right));
        // target = -1 + 0.9 * 10, old value 0
        assert!((td_error - 8.0).abs() < 1e-12);
        assert!((agent.q_table.get(0, Action::Right) - 4.0).abs() < 1e-12);
    }

    #[test]
    fn terminal_transition_does_not_bootstrap() {
        let mut agent = agent(0);
        agent.q_table.set(5, Action::Up, 1000.0);
        let env = corridor();
        let td_error = agent.learn(4, Action::Right, env.step(4, Action::Right));
        assert_eq!(td_error, 100.0);
        assert_eq!(agent.q_table.get(4, Action::Right), 50.0);
    }

    #[test]
    fn zero_exploration_is_deterministic() {
        let mut agent = agent(3);
        agent.q_table.set(2, Action::Down, 1.0);
        agent.q_table.set(2, Action::Right, 1.0);
        for _ in 0..100 {
            assert_eq!(Agent::<Maze>::select_action(&mut agent, 2, 0.0), Action::Down);
            assert_eq!(Agent::<Maze>::select_action(&mut agent, 3, 0.0), Action::Up);
        }
    }

    #[test]
    fn converges_on_straight_corridor() {
        let env = corridor();
        let mut agent = agent(11);
        let options = EpisodeOptions {
            max_steps: 100,
            epsilon: 0.0,
            exploring_start: false,
        };

        for _ in 0..300 {
            agent.run_episode(&env, options);
        }

        assert_eq!(greedy_rollout(&agent, &env, 50), Some(5));
        let lengths = agent.metrics.episode_lengths();
        assert!(lengths[lengths.len() - 20..].iter().all(|&l| l == 5));

        let before = agent.q_table.snapshot();
        agent.run_episode(&env, options);
        let drift = before
            .iter()
            .flatten()
            .zip(agent.q_table.snapshot().iter().flatten())
            .map(|(a, b)| (a - b).abs())
            .fold(0.0, f64::max);
        assert!(drift < 1e-6, "value table still moving by {drift}");
    }

    #[test]
    fn episode_updates_histories() {
        let env = corridor();
        let mut agent = agent(5);
        let outcome = agent.run_episode(
            &env,
            EpisodeOptions {
                max_steps: 3,
                epsilon: 0.0,
                exploring_start: false,
            },
        );
        assert!(!outcome.success, "goal is out of reach in three steps");
        assert_eq!(agent.metrics.episode_lengths(), &[3]);
        assert_eq!(agent.metrics.value_history().mean.len(), 1);

        let summary = agent.metrics.summary(DEFAULT_WINDOW).unwrap();
        assert!(summary.avg_td_error > 0.0);
        assert_eq!(summary.avg_return, outcome.total_reward);
    }

    #[test]
    fn policy_is_none_only_at_goal() {
        let env = corridor();
        let agent = agent(1);
        let policy = Agent::policy(&agent, &env);
        assert_eq!(policy.len(), 6);
        assert!(policy[..5].iter().all(Option::is_some));
        assert_eq!(policy[5], None);
    }
}
