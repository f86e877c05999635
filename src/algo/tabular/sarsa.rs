use rand::rngs::StdRng;

use crate::{
    algo::{build_rng, Agent},
    assert_interval,
    env::{Action, Environment, State},
    episode::{EpisodeOptions, EpisodeOutcome, EpisodeTally},
    metrics::MetricsRecorder,
};

use super::{epsilon_greedy, TdAgentConfig, ValueTable};

/// A SARSA agent (on-policy TD control)
///
/// The bootstrap target uses the value of the action the exploration policy actually
/// picks in the next state, `r + γ Q(s', a')`, and that action is the one taken next.
/// Learned values therefore account for exploratory missteps.
pub struct SarsaAgent {
    q_table: ValueTable,
    alpha: f64,
    gamma: f64,
    rng: StdRng,
    metrics: MetricsRecorder,
}

impl SarsaAgent {
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

    /// Move `Q(s, a)` toward `reward + γ next_q` and return the TD error
    fn learn(&mut self, state: State, action: Action, reward: f64, next_q: f64) -> f64 {
        let q_value = self.q_table.get(state, action);
        let td_error = reward + self.gamma * next_q - q_value;
        self.q_table.set(state, action, q_value + self.alpha * td_error);
        td_error
    }
}

impl<E: Environment> Agent<E> for SarsaAgent {
    fn select_action(&mut self, state: State, epsilon: f64) -> Action {
        epsilon_greedy(&self.q_table, state, epsilon, &mut self.rng)
    }

    fn run_episode(&mut self, env: &E, options: EpisodeOptions) -> EpisodeOutcome {
        let epsilon = options.epsilon;
        let mut tally = EpisodeTally::new(self.gamma);
        let mut state = env.reset();
        let mut action = epsilon_greedy(&self.q_table, state, epsilon, &mut self.rng);
        let mut success = false;

        for _ in 0..options.max_steps {
            let transition = env.step(state, action);
            tally.step(transition.reward);

            if transition.done {
                let td_error = self.learn(state, action, transition.reward, 0.0);
                self.metrics.record_td_error(td_error);
                tally.error(td_error);
                success = true;
                break;
            }

            let next_state = transition.next_state;
            let next_action = epsilon_greedy(&self.q_table, next_state, epsilon, &mut self.rng);
            let next_q = self.q_table.get(next_state, next_action);
            let td_error = self.learn(state, action, transition.reward, next_q);
            self.metrics.record_td_error(td_error);
            tally.error(td_error);

            state = next_state;
            action = next_action;
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
    use crate::maze::Maze;

    fn agent(alpha: f64, seed: u64) -> SarsaAgent {
        SarsaAgent::new(
            6,
            TdAgentConfig {
                alpha,
                gamma: 0.9,
                seed: Some(seed),
            },
        )
    }

    #[test]
    fn bootstraps_from_chosen_action_not_maximum() {
        let mut agent = agent(1.0, 0);
        agent.q_table.set(1, Action::Up, -3.0);
        agent.q_table.set(1, Action::Right, 10.0);

        // Q-learning would use 10; SARSA uses the value of the action it picked
        let td_error = agent.learn(0, Action::Right, -1.0, agent.q_table.get(1, Action::Up));
        assert!((td_error - (-1.0 - 2.7)).abs() < 1e-12);
        assert!((agent.q_table.get(0, Action::Right) - (-3.7)).abs() < 1e-12);
    }

    #[test]
    fn learns_corridor_greedily() {
        let env = Maze::from_codes(&[2, 1, 1, 1, 1, 3], 1, 6, false).unwrap();
        let mut agent = agent(0.5, 21);
        let options = EpisodeOptions {
            max_steps: 100,
            epsilon: 0.0,
            exploring_start: false,
        };
        for _ in 0..300 {
            agent.run_episode(&env, options);
        }

        let outcome = agent.run_episode(&env, options);
        assert!(outcome.success);
        assert_eq!(agent.metrics.episode_lengths().last(), Some(&5));
        assert_eq!(
            Agent::policy(&agent, &env),
            vec![Some(Action::Right); 5]
                .into_iter()
                .chain([None])
                .collect::<Vec<_>>()
        );
    }

    #[test]
    fn timeouts_are_failures() {
        let env = Maze::from_codes(&[2, 1, 1, 1, 1, 3], 1, 6, false).unwrap();
        let mut agent = agent(0.5, 2);
        let outcome = agent.run_episode(
            &env,
            EpisodeOptions {
                max_steps: 2,
                epsilon: 0.0,
                exploring_start: false,
            },
        );
        assert!(!outcome.success);
        assert_eq!(outcome.total_reward, -10.0, "two wall bumps");
        assert!(agent.metrics.summary(100).is_some());
    }
}
