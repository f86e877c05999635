use std::{
    any::Any,
    io,
    panic::{self, AssertUnwindSafe},
    sync::Arc,
    thread::{self, JoinHandle},
    time::Instant,
};

use log::{debug, error, info};

use crate::{
    algo::{
        tabular::{MonteCarloAgent, QLearningAgent, SarsaAgent},
        Agent, Algorithm,
    },
    env::Environment,
    episode::EpisodeOptions,
    error::{Error, Result},
    maze::Maze,
    metrics::DEFAULT_WINDOW,
};

use super::{
    config::TrainConfig,
    progress::ProgressTracker,
    record::{DetailedMetrics, Job, JobId, JobResults},
    registry::JobRegistry,
};

type BoxedAgent = Box<dyn Agent<Maze> + Send>;

/// Run a job on its own named thread
pub(crate) fn spawn(
    registry: Arc<JobRegistry>,
    id: JobId,
    config: TrainConfig,
) -> io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name(format!("job-{id}"))
        .spawn(move || run_job(&registry, id, &config))
}

/// Drive a job from `queued` to a terminal status
///
/// Any panic raised while training is caught here and recorded as a failure.
pub(crate) fn run_job(registry: &JobRegistry, id: JobId, config: &TrainConfig) {
    registry.update(id, Job::start);
    info!(
        "job {id}: running {} for {} episodes",
        config.algorithm, config.episodes
    );

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| train(registry, id, config)))
        .unwrap_or_else(|payload| Err(panicked(payload)));

    match outcome {
        Ok(results) => {
            let metrics = &results.detailed_metrics;
            let success_rate = registry
                .get(id)
                .and_then(|job| job.success_rate)
                .unwrap_or_default();
            info!(
                "job {id}: finished with {:.1}% success in {:.2}s ({:.1} episodes/s)",
                success_rate * 100.0,
                metrics.training_duration,
                metrics.episodes_per_sec
            );
            registry.update(id, |job| job.finish(results));
        }
        Err(e) => {
            error!("job {id}: {e}");
            registry.update(id, |job| job.fail(e.to_string()));
        }
    }
}

fn panicked(payload: Box<dyn Any + Send>) -> Error {
    let message = payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_owned());
    Error::WorkerPanicked { message }
}

fn build_agent(algorithm: Algorithm, num_states: usize, config: &TrainConfig) -> BoxedAgent {
    match algorithm {
        Algorithm::QLearning => Box::new(QLearningAgent::new(num_states, config.td_agent_config())),
        Algorithm::Sarsa => Box::new(SarsaAgent::new(num_states, config.td_agent_config())),
        Algorithm::MonteCarlo => {
            Box::new(MonteCarloAgent::new(num_states, config.monte_carlo_config()))
        }
    }
}

fn train(registry: &JobRegistry, id: JobId, config: &TrainConfig) -> Result<JobResults> {
    let algorithm = config.resolve_algorithm()?;
    let maze = config.build_maze(algorithm.uses_shaping())?;
    let schedule = config.exploration(algorithm)?;
    let mut agent = build_agent(algorithm, maze.num_states(), config);
    let mut tracker = ProgressTracker::new(config.episodes);

    let start = Instant::now();
    for episode in 0..config.episodes {
        let options = EpisodeOptions {
            max_steps: config.max_steps,
            epsilon: schedule.epsilon(u32::try_from(episode).unwrap_or(u32::MAX)),
            exploring_start: algorithm.uses_exploring_starts(),
        };
        let outcome = agent.run_episode(&maze, options);

        if let Some(progress) = tracker.record(outcome) {
            debug!(
                "job {id}: episode {}/{} avg reward {:.2} success {:.1}%",
                progress.episode,
                config.episodes,
                progress.avg_reward,
                progress.success_rate * 100.0
            );
            registry.update(id, |job| job.publish(progress));
        }
        thread::yield_now();
    }
    let training_duration = start.elapsed().as_secs_f64();

    let metrics = agent.metrics();
    Ok(JobResults {
        policy: agent.policy(&maze),
        q_table: agent.value_table().snapshot(),
        detailed_metrics: DetailedMetrics::new(
            agent.metrics_summary(DEFAULT_WINDOW),
            training_duration,
            config.episodes,
        ),
        q_value_history: metrics.value_history().clone(),
        episode_returns_history: metrics.episode_returns().to_vec(),
        episode_lengths_history: metrics.episode_lengths().to_vec(),
        loss_history: metrics.losses().to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::record::JobStatus;

    fn run(config: TrainConfig) -> Job {
        let registry = JobRegistry::new();
        let id = JobId(0);
        registry.insert(id, Job::queued(&config.algorithm, config.episodes));
        run_job(&registry, id, &config);
        registry.get(id).unwrap()
    }

    fn small(algorithm: &str) -> TrainConfig {
        TrainConfig {
            algorithm: algorithm.into(),
            episodes: 20,
            maze: Some(vec![2, 1, 1, 0, 0, 1, 0, 1, 3]),
            rows: Some(3),
            cols: Some(3),
            seed: Some(9),
            ..Default::default()
        }
    }

    #[test]
    fn every_algorithm_finishes() {
        for algorithm in ["q_learning", "monte_carlo", "sarsa"] {
            let job = run(small(algorithm));
            assert_eq!(job.status, JobStatus::Finished, "{algorithm}");
            assert_eq!(job.episode, 20);
            assert_eq!(job.progress, 100);
            assert_eq!(job.q_table.as_ref().map(Vec::len), Some(9));
            assert_eq!(job.episode_lengths_history.as_ref().map(Vec::len), Some(20));
            assert_eq!(job.logs.len(), 20);

            let policy = job.policy.unwrap();
            assert!(policy[3].is_none() && policy[8].is_none(), "walls and goal have no action");
            assert!(policy[0].is_some());
        }
    }

    #[test]
    fn unknown_algorithm_fails_without_results() {
        let job = run(small("dqn"));
        assert_eq!(job.status, JobStatus::Error);
        assert!(job.error.unwrap().contains("dqn"));
        assert!(job.policy.is_none());
        assert!(job.avg_reward.is_none());
    }

    #[test]
    fn bad_maze_fails() {
        let job = run(TrainConfig {
            rows: Some(4),
            ..small("sarsa")
        });
        assert_eq!(job.status, JobStatus::Error);
    }

    #[test]
    fn panics_become_failures() {
        let job = run(TrainConfig {
            alpha: 2.0,
            ..small("q_learning")
        });
        assert_eq!(job.status, JobStatus::Error);
        assert!(job.error.is_some());
    }

    #[test]
    fn monte_carlo_without_decay_finishes() {
        let job = run(TrainConfig {
            episodes: 5,
            epsilon_decay: 0.0,
            ..small("monte_carlo")
        });
        assert_eq!(job.status, JobStatus::Finished, "{:?}", job.error);
        assert_eq!(job.episode, 5);
        assert!(job.error.is_none());
    }

    #[test]
    fn zero_episodes_finish_with_empty_summary() {
        let job = run(TrainConfig {
            episodes: 0,
            ..small("monte_carlo")
        });
        assert_eq!(job.status, JobStatus::Finished);
        assert_eq!(job.episode, 0);
        assert!(job.avg_reward.is_none());
        let metrics = job.detailed_metrics.unwrap();
        assert!(metrics.summary.is_none());
        assert!(metrics.training_duration >= 0.0);
    }
}
