use crate::{ds::RingBuffer, episode::EpisodeOutcome, metrics::DEFAULT_WINDOW};

use super::record::Progress;

/// Number of recent episode rewards a job record keeps
pub const REWARD_LOG_CAPACITY: usize = 200;

/// Accumulates per-episode outcomes of a job and decides when to publish
#[derive(Debug, Clone)]
pub struct ProgressTracker {
    episodes: usize,
    interval: usize,
    completed: usize,
    successes: usize,
    rewards: RingBuffer<f64>,
}

impl ProgressTracker {
    /// Publish every `ceil(episodes / 100)` episodes and on the last one
    pub fn new(episodes: usize) -> Self {
        Self {
            episodes,
            interval: episodes.div_ceil(100).max(1),
            completed: 0,
            successes: 0,
            rewards: RingBuffer::new(REWARD_LOG_CAPACITY),
        }
    }

    pub fn interval(&self) -> usize {
        self.interval
    }

    /// Record the next episode's outcome, returning a snapshot when one is due
    pub fn record(&mut self, outcome: EpisodeOutcome) -> Option<Progress> {
        self.completed += 1;
        if outcome.success {
            self.successes += 1;
        }
        self.rewards.push(outcome.total_reward);

        let due = self.completed % self.interval == 0 || self.completed == self.episodes;
        due.then(|| self.snapshot())
    }

    fn snapshot(&self) -> Progress {
        let logs = self.rewards.to_vec();
        let recent = &logs[logs.len().saturating_sub(DEFAULT_WINDOW)..];
        let avg_reward = recent.iter().sum::<f64>() / recent.len() as f64;
        let progress = (self.completed * 100 / self.episodes.max(1)).min(100) as u8;

        Progress {
            episode: self.completed,
            progress,
            avg_reward,
            success_rate: self.successes as f64 / self.completed as f64,
            logs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(total_reward: f64, success: bool) -> EpisodeOutcome {
        EpisodeOutcome {
            total_reward,
            success,
        }
    }

    #[test]
    fn interval_rounds_up() {
        assert_eq!(ProgressTracker::new(0).interval(), 1);
        assert_eq!(ProgressTracker::new(50).interval(), 1);
        assert_eq!(ProgressTracker::new(100).interval(), 1);
        assert_eq!(ProgressTracker::new(150).interval(), 2);
        assert_eq!(ProgressTracker::new(5000).interval(), 50);
    }

    #[test]
    fn publishes_on_interval_and_last_episode() {
        let mut tracker = ProgressTracker::new(5);
        let published = (0..5)
            .filter_map(|i| tracker.record(outcome(i as f64, i % 2 == 0)))
            .map(|p| p.episode)
            .collect::<Vec<_>>();
        assert_eq!(published, vec![1, 2, 3, 4, 5]);

        let mut tracker = ProgressTracker::new(301);
        let published = (0..301)
            .filter_map(|_| tracker.record(outcome(-1.0, false)))
            .map(|p| p.episode)
            .collect::<Vec<_>>();
        assert_eq!(tracker.interval(), 4);
        assert_eq!(published.len(), 76);
        assert_eq!(published.last(), Some(&301), "final episode always published");
    }

    #[test]
    fn snapshot_windows_rewards() {
        let mut tracker = ProgressTracker::new(250);
        let mut last = None;
        for i in 0..250 {
            if let Some(progress) = tracker.record(outcome(i as f64, i < 50)) {
                last = Some(progress);
            }
        }
        let last = last.unwrap();
        assert_eq!(last.episode, 250);
        assert_eq!(last.progress, 100);
        assert_eq!(last.success_rate, 0.2);
        assert_eq!(last.logs.len(), REWARD_LOG_CAPACITY);
        assert_eq!(last.logs.first(), Some(&50.0));
        assert_eq!(last.logs.last(), Some(&249.0));
        // mean of 150..=249
        assert_eq!(last.avg_reward, 199.5);
    }

    #[test]
    fn short_runs_average_what_they_have() {
        let mut tracker = ProgressTracker::new(3);
        tracker.record(outcome(-5.0, false));
        let progress = tracker.record(outcome(1.0, true)).unwrap();
        assert_eq!(progress.progress, 66);
        assert_eq!(progress.avg_reward, -2.0);
        assert_eq!(progress.success_rate, 0.5);
        assert_eq!(progress.logs, vec![-5.0, 1.0]);
    }
}
