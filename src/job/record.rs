use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};

use crate::{
    algo::{tabular::ActionValues, Algorithm},
    env::Action,
    metrics::{MetricsSummary, ValueHistory},
};

/// Unique identifier of a training job, never reused within a manager
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub u64);

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08}", self.0)
    }
}

/// Lifecycle of a job: `queued -> running -> finished | error`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Queued,
    Running,
    Finished,
    Error,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Finished | JobStatus::Error)
    }
}

/// A progress sample published by a job's worker
#[derive(Debug, Clone, PartialEq)]
pub struct Progress {
    /// Number of episodes completed
    pub episode: usize,
    /// Integer percentage of episodes completed
    pub progress: u8,
    pub avg_reward: f64,
    pub success_rate: f64,
    pub logs: Vec<f64>,
}

/// Aggregated metrics of a finished job
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailedMetrics {
    /// Absent when the job ran zero episodes
    #[serde(flatten)]
    pub summary: Option<MetricsSummary>,
    /// Wall-clock training time in seconds
    pub training_duration: f64,
    pub episodes_per_sec: f64,
}

impl DetailedMetrics {
    pub fn new(summary: Option<MetricsSummary>, training_duration: f64, episodes: usize) -> Self {
        let episodes_per_sec = if training_duration > 0.0 {
            episodes as f64 / training_duration
        } else {
            0.0
        };
        Self {
            summary,
            training_duration,
            episodes_per_sec,
        }
    }
}

/// Everything a worker captures once training completes
#[derive(Debug, Clone, PartialEq)]
pub struct JobResults {
    pub policy: Vec<Option<Action>>,
    pub q_table: Vec<ActionValues>,
    pub detailed_metrics: DetailedMetrics,
    pub q_value_history: ValueHistory,
    pub episode_returns_history: Vec<f64>,
    pub episode_lengths_history: Vec<usize>,
    pub loss_history: Vec<f64>,
}

/// The pollable record of a training job
///
/// Only the job's worker mutates the record after creation, and every mutation goes through
/// one of the transition methods below. A terminal record never changes again.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Job {
    /// Algorithm name as requested
    pub algorithm: String,
    pub status: JobStatus,
    pub progress: u8,
    pub episode: usize,
    pub episodes: usize,
    pub avg_reward: Option<f64>,
    pub success_rate: Option<f64>,
    pub policy: Option<Vec<Option<Action>>>,
    pub q_table: Option<Vec<ActionValues>>,
    /// Rewards of the most recent episodes, oldest first
    pub logs: Vec<f64>,
    pub detailed_metrics: Option<DetailedMetrics>,
    pub q_value_history: Option<ValueHistory>,
    pub episode_returns_history: Option<Vec<f64>>,
    pub episode_lengths_history: Option<Vec<usize>>,
    pub loss_history: Option<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Job {
    pub fn queued(algorithm: &str, episodes: usize) -> Self {
        Self {
            algorithm: algorithm.to_owned(),
            status: JobStatus::Queued,
            progress: 0,
            episode: 0,
            episodes,
            avg_reward: None,
            success_rate: None,
            policy: None,
            q_table: None,
            logs: Vec::new(),
            detailed_metrics: None,
            q_value_history: None,
            episode_returns_history: None,
            episode_lengths_history: None,
            loss_history: None,
            error: None,
        }
    }

    pub(crate) fn start(&mut self) {
        if self.status == JobStatus::Queued {
            self.status = JobStatus::Running;
        }
    }

    /// Overwrite every progress field at once
    pub(crate) fn publish(&mut self, progress: Progress) {
        if self.status != JobStatus::Running {
            return;
        }
        let Progress {
            episode,
            progress,
            avg_reward,
            success_rate,
            logs,
        } = progress;
        self.episode = episode;
        self.progress = progress;
        self.avg_reward = Some(avg_reward);
        self.success_rate = Some(success_rate);
        self.logs = logs;
    }

    pub(crate) fn finish(&mut self, results: JobResults) {
        if self.status.is_terminal() {
            return;
        }
        self.status = JobStatus::Finished;
        self.policy = Some(results.policy);
        self.q_table = Some(results.q_table);
        self.detailed_metrics = Some(results.detailed_metrics);
        self.q_value_history = Some(results.q_value_history);
        self.episode_returns_history = Some(results.episode_returns_history);
        self.episode_lengths_history = Some(results.episode_lengths_history);
        self.loss_history = Some(results.loss_history);
    }

    pub(crate) fn fail(&mut self, message: String) {
        if self.status.is_terminal() {
            return;
        }
        self.status = JobStatus::Error;
        self.error = Some(message);
    }
}

/// Learned policy and value table of a job
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PolicyView {
    pub policy: Option<Vec<Option<Action>>>,
    pub q_table: Option<Vec<ActionValues>>,
    pub status: JobStatus,
}

impl From<Job> for PolicyView {
    fn from(job: Job) -> Self {
        Self {
            policy: job.policy,
            q_table: job.q_table,
            status: job.status,
        }
    }
}

/// Aggregated metrics and per-episode histories of a job
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsView {
    pub status: JobStatus,
    pub detailed_metrics: Option<DetailedMetrics>,
    pub q_value_history: Option<ValueHistory>,
    pub episode_returns_history: Option<Vec<f64>>,
    pub episode_lengths_history: Option<Vec<usize>>,
    pub loss_history: Option<Vec<f64>>,
    pub success_rate: Option<f64>,
    pub avg_reward: Option<f64>,
}

impl From<Job> for MetricsView {
    fn from(job: Job) -> Self {
        Self {
            status: job.status,
            detailed_metrics: job.detailed_metrics,
            q_value_history: job.q_value_history,
            episode_returns_history: job.episode_returns_history,
            episode_lengths_history: job.episode_lengths_history,
            loss_history: job.loss_history,
            success_rate: job.success_rate,
            avg_reward: job.avg_reward,
        }
    }
}

/// Jobs launched to compare every algorithm on the same configuration
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comparison {
    pub comparison_id: u64,
    pub algorithms: Vec<Algorithm>,
    pub job_ids: BTreeMap<Algorithm, JobId>,
    pub status: &'static str,
}
