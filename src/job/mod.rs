//! Training runs exposed as pollable background jobs
//!
//! A [`JobManager`] owns the job registry. Creating a job inserts a `queued`
//! record and starts one worker thread for it; the worker is the only writer
//! of that record from then on. Any number of readers may poll concurrently
//! and always observe a consistent snapshot.

use std::{
    collections::BTreeMap,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    thread,
    time::{Duration, Instant},
};

use log::{error, info};
use strum::VariantArray;

use crate::{
    algo::Algorithm,
    error::{Error, Result},
};

pub use self::{
    config::{ExplorationSchedule, TrainConfig},
    progress::{ProgressTracker, REWARD_LOG_CAPACITY},
    record::{
        Comparison, DetailedMetrics, Job, JobId, JobResults, JobStatus, MetricsView, PolicyView,
        Progress,
    },
    registry::JobRegistry,
};

mod config;
mod progress;
mod record;
mod registry;
mod worker;

const POLL_INTERVAL: Duration = Duration::from_millis(5);

/// Creates, runs and serves training jobs
///
/// Cloning is cheap and every clone shares the same registry.
#[derive(Debug, Clone, Default)]
pub struct JobManager {
    registry: Arc<JobRegistry>,
    next_id: Arc<AtomicU64>,
    next_comparison_id: Arc<AtomicU64>,
}

impl JobManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a training job and start its worker, returning without waiting for it
    ///
    /// Configuration problems surface later as a job in status `error`.
    pub fn create_job(&self, config: TrainConfig) -> JobId {
        let id = JobId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.registry
            .insert(id, Job::queued(&config.algorithm, config.episodes));
        info!(
            "job {id}: queued {} for {} episodes",
            config.algorithm, config.episodes
        );

        if let Err(e) = worker::spawn(Arc::clone(&self.registry), id, config) {
            error!("job {id}: could not start worker: {e}");
            self.registry.update(id, |job| {
                job.start();
                job.fail(format!("could not start worker: {e}"));
            });
        }
        id
    }

    /// Snapshot of a job's full record
    pub fn status(&self, id: JobId) -> Result<Job> {
        self.registry.get(id).ok_or(Error::JobNotFound(id))
    }

    /// Learned policy and value table, present once the job has finished
    pub fn policy(&self, id: JobId) -> Result<PolicyView> {
        self.status(id).map(PolicyView::from)
    }

    /// Aggregated metrics and histories, present once the job has finished
    pub fn metrics(&self, id: JobId) -> Result<MetricsView> {
        self.status(id).map(MetricsView::from)
    }

    /// Launch one job per algorithm with otherwise identical configuration
    pub fn compare(&self, config: &TrainConfig) -> Comparison {
        let comparison_id = self.next_comparison_id.fetch_add(1, Ordering::Relaxed);
        info!(
            "comparison {comparison_id}: launching {} algorithms",
            Algorithm::VARIANTS.len()
        );
        let job_ids = Algorithm::VARIANTS
            .iter()
            .map(|&algorithm| (algorithm, self.create_job(config.with_algorithm(algorithm))))
            .collect::<BTreeMap<_, _>>();

        Comparison {
            comparison_id,
            algorithms: Algorithm::VARIANTS.to_vec(),
            job_ids,
            status: "comparison_started",
        }
    }

    /// Remove every job record and return how many were removed
    ///
    /// Running workers are not stopped, their later writes simply find no record.
    pub fn reset(&self) -> usize {
        let cleared = self.registry.clear();
        info!("cleared {cleared} jobs");
        cleared
    }

    /// Ids of every job currently in the registry, in creation order
    pub fn job_ids(&self) -> Vec<JobId> {
        self.registry.ids()
    }

    /// Poll until a job reaches a terminal status or `timeout` elapses
    ///
    /// Returns the last snapshot observed, terminal or not.
    pub fn wait_for(&self, id: JobId, timeout: Duration) -> Result<Job> {
        let deadline = Instant::now() + timeout;
        loop {
            let job = self.status(id)?;
            if job.status.is_terminal() || Instant::now() >= deadline {
                return Ok(job);
            }
            thread::sleep(POLL_INTERVAL);
        }
    }
}
