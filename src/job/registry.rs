use std::{
    collections::HashMap,
    sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use super::record::{Job, JobId};

/// Thread-safe map from job id to job record
///
/// Readers always receive a clone of a whole record, and writers replace fields
/// of a record under a single write lock, so a reader never sees a half-applied
/// update. A poisoned lock is recovered, since records are only ever mutated by
/// the transition methods of [`Job`] which leave them consistent.
#[derive(Debug, Default)]
pub struct JobRegistry {
    jobs: RwLock<HashMap<JobId, Job>>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<JobId, Job>> {
        self.jobs.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<JobId, Job>> {
        self.jobs.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn insert(&self, id: JobId, job: Job) {
        self.write().insert(id, job);
    }

    /// Snapshot of a record
    pub fn get(&self, id: JobId) -> Option<Job> {
        self.read().get(&id).cloned()
    }

    /// Apply `f` to a record atomically, returning `false` if the record is gone
    pub fn update(&self, id: JobId, f: impl FnOnce(&mut Job)) -> bool {
        match self.write().get_mut(&id) {
            Some(job) => {
                f(job);
                true
            }
            None => false,
        }
    }

    /// Remove every record and return how many were removed
    pub fn clear(&self) -> usize {
        let mut jobs = self.write();
        let count = jobs.len();
        jobs.clear();
        count
    }

    /// Ids of every record, in ascending order
    pub fn ids(&self) -> Vec<JobId> {
        let mut ids = self.read().keys().copied().collect::<Vec<_>>();
        ids.sort_unstable();
        ids
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, thread};

    use super::*;
    use crate::job::record::{JobStatus, Progress};

    #[test]
    fn updates_apply_to_existing_records_only() {
        let registry = JobRegistry::new();
        registry.insert(JobId(1), Job::queued("q_learning", 10));

        assert!(registry.update(JobId(1), Job::start));
        assert_eq!(registry.get(JobId(1)).unwrap().status, JobStatus::Running);
        assert!(!registry.update(JobId(2), Job::start));
        assert!(registry.get(JobId(2)).is_none());
    }

    #[test]
    fn clear_reports_removed_count() {
        let registry = JobRegistry::new();
        for id in [3, 1, 2] {
            registry.insert(JobId(id), Job::queued("sarsa", 1));
        }
        assert_eq!(registry.ids(), vec![JobId(1), JobId(2), JobId(3)]);
        assert_eq!(registry.clear(), 3);
        assert!(registry.ids().is_empty());
        assert_eq!(registry.clear(), 0);
    }

    #[test]
    fn readers_never_observe_partial_progress() {
        let registry = Arc::new(JobRegistry::new());
        registry.insert(JobId(1), Job::queued("q_learning", 1000));
        registry.update(JobId(1), Job::start);

        let writer = {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                for episode in 1..=1000 {
                    registry.update(JobId(1), |job| {
                        job.publish(Progress {
                            episode,
                            progress: (episode / 10) as u8,
                            avg_reward: episode as f64,
                            success_rate: 1.0,
                            logs: vec![episode as f64],
                        })
                    });
                }
            })
        };

        for _ in 0..1000 {
            let job = registry.get(JobId(1)).unwrap();
            if let Some(avg_reward) = job.avg_reward {
                assert_eq!(avg_reward, job.episode as f64);
                assert_eq!(job.logs, vec![job.episode as f64]);
                assert_eq!(job.progress as usize, job.episode / 10);
            }
        }
        writer.join().unwrap();
    }

    #[test]
    fn poisoned_lock_is_recovered() {
        let registry = Arc::new(JobRegistry::new());
        registry.insert(JobId(1), Job::queued("q_learning", 1));
        let poisoner = Arc::clone(&registry);
        let _ = thread::spawn(move || {
            poisoner.update(JobId(1), |_| panic!("boom"));
        })
        .join();

        assert_eq!(registry.ids(), vec![JobId(1)]);
        assert!(registry.update(JobId(1), Job::start));
    }
}
