use std::collections::BTreeMap;

use crate::{BadgeState, JobId, JobType, TrackedJobSnapshot};

/// Authoritative in-memory registry of tracked jobs plus the badge state.
///
/// The persisted mirror of the job set is only ever a snapshot taken from
/// here; a failed persistence write never compromises this state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TrackerState {
    jobs: BTreeMap<JobId, JobType>,
    badge: BadgeState,
}

impl TrackerState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a job if not already present. Returns whether it was newly added;
    /// `false` means the job was already tracked and the caller should treat
    /// the request as an idempotent no-op.
    pub(crate) fn register(&mut self, job_id: JobId, job_type: JobType) -> bool {
        if self.jobs.contains_key(&job_id) {
            return false;
        }
        self.jobs.insert(job_id, job_type);
        true
    }

    /// Removes a job if present; no-op otherwise.
    pub(crate) fn unregister(&mut self, job_id: &str) {
        self.jobs.remove(job_id);
    }

    pub fn is_tracked(&self, job_id: &str) -> bool {
        self.jobs.contains_key(job_id)
    }

    pub fn job_type(&self, job_id: &str) -> Option<JobType> {
        self.jobs.get(job_id).copied()
    }

    /// Full tracked set in deterministic id order, used for the persisted
    /// mirror and for resuming after a restart.
    pub fn tracked_jobs(&self) -> Vec<TrackedJobSnapshot> {
        self.jobs
            .iter()
            .map(|(job_id, job_type)| TrackedJobSnapshot {
                job_id: job_id.clone(),
                job_type: *job_type,
            })
            .collect()
    }

    pub fn active_job_count(&self) -> usize {
        self.jobs.len()
    }

    pub fn badge(&self) -> BadgeState {
        self.badge
    }

    pub(crate) fn set_badge(&mut self, badge: BadgeState) {
        self.badge = badge;
    }
}
