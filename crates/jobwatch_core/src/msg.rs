use crate::{JobId, JobType, TrackedJobSnapshot};

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// UI signalled that a job was enqueued on the backend.
    TrackRequested { job_id: JobId, job_type: JobType },
    /// Re-register jobs recovered from the persisted mirror at startup.
    RestoreTrackedJobs(Vec<TrackedJobSnapshot>),
    /// One poll cycle reported back for a job.
    PollObserved {
        job_id: JobId,
        observation: PollObservation,
    },
    /// A report download finished; `saved_as` is the file name actually used
    /// (it may carry a collision suffix).
    DownloadCompleted { job_id: JobId, saved_as: String },
    /// A report download could not be carried out.
    DownloadFailed {
        job_id: JobId,
        filename: String,
        error: String,
    },
    /// The badge reset grace period elapsed.
    BadgeResetDue,
    /// The UI surface opened and asked for a settled badge to be cleared.
    BadgeClearRequested,
}

/// What one status probe observed, as classified by the transport layer.
/// Policy (fatal vs retryable, terminal vs pending) lives in `update`.
#[derive(Debug, Clone, PartialEq)]
pub enum PollObservation {
    /// 2xx response with a parsed body.
    Status {
        status: String,
        result: Option<serde_json::Value>,
        error: Option<String>,
    },
    /// Non-2xx HTTP response, 401 included.
    HttpError(u16),
    /// No credentials were available when the cycle fired.
    MissingCredentials,
    /// Network-level failure short of an HTTP response (timeout, DNS,
    /// connection reset). The job stays tracked and the next cycle retries.
    Transient(String),
}
