use crate::{BadgeState, JobId, JobType, TrackedJobSnapshot};

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Begin a recurring poll cycle for a newly registered job.
    StartPollCycle { job_id: JobId, job_type: JobType },
    /// Cancel the recurring poll cycle of a job that reached a terminal state.
    StopPollCycle { job_id: JobId },
    /// Mirror the full tracked-job set to durable storage. Fire-and-forget.
    PersistTrackedJobs(Vec<TrackedJobSnapshot>),
    /// The badge surface should reflect the given state.
    UpdateBadge(BadgeState),
    /// Arrange for `Msg::BadgeResetDue` after the grace delay.
    ScheduleBadgeReset,
    /// Raise an OS-level notification.
    Notify(Notification),
    /// Fire-and-forget message to the UI surface.
    PublishUi(UiEvent),
    /// Fetch a finished report with the then-current credentials.
    BeginDownload { job_id: JobId, target: DownloadTarget },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub body: String,
    /// Stable identifier so repeated notifications for one job coalesce.
    pub tag: String,
}

/// Outcome messages forwarded to the UI surface, mirroring the extension's
/// `job_finished` / `job_failed` runtime messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    JobFinished {
        job_id: JobId,
        job_type: JobType,
        message: String,
    },
    JobFailed {
        job_id: JobId,
        job_type: JobType,
        error: String,
    },
}

/// Where a finished report can be fetched from. The terminal payload usually
/// carries a bare filename served by the download endpoint, but one backend
/// variant returns a fully qualified URL instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadTarget {
    Filename(String),
    Url(String),
}

impl DownloadTarget {
    /// Name suggested to the download manager: the filename itself, or the
    /// last path segment of the URL.
    pub fn suggested_filename(&self) -> &str {
        match self {
            DownloadTarget::Filename(name) => name,
            DownloadTarget::Url(url) => {
                let tail = url.split(['?', '#']).next().unwrap_or(url);
                tail.rsplit('/')
                    .next()
                    .filter(|segment| !segment.is_empty())
                    .unwrap_or("report.html")
            }
        }
    }
}
