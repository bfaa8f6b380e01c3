/// Opaque job identifier assigned by the remote backend.
pub type JobId = String;

/// Kind of tracked backend work. Selects which status endpoint is polled and
/// how the terminal payload is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum JobType {
    Ingest,
    Report,
}

impl JobType {
    /// Wire spelling used by the UI protocol and the persisted mirror.
    pub fn as_str(self) -> &'static str {
        match self {
            JobType::Ingest => "ingest",
            JobType::Report => "report",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "ingest" => Some(JobType::Ingest),
            "report" => Some(JobType::Report),
            _ => None,
        }
    }

    /// Human-readable name used in notification titles.
    pub fn display_name(self) -> &'static str {
        match self {
            JobType::Ingest => "Ingestion",
            JobType::Report => "Report",
        }
    }
}

/// One entry of the tracked-job set, as mirrored to durable storage.
/// Poll handles are deliberately absent; they are meaningless across restarts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedJobSnapshot {
    pub job_id: JobId,
    pub job_type: JobType,
}
