use std::path::PathBuf;

/// Opaque job identifier assigned by the remote backend.
pub type JobId = String;

/// Header carrying the bearer credential on every outbound request.
pub const API_KEY_HEADER: &str = "X-API-Key";

/// Kind of backend job. Selects the status endpoint to probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobKind {
    Ingest,
    Report,
}

impl JobKind {
    pub fn status_path(self, job_id: &str) -> String {
        match self {
            JobKind::Ingest => format!("/api/ingest/status/{job_id}"),
            JobKind::Report => format!("/api/relatorio/status/{job_id}"),
        }
    }
}

/// Credentials resolved immediately before an outbound request. Never cached
/// across poll cycles; the user may re-authenticate between polls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiCredentials {
    pub base_url: String,
    pub api_token: String,
}

/// Source of fresh credentials. Implementations re-read their backing store
/// on every call.
pub trait CredentialsProvider: Send + Sync {
    fn credentials(&self) -> Option<ApiCredentials>;
}

/// Classified outcome of one status probe. The transport layer only
/// classifies; terminal/retry policy lives with the host's state machine.
#[derive(Debug, Clone, PartialEq)]
pub enum PollReport {
    /// 2xx response with a parsed `{status, result?, error?}` body.
    Status {
        status: String,
        result: Option<serde_json::Value>,
        error: Option<String>,
    },
    /// Non-2xx HTTP response.
    HttpError(u16),
    /// No credentials were available; the network was not touched.
    MissingCredentials,
    /// Network-level failure short of an HTTP response.
    Transient(String),
}

/// Where a finished report is fetched from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadSource {
    /// Served by the report download endpoint under the configured base URL.
    Endpoint { filename: String },
    /// Fully qualified URL from the terminal payload.
    Url { url: String, filename: String },
}

impl DownloadSource {
    /// Filename suggested to the download manager.
    pub fn filename(&self) -> &str {
        match self {
            DownloadSource::Endpoint { filename } => filename,
            DownloadSource::Url { filename, .. } => filename,
        }
    }

    pub(crate) fn resolved_url(&self, credentials: &ApiCredentials) -> String {
        match self {
            DownloadSource::Endpoint { filename } => format!(
                "{}/api/relatorio/download/{filename}",
                credentials.base_url.trim_end_matches('/')
            ),
            DownloadSource::Url { url, .. } => url.clone(),
        }
    }
}

/// Events pumped from the engine back to the host loop.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    PollObserved { job_id: JobId, report: PollReport },
    DownloadCompleted {
        job_id: JobId,
        filename: String,
        path: PathBuf,
    },
    DownloadFailed {
        job_id: JobId,
        filename: String,
        message: String,
    },
}
