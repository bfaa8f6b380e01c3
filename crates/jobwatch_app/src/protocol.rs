use std::io::Write;
use std::sync::{Arc, Mutex};

use jobwatch_core::JobType;
use serde::{Deserialize, Serialize};
use worker_logging::{worker_error, worker_warn};

/// One request line from the UI surface, before validation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRequest {
    action: String,
    #[serde(default)]
    job_id: Option<String>,
    #[serde(default)]
    job_type: Option<String>,
}

/// A validated inbound request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ParsedRequest {
    Track { job_id: String, job_type: JobType },
    ResetBadge,
}

/// Validate one request line. The error string goes back to the caller in a
/// `success: false` acknowledgement; no job is ever created from a rejected
/// request.
pub(crate) fn parse_request(line: &str) -> Result<ParsedRequest, String> {
    let raw: RawRequest =
        serde_json::from_str(line).map_err(|_| "malformed request".to_string())?;
    match raw.action.as_str() {
        "startPolling" => {
            let (Some(job_id), Some(type_str)) = (raw.job_id, raw.job_type) else {
                return Err("jobId or jobType missing".to_string());
            };
            let job_type = JobType::parse(&type_str)
                .ok_or_else(|| format!("unknown jobType `{type_str}`"))?;
            Ok(ParsedRequest::Track { job_id, job_type })
        }
        "resetBadge" => Ok(ParsedRequest::ResetBadge),
        other => Err(format!("unknown action `{other}`")),
    }
}

/// Everything the worker sends to the UI surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub(crate) enum OutboundEvent {
    Ack {
        success: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    JobFinished {
        job_id: String,
        job_type: String,
        message: String,
    },
    #[serde(rename_all = "camelCase")]
    JobFailed {
        job_id: String,
        job_type: String,
        error: String,
    },
    Badge {
        text: String,
        color: String,
    },
    Notification {
        title: String,
        body: String,
        tag: String,
    },
}

/// Serializes outbound events as one JSON object per line. Shared by the
/// update loop, the badge animator, and the request reader, so writes are
/// serialized behind one lock.
#[derive(Clone)]
pub(crate) struct UiBridge {
    out: Arc<Mutex<Box<dyn Write + Send>>>,
}

impl UiBridge {
    pub fn stdout() -> Self {
        Self {
            out: Arc::new(Mutex::new(Box::new(std::io::stdout()))),
        }
    }

    #[cfg(test)]
    pub fn sink(buffer: Arc<Mutex<Vec<u8>>>) -> Self {
        struct SharedBuffer(Arc<Mutex<Vec<u8>>>);
        impl Write for SharedBuffer {
            fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
                self.0.lock().unwrap().extend_from_slice(buf);
                Ok(buf.len())
            }
            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }
        Self {
            out: Arc::new(Mutex::new(Box::new(SharedBuffer(buffer)))),
        }
    }

    /// Fire-and-forget: a UI surface that went away must never fail a job.
    pub fn publish(&self, event: &OutboundEvent) {
        let line = match serde_json::to_string(event) {
            Ok(line) => line,
            Err(err) => {
                worker_error!("Failed to serialize outbound event: {}", err);
                return;
            }
        };
        let mut out = match self.out.lock() {
            Ok(out) => out,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Err(err) = writeln!(out, "{line}").and_then(|()| out.flush()) {
            worker_warn!("Failed to publish event to UI surface: {}", err);
        }
    }
}
