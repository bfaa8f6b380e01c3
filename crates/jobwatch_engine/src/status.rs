use std::time::Duration;

use serde::Deserialize;

use crate::{ApiCredentials, JobKind, PollReport, API_KEY_HEADER};

#[derive(Debug, Clone)]
pub struct PollSettings {
    /// Fixed delay between status probes for one job.
    pub poll_interval: Duration,
    pub connect_timeout: Duration,
    /// Per-request timeout; kept shorter than the poll interval so a hung
    /// request cannot overlap the next probe of the same job.
    pub request_timeout: Duration,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(5),
            connect_timeout: Duration::from_secs(2),
            request_timeout: Duration::from_secs(3),
        }
    }
}

/// Wire shape of the status endpoints.
#[derive(Debug, Deserialize)]
struct StatusPayload {
    status: String,
    #[serde(default)]
    result: Option<serde_json::Value>,
    #[serde(default)]
    error: Option<String>,
}

#[async_trait::async_trait]
pub trait StatusClient: Send + Sync {
    async fn probe(
        &self,
        kind: JobKind,
        job_id: &str,
        credentials: &ApiCredentials,
    ) -> PollReport;
}

#[derive(Debug, Clone)]
pub struct HttpStatusClient {
    settings: PollSettings,
}

impl HttpStatusClient {
    pub fn new(settings: PollSettings) -> Self {
        Self { settings }
    }

    fn build_client(&self) -> Result<reqwest::Client, reqwest::Error> {
        reqwest::Client::builder()
            .connect_timeout(self.settings.connect_timeout)
            .timeout(self.settings.request_timeout)
            .build()
    }
}

#[async_trait::async_trait]
impl StatusClient for HttpStatusClient {
    async fn probe(
        &self,
        kind: JobKind,
        job_id: &str,
        credentials: &ApiCredentials,
    ) -> PollReport {
        let client = match self.build_client() {
            Ok(client) => client,
            Err(err) => return PollReport::Transient(err.to_string()),
        };

        let url = format!(
            "{}{}",
            credentials.base_url.trim_end_matches('/'),
            kind.status_path(job_id)
        );

        let response = match client
            .get(&url)
            .header(API_KEY_HEADER, &credentials.api_token)
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) => return classify_request_error(&err),
        };

        let status = response.status();
        if !status.is_success() {
            return PollReport::HttpError(status.as_u16());
        }

        match response.json::<StatusPayload>().await {
            Ok(payload) => PollReport::Status {
                status: payload.status,
                result: payload.result,
                error: payload.error,
            },
            // A 2xx with a body that does not parse is treated as a blip and
            // retried on the next cycle.
            Err(err) => PollReport::Transient(format!("malformed status body: {err}")),
        }
    }
}

fn classify_request_error(err: &reqwest::Error) -> PollReport {
    if let Some(status) = err.status() {
        return PollReport::HttpError(status.as_u16());
    }
    if err.is_timeout() {
        return PollReport::Transient(format!("request timed out: {err}"));
    }
    PollReport::Transient(err.to_string())
}
