use std::collections::HashMap;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use worker_logging::{worker_debug, worker_error, worker_info};

use crate::download::{DownloadSettings, Downloader, HttpDownloader};
use crate::status::{HttpStatusClient, PollSettings, StatusClient};
use crate::{CredentialsProvider, DownloadSource, EngineEvent, JobId, JobKind, PollReport};

enum EngineCommand {
    Track { job_id: JobId, kind: JobKind },
    Cancel { job_id: JobId },
    Download { job_id: JobId, source: DownloadSource },
}

/// Command side of the engine. Poll cycles run as tasks on an engine-owned
/// tokio runtime; observations come back on the event receiver returned by
/// [`EngineHandle::new`].
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
}

impl EngineHandle {
    pub fn new(
        poll_settings: PollSettings,
        download_settings: DownloadSettings,
        credentials: Arc<dyn CredentialsProvider>,
    ) -> (Self, mpsc::Receiver<EngineEvent>) {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let status_client: Arc<dyn StatusClient> =
            Arc::new(HttpStatusClient::new(poll_settings.clone()));
        let downloader: Arc<dyn Downloader> = Arc::new(HttpDownloader::new(download_settings));

        thread::spawn(move || {
            run_engine(
                cmd_rx,
                event_tx,
                poll_settings.poll_interval,
                status_client,
                downloader,
                credentials,
            );
        });

        (Self { cmd_tx }, event_rx)
    }

    /// Begin a recurring poll cycle for a job. A job that already has a cycle
    /// keeps its existing one.
    pub fn track(&self, job_id: JobId, kind: JobKind) {
        let _ = self.cmd_tx.send(EngineCommand::Track { job_id, kind });
    }

    /// Cancel the poll cycle of a job that reached a terminal state.
    pub fn cancel(&self, job_id: JobId) {
        let _ = self.cmd_tx.send(EngineCommand::Cancel { job_id });
    }

    /// Fetch a finished report. Outcome arrives as a download event.
    pub fn download(&self, job_id: JobId, source: DownloadSource) {
        let _ = self.cmd_tx.send(EngineCommand::Download { job_id, source });
    }
}

fn run_engine(
    cmd_rx: mpsc::Receiver<EngineCommand>,
    event_tx: mpsc::Sender<EngineEvent>,
    poll_interval: Duration,
    status_client: Arc<dyn StatusClient>,
    downloader: Arc<dyn Downloader>,
    credentials: Arc<dyn CredentialsProvider>,
) {
    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(err) => {
            worker_error!("Failed to start engine runtime: {}", err);
            return;
        }
    };

    // Poll handles live here, owned exclusively by the command loop. They are
    // never persisted; a restart rebuilds cycles from the job mirror instead.
    let mut cycles: HashMap<JobId, tokio::task::JoinHandle<()>> = HashMap::new();

    while let Ok(command) = cmd_rx.recv() {
        match command {
            EngineCommand::Track { job_id, kind } => {
                cycles.retain(|_, handle| !handle.is_finished());
                if cycles.contains_key(&job_id) {
                    worker_debug!("Poll cycle for {} already running", job_id);
                    continue;
                }
                worker_info!("Starting poll cycle for {} ({:?})", job_id, kind);
                let handle = runtime.spawn(poll_cycle(
                    job_id.clone(),
                    kind,
                    poll_interval,
                    status_client.clone(),
                    credentials.clone(),
                    event_tx.clone(),
                ));
                cycles.insert(job_id, handle);
            }
            EngineCommand::Cancel { job_id } => {
                if let Some(handle) = cycles.remove(&job_id) {
                    worker_info!("Stopping poll cycle for {}", job_id);
                    handle.abort();
                }
            }
            EngineCommand::Download { job_id, source } => {
                let downloader = downloader.clone();
                let credentials = credentials.clone();
                let event_tx = event_tx.clone();
                runtime.spawn(async move {
                    let filename = source.filename().to_string();
                    let result = match credentials.credentials() {
                        Some(creds) => downloader.download(&source, &creds).await,
                        None => Err(crate::DownloadError::MissingCredentials),
                    };
                    let event = match result {
                        Ok(path) => EngineEvent::DownloadCompleted {
                            job_id,
                            filename,
                            path,
                        },
                        Err(err) => EngineEvent::DownloadFailed {
                            job_id,
                            filename,
                            message: err.to_string(),
                        },
                    };
                    let _ = event_tx.send(event);
                });
            }
        }
    }
    // Command channel closed: the host is shutting down and the runtime drops
    // with any in-flight cycles. The persisted mirror lets the next start
    // resume them.
}

async fn poll_cycle(
    job_id: JobId,
    kind: JobKind,
    poll_interval: Duration,
    status_client: Arc<dyn StatusClient>,
    credentials: Arc<dyn CredentialsProvider>,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    let mut interval = tokio::time::interval(poll_interval);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    loop {
        // The first tick completes immediately: a fresh job is probed right
        // away instead of waiting out the interval.
        interval.tick().await;

        let report = match credentials.credentials() {
            Some(creds) => status_client.probe(kind, &job_id, &creds).await,
            None => PollReport::MissingCredentials,
        };
        worker_debug!("Poll observation for {}: {:?}", job_id, report);

        let observed = EngineEvent::PollObserved {
            job_id: job_id.clone(),
            report,
        };
        if event_tx.send(observed).is_err() {
            // Host loop is gone; nothing left to report to.
            return;
        }
    }
}
