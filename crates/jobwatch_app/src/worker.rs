use std::io::{self, BufRead};
use std::sync::{mpsc, Arc};
use std::thread;

use jobwatch_core::{update, Msg, TrackerState};
use jobwatch_engine::{DownloadSettings, EngineHandle, PollSettings};
use worker_logging::{worker_info, worker_warn};

use crate::config::{FileCredentials, WorkerPaths, CONFIG_FILENAME};
use crate::effects::EffectRunner;
use crate::persistence;
use crate::protocol::{self, OutboundEvent, ParsedRequest, UiBridge};

/// Wire everything together and run the update loop until the parent process
/// tears the host down. All tracking decisions are serialized here; the
/// engine only ever talks back through the message channel.
pub(crate) fn run(paths: WorkerPaths) -> anyhow::Result<()> {
    worker_info!(
        "Worker starting (state: {:?}, downloads: {:?})",
        paths.state_dir,
        paths.downloads_dir
    );

    let bridge = UiBridge::stdout();
    let (msg_tx, msg_rx) = mpsc::channel::<Msg>();

    let credentials = Arc::new(FileCredentials::new(paths.state_dir.join(CONFIG_FILENAME)));
    let (engine, engine_events) = EngineHandle::new(
        PollSettings::default(),
        DownloadSettings::new(paths.downloads_dir.clone()),
        credentials,
    );
    let runner = EffectRunner::new(
        engine,
        engine_events,
        bridge.clone(),
        paths.state_dir.clone(),
        msg_tx.clone(),
    );

    spawn_request_reader(bridge, msg_tx.clone());

    // Resume whatever the previous run was still tracking, through the same
    // path a fresh registration takes.
    let persisted = persistence::load_tracked_jobs(&paths.state_dir);
    if !persisted.is_empty() {
        worker_info!("Resuming {} persisted job(s)", persisted.len());
        let _ = msg_tx.send(Msg::RestoreTrackedJobs(persisted));
    }

    let mut state = TrackerState::new();
    while let Ok(msg) = msg_rx.recv() {
        let (next, effects) = update(state, msg);
        state = next;
        runner.run(effects);
    }
    Ok(())
}

fn spawn_request_reader(bridge: UiBridge, msg_tx: mpsc::Sender<Msg>) {
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let line = match line {
                Ok(line) => line,
                Err(err) => {
                    worker_warn!("Failed to read request: {}", err);
                    break;
                }
            };
            if line.trim().is_empty() {
                continue;
            }
            match protocol::parse_request(&line) {
                Ok(request) => {
                    bridge.publish(&OutboundEvent::Ack {
                        success: true,
                        error: None,
                    });
                    let msg = match request {
                        ParsedRequest::Track { job_id, job_type } => {
                            Msg::TrackRequested { job_id, job_type }
                        }
                        ParsedRequest::ResetBadge => Msg::BadgeClearRequested,
                    };
                    if msg_tx.send(msg).is_err() {
                        break;
                    }
                }
                Err(error) => {
                    worker_warn!("Rejected request: {}", error);
                    bridge.publish(&OutboundEvent::Ack {
                        success: false,
                        error: Some(error),
                    });
                }
            }
        }
        // The UI surface disconnected; tracked jobs keep polling until the
        // parent kills the host, and the mirror covers the next start.
        worker_info!("Request stream closed");
    });
}
