use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;

use jobwatch_core::{
    DownloadTarget, Effect, JobType, Msg, Notification, PollObservation, UiEvent,
    BADGE_RESET_GRACE,
};
use jobwatch_engine::{DownloadSource, EngineEvent, EngineHandle, JobKind, PollReport};
use worker_logging::worker_info;

use crate::badge::BadgeAnimator;
use crate::persistence;
use crate::protocol::{OutboundEvent, UiBridge};

/// Executes the effects decided by the update loop and pumps engine events
/// back into it as messages.
pub(crate) struct EffectRunner {
    engine: EngineHandle,
    bridge: UiBridge,
    badge: BadgeAnimator,
    state_dir: PathBuf,
    msg_tx: mpsc::Sender<Msg>,
}

impl EffectRunner {
    pub fn new(
        engine: EngineHandle,
        engine_events: mpsc::Receiver<EngineEvent>,
        bridge: UiBridge,
        state_dir: PathBuf,
        msg_tx: mpsc::Sender<Msg>,
    ) -> Self {
        spawn_event_pump(engine_events, msg_tx.clone());
        Self {
            engine,
            badge: BadgeAnimator::new(bridge.clone()),
            bridge,
            state_dir,
            msg_tx,
        }
    }

    pub fn run(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::StartPollCycle { job_id, job_type } => {
                    self.engine.track(job_id, map_job_kind(job_type));
                }
                Effect::StopPollCycle { job_id } => self.engine.cancel(job_id),
                Effect::PersistTrackedJobs(jobs) => {
                    persistence::save_tracked_jobs(&self.state_dir, &jobs);
                }
                Effect::UpdateBadge(badge) => self.badge.apply(badge),
                Effect::ScheduleBadgeReset => {
                    let msg_tx = self.msg_tx.clone();
                    thread::spawn(move || {
                        thread::sleep(BADGE_RESET_GRACE);
                        let _ = msg_tx.send(Msg::BadgeResetDue);
                    });
                }
                Effect::Notify(notification) => self.notify(notification),
                Effect::PublishUi(event) => self.bridge.publish(&map_ui_event(event)),
                Effect::BeginDownload { job_id, target } => {
                    self.engine.download(job_id, map_download_source(target));
                }
            }
        }
    }

    /// OS-notification analog: logged for the record and published so the
    /// surface that hosts this worker can raise the real notification.
    fn notify(&self, notification: Notification) {
        worker_info!(
            "Notification [{}] {}: {}",
            notification.tag,
            notification.title,
            notification.body
        );
        self.bridge.publish(&OutboundEvent::Notification {
            title: notification.title,
            body: notification.body,
            tag: notification.tag,
        });
    }
}

fn spawn_event_pump(engine_events: mpsc::Receiver<EngineEvent>, msg_tx: mpsc::Sender<Msg>) {
    thread::spawn(move || {
        while let Ok(event) = engine_events.recv() {
            let msg = match event {
                EngineEvent::PollObserved { job_id, report } => Msg::PollObserved {
                    job_id,
                    observation: map_report(report),
                },
                EngineEvent::DownloadCompleted {
                    job_id,
                    filename,
                    path,
                } => {
                    worker_info!("Download of {} finished at {:?}", filename, path);
                    let saved_as = path
                        .file_name()
                        .map(|name| name.to_string_lossy().into_owned())
                        .unwrap_or(filename);
                    Msg::DownloadCompleted { job_id, saved_as }
                }
                EngineEvent::DownloadFailed {
                    job_id,
                    filename,
                    message,
                } => Msg::DownloadFailed {
                    job_id,
                    filename,
                    error: message,
                },
            };
            if msg_tx.send(msg).is_err() {
                break;
            }
        }
    });
}

fn map_job_kind(job_type: JobType) -> JobKind {
    match job_type {
        JobType::Ingest => JobKind::Ingest,
        JobType::Report => JobKind::Report,
    }
}

fn map_report(report: PollReport) -> PollObservation {
    match report {
        PollReport::Status {
            status,
            result,
            error,
        } => PollObservation::Status {
            status,
            result,
            error,
        },
        PollReport::HttpError(code) => PollObservation::HttpError(code),
        PollReport::MissingCredentials => PollObservation::MissingCredentials,
        PollReport::Transient(reason) => PollObservation::Transient(reason),
    }
}

fn map_download_source(target: DownloadTarget) -> DownloadSource {
    let filename = target.suggested_filename().to_string();
    match target {
        DownloadTarget::Filename(name) => DownloadSource::Endpoint { filename: name },
        DownloadTarget::Url(url) => DownloadSource::Url { url, filename },
    }
}

fn map_ui_event(event: UiEvent) -> OutboundEvent {
    match event {
        UiEvent::JobFinished {
            job_id,
            job_type,
            message,
        } => OutboundEvent::JobFinished {
            job_id,
            job_type: job_type.as_str().to_string(),
            message,
        },
        UiEvent::JobFailed {
            job_id,
            job_type,
            error,
        } => OutboundEvent::JobFailed {
            job_id,
            job_type: job_type.as_str().to_string(),
            error,
        },
    }
}
