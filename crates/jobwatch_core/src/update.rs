use serde_json::Value;

use crate::{
    BadgeState, DownloadTarget, Effect, JobId, JobType, Msg, Notification, PollObservation,
    TrackerState, UiEvent,
};

/// Fallback for an ingest completion whose payload carries no message.
pub const GENERIC_SUCCESS_MESSAGE: &str = "Task completed.";
/// Fallback for a remote-reported failure without an error message.
pub const GENERIC_FAILURE_MESSAGE: &str = "The task failed on the backend.";

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: TrackerState, msg: Msg) -> (TrackerState, Vec<Effect>) {
    let effects = match msg {
        Msg::TrackRequested { job_id, job_type } => track_job(&mut state, job_id, job_type),
        Msg::RestoreTrackedJobs(snapshots) => {
            // Each entry goes through the normal tracking path, one at a time,
            // so resuming is indistinguishable from fresh registrations. The
            // last registration's persist effect rewrites the mirror to match
            // the rebuilt registry.
            let mut effects = Vec::new();
            for snapshot in snapshots {
                effects.extend(track_job(&mut state, snapshot.job_id, snapshot.job_type));
            }
            effects
        }
        Msg::PollObserved {
            job_id,
            observation,
        } => match state.job_type(&job_id) {
            Some(job_type) => apply_observation(&mut state, job_id, job_type, observation),
            // Stale report for a job that already reached a terminal state.
            None => Vec::new(),
        },
        Msg::DownloadCompleted { job_id, saved_as } => {
            vec![Effect::Notify(Notification {
                title: "Report downloaded".to_string(),
                body: format!("Saved as `{saved_as}`."),
                tag: job_id,
            })]
        }
        Msg::DownloadFailed {
            job_id,
            filename,
            error,
        } => {
            let error = format!("Failed to download `{filename}`: {error}");
            vec![
                Effect::PublishUi(UiEvent::JobFailed {
                    job_id: job_id.clone(),
                    job_type: JobType::Report,
                    error: error.clone(),
                }),
                Effect::Notify(Notification {
                    title: "Report download failed".to_string(),
                    body: error,
                    tag: job_id,
                }),
            ]
        }
        Msg::BadgeResetDue => {
            // Ignored if a new job started during the grace window.
            if state.active_job_count() == 0
                && matches!(state.badge(), BadgeState::Success | BadgeState::Failure)
            {
                state.set_badge(BadgeState::Idle);
                vec![Effect::UpdateBadge(BadgeState::Idle)]
            } else {
                Vec::new()
            }
        }
        Msg::BadgeClearRequested => {
            // A settled glyph can be dismissed early; an active animation
            // keeps reflecting in-flight work.
            if state.badge() != BadgeState::Busy && state.badge() != BadgeState::Idle {
                state.set_badge(BadgeState::Idle);
                vec![Effect::UpdateBadge(BadgeState::Idle)]
            } else {
                Vec::new()
            }
        }
    };

    (state, effects)
}

fn track_job(state: &mut TrackerState, job_id: JobId, job_type: JobType) -> Vec<Effect> {
    if !state.register(job_id.clone(), job_type) {
        // Already tracked: at most one poll cycle per job id.
        return Vec::new();
    }

    let mut effects = vec![
        Effect::StartPollCycle { job_id, job_type },
        Effect::PersistTrackedJobs(state.tracked_jobs()),
    ];
    if state.badge() != BadgeState::Busy {
        state.set_badge(BadgeState::Busy);
        effects.push(Effect::UpdateBadge(BadgeState::Busy));
    }
    effects
}

fn apply_observation(
    state: &mut TrackerState,
    job_id: JobId,
    job_type: JobType,
    observation: PollObservation,
) -> Vec<Effect> {
    match observation {
        PollObservation::Status {
            status,
            result,
            error,
        } => match status.as_str() {
            "finished" => complete_job(state, job_id, job_type, result),
            "failed" => {
                let error = error.unwrap_or_else(|| GENERIC_FAILURE_MESSAGE.to_string());
                fail_job(state, job_id, job_type, error)
            }
            // `queued`, `started`, or anything unrecognized: wait for the
            // next scheduled poll.
            _ => Vec::new(),
        },
        PollObservation::HttpError(code) => fail_job(
            state,
            job_id,
            job_type,
            format!("Status endpoint returned HTTP {code}."),
        ),
        PollObservation::MissingCredentials => fail_job(
            state,
            job_id,
            job_type,
            "No API credentials are configured.".to_string(),
        ),
        // Leave the job tracked; the next scheduled poll retries.
        PollObservation::Transient(_) => Vec::new(),
    }
}

fn complete_job(
    state: &mut TrackerState,
    job_id: JobId,
    job_type: JobType,
    result: Option<Value>,
) -> Vec<Effect> {
    match job_type {
        JobType::Ingest => {
            let message = ingest_success_message(result.as_ref());
            let mut effects = retire_job(state, &job_id);
            effects.push(Effect::PublishUi(UiEvent::JobFinished {
                job_id: job_id.clone(),
                job_type,
                message: message.clone(),
            }));
            effects.push(Effect::Notify(Notification {
                title: "Ingestion finished".to_string(),
                body: message,
                tag: job_id,
            }));
            effects.extend(settle_badge(state, BadgeState::Success));
            effects
        }
        JobType::Report => match report_download_target(result.as_ref()) {
            Some(target) => {
                let mut effects = retire_job(state, &job_id);
                effects.push(Effect::PublishUi(UiEvent::JobFinished {
                    job_id: job_id.clone(),
                    job_type,
                    message: format!(
                        "Report ready. Downloading `{}`...",
                        target.suggested_filename()
                    ),
                }));
                effects.push(Effect::BeginDownload { job_id, target });
                effects.extend(settle_badge(state, BadgeState::Success));
                effects
            }
            None => fail_job(
                state,
                job_id,
                job_type,
                "Report finished without a file reference.".to_string(),
            ),
        },
    }
}

fn fail_job(
    state: &mut TrackerState,
    job_id: JobId,
    job_type: JobType,
    error: String,
) -> Vec<Effect> {
    let mut effects = retire_job(state, &job_id);
    effects.push(Effect::PublishUi(UiEvent::JobFailed {
        job_id: job_id.clone(),
        job_type,
        error: error.clone(),
    }));
    effects.push(Effect::Notify(Notification {
        title: format!("{} failed", job_type.display_name()),
        body: error,
        tag: job_id,
    }));
    effects.extend(settle_badge(state, BadgeState::Failure));
    effects
}

/// Remove a job from the registry, cancel its poll cycle, and persist the
/// shrunken set.
fn retire_job(state: &mut TrackerState, job_id: &str) -> Vec<Effect> {
    state.unregister(job_id);
    vec![
        Effect::StopPollCycle {
            job_id: job_id.to_string(),
        },
        Effect::PersistTrackedJobs(state.tracked_jobs()),
    ]
}

/// After a terminal outcome, settle the badge if this was the last active job;
/// otherwise the badge keeps animating for the remaining jobs.
fn settle_badge(state: &mut TrackerState, settled: BadgeState) -> Vec<Effect> {
    if state.active_job_count() > 0 {
        return Vec::new();
    }
    state.set_badge(settled);
    vec![Effect::UpdateBadge(settled), Effect::ScheduleBadgeReset]
}

fn ingest_success_message(result: Option<&Value>) -> String {
    if let Some(value) = result {
        if let Some(message) = value.get("mensagem").and_then(Value::as_str) {
            return message.to_string();
        }
        if let Some(raw) = value.as_str() {
            return raw.to_string();
        }
    }
    GENERIC_SUCCESS_MESSAGE.to_string()
}

fn report_download_target(result: Option<&Value>) -> Option<DownloadTarget> {
    let raw = result?.as_str()?.trim();
    if raw.is_empty() {
        return None;
    }
    if raw.starts_with("http://") || raw.starts_with("https://") {
        Some(DownloadTarget::Url(raw.to_string()))
    } else {
        Some(DownloadTarget::Filename(raw.to_string()))
    }
}
