use jobwatch_core::{
    update, Effect, JobType, Msg, PollObservation, TrackedJobSnapshot, TrackerState,
};

fn track(state: TrackerState, job_id: &str, job_type: JobType) -> (TrackerState, Vec<Effect>) {
    update(
        state,
        Msg::TrackRequested {
            job_id: job_id.to_string(),
            job_type,
        },
    )
}

fn observe(
    state: TrackerState,
    job_id: &str,
    observation: PollObservation,
) -> (TrackerState, Vec<Effect>) {
    update(
        state,
        Msg::PollObserved {
            job_id: job_id.to_string(),
            observation,
        },
    )
}

fn finished(result: serde_json::Value) -> PollObservation {
    PollObservation::Status {
        status: "finished".to_string(),
        result: Some(result),
        error: None,
    }
}

#[test]
fn start_tracking_is_idempotent() {
    let (state, effects) = track(TrackerState::new(), "i1", JobType::Ingest);
    let starts = effects
        .iter()
        .filter(|e| matches!(e, Effect::StartPollCycle { .. }))
        .count();
    assert_eq!(starts, 1);
    assert!(state.is_tracked("i1"));

    // Second request for the same job id is a no-op.
    let (state, effects) = track(state, "i1", JobType::Ingest);
    assert!(effects.is_empty());
    assert_eq!(state.active_job_count(), 1);
}

#[test]
fn registration_persists_the_full_set() {
    let (state, effects) = track(TrackerState::new(), "a", JobType::Ingest);
    let persisted = effects.iter().find_map(|e| match e {
        Effect::PersistTrackedJobs(snapshot) => Some(snapshot.clone()),
        _ => None,
    });
    assert_eq!(
        persisted,
        Some(vec![TrackedJobSnapshot {
            job_id: "a".to_string(),
            job_type: JobType::Ingest,
        }])
    );

    let (_, effects) = track(state, "b", JobType::Report);
    let persisted = effects
        .iter()
        .find_map(|e| match e {
            Effect::PersistTrackedJobs(snapshot) => Some(snapshot.clone()),
            _ => None,
        })
        .expect("persist effect");
    let ids: Vec<_> = persisted.iter().map(|s| s.job_id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b"]);
}

#[test]
fn terminal_state_removes_tracking() {
    let (state, _) = track(TrackerState::new(), "i1", JobType::Ingest);
    let (state, effects) = observe(state, "i1", finished(serde_json::json!("done")));

    assert!(!state.is_tracked("i1"));
    assert!(effects.iter().any(|e| matches!(
        e,
        Effect::StopPollCycle { job_id } if job_id == "i1"
    )));
    let persisted = effects
        .iter()
        .find_map(|e| match e {
            Effect::PersistTrackedJobs(snapshot) => Some(snapshot.clone()),
            _ => None,
        })
        .expect("persist effect");
    assert!(persisted.is_empty());

    // A stale report after the terminal state changes nothing.
    let (state, effects) = observe(state, "i1", finished(serde_json::json!("done")));
    assert!(effects.is_empty());
    assert_eq!(state.active_job_count(), 0);
}

#[test]
fn restart_resumes_exactly_the_persisted_set() {
    let snapshots = vec![
        TrackedJobSnapshot {
            job_id: "a".to_string(),
            job_type: JobType::Ingest,
        },
        TrackedJobSnapshot {
            job_id: "b".to_string(),
            job_type: JobType::Report,
        },
    ];

    let (state, effects) = update(TrackerState::new(), Msg::RestoreTrackedJobs(snapshots));

    assert!(state.is_tracked("a"));
    assert!(state.is_tracked("b"));
    assert_eq!(state.active_job_count(), 2);

    let resumed: Vec<_> = effects
        .iter()
        .filter_map(|e| match e {
            Effect::StartPollCycle { job_id, job_type } => Some((job_id.as_str(), *job_type)),
            _ => None,
        })
        .collect();
    assert_eq!(
        resumed,
        vec![("a", JobType::Ingest), ("b", JobType::Report)]
    );

    // The mirror ends up rewritten to match the rebuilt registry.
    let last_persist = effects
        .iter()
        .rev()
        .find_map(|e| match e {
            Effect::PersistTrackedJobs(snapshot) => Some(snapshot.clone()),
            _ => None,
        })
        .expect("persist effect");
    let ids: Vec<_> = last_persist.iter().map(|s| s.job_id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b"]);
}

#[test]
fn restoring_nothing_has_no_effects() {
    let (state, effects) = update(TrackerState::new(), Msg::RestoreTrackedJobs(Vec::new()));
    assert!(effects.is_empty());
    assert_eq!(state.active_job_count(), 0);
}
