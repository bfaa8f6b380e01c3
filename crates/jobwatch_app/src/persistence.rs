use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use jobwatch_core::{JobType, TrackedJobSnapshot};
use jobwatch_engine::{ensure_dir, AtomicFileWriter};
use serde::{Deserialize, Serialize};
use worker_logging::{worker_error, worker_info, worker_warn};

const STATE_FILENAME: &str = ".jobwatch_state.ron";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PersistedJob {
    #[serde(rename = "type")]
    job_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct PersistedState {
    jobs: BTreeMap<String, PersistedJob>,
}

/// Read the mirrored job set back once at startup. Every failure mode
/// degrades to "nothing to resume"; the mirror is never authoritative.
pub(crate) fn load_tracked_jobs(state_dir: &Path) -> Vec<TrackedJobSnapshot> {
    let path = state_dir.join(STATE_FILENAME);
    let content = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Vec::new();
        }
        Err(err) => {
            worker_warn!("Failed to read persisted jobs from {:?}: {}", path, err);
            return Vec::new();
        }
    };

    let state: PersistedState = match ron::from_str(&content) {
        Ok(state) => state,
        Err(err) => {
            worker_warn!("Failed to parse persisted jobs from {:?}: {}", path, err);
            return Vec::new();
        }
    };

    let jobs: Vec<TrackedJobSnapshot> = state
        .jobs
        .into_iter()
        .filter_map(|(job_id, job)| match JobType::parse(&job.job_type) {
            Some(job_type) => Some(TrackedJobSnapshot { job_id, job_type }),
            None => {
                worker_warn!("Skipping job {} with unknown type {:?}", job_id, job.job_type);
                None
            }
        })
        .collect();

    worker_info!("Loaded {} persisted job(s) from {:?}", jobs.len(), path);
    jobs
}

/// Mirror the full tracked set. Fire-and-forget: failures are logged and the
/// in-memory registry stays correct regardless.
pub(crate) fn save_tracked_jobs(state_dir: &Path, jobs: &[TrackedJobSnapshot]) {
    if let Err(err) = ensure_dir(state_dir) {
        worker_error!("Failed to ensure state dir {:?}: {}", state_dir, err);
        return;
    }

    let state = PersistedState {
        jobs: jobs
            .iter()
            .map(|job| {
                (
                    job.job_id.clone(),
                    PersistedJob {
                        job_type: job.job_type.as_str().to_string(),
                    },
                )
            })
            .collect(),
    };

    let pretty = ron::ser::PrettyConfig::new();
    let content = match ron::ser::to_string_pretty(&state, pretty) {
        Ok(text) => text,
        Err(err) => {
            worker_error!("Failed to serialize persisted jobs: {}", err);
            return;
        }
    };

    let writer = AtomicFileWriter::new(state_dir.to_path_buf());
    if let Err(err) = writer.write(STATE_FILENAME, &content) {
        worker_error!("Failed to write persisted jobs to {:?}: {}", state_dir, err);
    }
}
