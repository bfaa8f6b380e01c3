//! Jobwatch core: pure job-tracking state machine and badge policy.
mod badge;
mod effect;
mod job;
mod msg;
mod state;
mod update;

pub use badge::{BadgeState, BADGE_RESET_GRACE};
pub use effect::{DownloadTarget, Effect, Notification, UiEvent};
pub use job::{JobId, JobType, TrackedJobSnapshot};
pub use msg::{Msg, PollObservation};
pub use state::TrackerState;
pub use update::{update, GENERIC_FAILURE_MESSAGE, GENERIC_SUCCESS_MESSAGE};
