use std::time::Duration;

/// Delay before a settled badge returns to idle, so rapid sequential job
/// completions do not flicker the badge.
pub const BADGE_RESET_GRACE: Duration = Duration::from_secs(3);

/// Process-wide badge state. Shared by all tracked jobs: the badge reflects
/// whether *any* job is still active, not per-job status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BadgeState {
    #[default]
    Idle,
    /// At least one job is tracked; the surface animates.
    Busy,
    /// The last tracked job finished; cleared after the grace delay.
    Success,
    /// The last tracked job failed; cleared after the grace delay.
    Failure,
}
