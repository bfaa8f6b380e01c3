use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use jobwatch_core::BadgeState;

use crate::protocol::{OutboundEvent, UiBridge};

/// Glyphs cycled while any job is active.
const LOADING_FRAMES: [&str; 4] = ["-", "\\", "|", "/"];
/// Delay between animation frames.
const FRAME_INTERVAL: Duration = Duration::from_millis(200);

const DEFAULT_COLOR: &str = "#0366d6";
const SUCCESS_COLOR: &str = "#28a745";
const FAILURE_COLOR: &str = "#dc3545";

/// Renders badge states onto the UI surface. One animator per process; all
/// tracked jobs share it.
pub(crate) struct BadgeAnimator {
    bridge: UiBridge,
    animating: Arc<AtomicBool>,
}

impl BadgeAnimator {
    pub fn new(bridge: UiBridge) -> Self {
        Self {
            bridge,
            animating: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn apply(&self, badge: BadgeState) {
        match badge {
            BadgeState::Busy => self.start_animation(),
            BadgeState::Success => {
                self.stop_animation();
                self.publish("\u{2713}", SUCCESS_COLOR);
            }
            BadgeState::Failure => {
                self.stop_animation();
                self.publish("!", FAILURE_COLOR);
            }
            BadgeState::Idle => {
                self.stop_animation();
                self.publish("", DEFAULT_COLOR);
            }
        }
    }

    /// Idempotent: a second busy transition joins the running animation.
    fn start_animation(&self) {
        if self.animating.swap(true, Ordering::SeqCst) {
            return;
        }
        let bridge = self.bridge.clone();
        let animating = self.animating.clone();
        thread::spawn(move || {
            let mut frame = 0usize;
            while animating.load(Ordering::SeqCst) {
                bridge.publish(&OutboundEvent::Badge {
                    text: LOADING_FRAMES[frame].to_string(),
                    color: DEFAULT_COLOR.to_string(),
                });
                frame = (frame + 1) % LOADING_FRAMES.len();
                thread::sleep(FRAME_INTERVAL);
            }
        });
    }

    fn stop_animation(&self) {
        self.animating.store(false, Ordering::SeqCst);
    }

    fn publish(&self, text: &str, color: &str) {
        self.bridge.publish(&OutboundEvent::Badge {
            text: text.to_string(),
            color: color.to_string(),
        });
    }
}
