//! Simulated progress timers.
//!
//! The backend exposes no transfer telemetry, so each long-running operation
//! animates a bar from a fixed-interval timer with randomized increments.
//! The timer is deliberately decoupled from the real request: the response
//! resolving is what drives the terminal UI state, and the timer must be
//! cancelled on every exit path so a stale bar never keeps advancing.

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressInfo {
    pub percentage: f64,
    pub stage: &'static str,
}

pub type ProgressCallback = Arc<dyn Fn(ProgressInfo) + Send + Sync>;

/// Timing and stage labels for one operation's simulated bar.
#[derive(Debug, Clone, Copy)]
pub struct ProgressProfile {
    pub tick: Duration,
    /// Upper bound of the random increment per tick.
    pub max_step: f64,
    /// Percentage the simulation will not advance past on its own.
    pub cap: f64,
    /// `(upper_threshold, label)` pairs, ascending.
    pub stages: &'static [(f64, &'static str)],
    /// Label once past every threshold.
    pub final_stage: &'static str,
}

impl ProgressProfile {
    /// The Drive flow ran two staggered bars in the original UI, one for the
    /// server-side download stage and one for the upload proper; collapsed
    /// here into a single staged timeline.
    pub fn drive_process() -> Self {
        Self {
            tick: Duration::from_millis(1200),
            max_step: 9.0,
            cap: 100.0,
            stages: &[
                (15.0, "Initializing download..."),
                (35.0, "Downloading video..."),
                (50.0, "Processing video..."),
                (65.0, "Preparing for upload..."),
                (85.0, "Uploading to Google Drive..."),
                (95.0, "Finalizing upload..."),
            ],
            final_stage: "Upload complete!",
        }
    }

    pub fn host_upload() -> Self {
        Self {
            tick: Duration::from_millis(1000),
            max_step: 5.0,
            // Holds short of done until the real response lands.
            cap: 95.0,
            stages: &[
                (30.0, "Preparing video for YouTube..."),
                (60.0, "Uploading to YouTube..."),
                (90.0, "Processing on YouTube servers..."),
            ],
            final_stage: "Processing on YouTube servers...",
        }
    }

    pub fn stage_for(&self, percentage: f64) -> &'static str {
        for (threshold, label) in self.stages.iter().copied() {
            if percentage < threshold {
                return label;
            }
        }
        self.final_stage
    }
}

/// A running simulated bar. Dropping it cancels the timer, so holding it for
/// the duration of the real request guarantees cleanup on success, failure,
/// and early return alike.
pub struct SimulatedProgress {
    handle: JoinHandle<()>,
}

impl SimulatedProgress {
    pub fn start(profile: ProgressProfile, callback: ProgressCallback) -> Self {
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(profile.tick);
            // the immediate first tick
            interval.tick().await;

            let mut percentage: f64 = 0.0;
            loop {
                interval.tick().await;

                let step = rand::rng().random_range(0.0..profile.max_step);
                percentage = (percentage + step).min(profile.cap);
                callback(ProgressInfo {
                    percentage,
                    stage: profile.stage_for(percentage),
                });

                if percentage >= profile.cap {
                    break;
                }
            }
        });

        Self { handle }
    }

    /// Stop the timer. Equivalent to dropping, but explicit at call sites
    /// where the real request just resolved.
    pub fn stop(self) {}
}

impl Drop for SimulatedProgress {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
