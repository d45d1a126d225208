//! Sequential account removal under the API's request ceiling.
//!
//! The limiter is a fixed window, not a sliding one: up to
//! [`MAX_CALLS_PER_WINDOW`] calls may go out back to back, after which the
//! loop sleeps out whatever is left of the current second.

use crate::api::{DeleteOutcome, DirectoryUser, ZoomClient};
use std::time::{Duration, Instant};
use tracing::{info, warn};

pub const MAX_CALLS_PER_WINDOW: u32 = 10;
pub const WINDOW: Duration = Duration::from_secs(1);

/// Added to every enforced pause so the next call lands past the boundary
pub const SAFETY_MARGIN: Duration = Duration::from_millis(1);

/// Mutable timer state for the fixed window
#[derive(Debug, Clone)]
pub struct RateWindow {
    window_start: Instant,
    calls_in_window: u32,
}

impl RateWindow {
    pub fn new(now: Instant) -> Self {
        Self {
            window_start: now,
            calls_in_window: 0,
        }
    }

    pub fn calls_in_window(&self) -> u32 {
        self.calls_in_window
    }

    /// Records one issued call at `now`.
    ///
    /// Returns how long to sleep when the window is full. After sleeping the
    /// caller must [`RateWindow::restart`] the window. A window that has
    /// already run for a second or more is restarted here without a pause.
    pub fn record_call(&mut self, now: Instant) -> Option<Duration> {
        self.calls_in_window += 1;
        let elapsed = now.saturating_duration_since(self.window_start);

        if elapsed < WINDOW && self.calls_in_window == MAX_CALLS_PER_WINDOW {
            Some(WINDOW - elapsed + SAFETY_MARGIN)
        } else if elapsed >= WINDOW {
            self.restart(now);
            None
        } else {
            None
        }
    }

    /// Opens a new window at `now`, counting the call that triggered it.
    pub fn restart(&mut self, now: Instant) {
        self.window_start = now;
        self.calls_in_window = 1;
    }
}

/// Tally of one deprovisioning pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeprovisionReport {
    pub attempted: usize,
    /// Delete calls that echoed the requested id
    pub deprovisioned: usize,
    pub already_absent: usize,
    pub failed: usize,
    /// Rate limit sleeps taken
    pub pauses: usize,
}

pub async fn deprovision_users(
    client: &ZoomClient,
    targets: &[DirectoryUser],
) -> DeprovisionReport {
    let mut report = DeprovisionReport::default();
    let mut window = RateWindow::new(Instant::now());

    for user in targets {
        report.attempted += 1;
        let Some(id) = user.id.as_deref() else {
            warn!("User {} has no id in the listing; skipping delete", user.email);
            report.failed += 1;
            continue;
        };

        match client.delete_user(id).await {
            Ok(DeleteOutcome::Deleted) => report.deprovisioned += 1,
            Ok(DeleteOutcome::AlreadyAbsent) => {
                info!("User {} ({}) was already removed", user.email, id);
                report.already_absent += 1;
            }
            Ok(DeleteOutcome::Mismatch { returned }) => {
                warn!(
                    "Delete of {} ({}) returned id {:?}; not counted as deprovisioned",
                    user.email, id, returned
                );
                report.failed += 1;
            }
            Err(e) => {
                warn!("Delete of {} ({}) failed: {}", user.email, id, e);
                report.failed += 1;
            }
        }

        if let Some(pause) = window.record_call(Instant::now()) {
            info!("Waiting to ensure Zoom request time restrictions are met.");
            tokio::time::sleep(pause).await;
            window.restart(Instant::now());
            report.pauses += 1;
        }
    }

    info!("Number of users deprovisioned: {}", report.deprovisioned);
    if report.already_absent > 0 {
        info!(
            "Number of users already absent (treated as deprovisioned): {}",
            report.already_absent
        );
    }
    if report.failed > 0 {
        warn!("Number of users not deprovisioned: {}", report.failed);
    }

    report
}
