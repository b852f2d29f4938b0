//! The process-wide scan scheduler.
//!
//! One long-lived task owned by the process root. Each tick lists the
//! currently connected accounts and runs the scheduled scan entry point.
//! Ticks are serialized: the next tick is not requested until the previous
//! scan has returned, so a slow cycle delays the cadence instead of
//! overlapping it. On-demand scans may still run concurrently with a tick;
//! the store's atomic conditional insert makes that harmless.

use std::sync::Arc;
use std::time::Duration;

use spendmail_gmail::MailProvider;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::scan::Scanner;

/// Default scan cadence.
pub const DEFAULT_PERIOD: Duration = Duration::from_secs(60);

/// Handle to the repeating scan task.
///
/// Only the owner of this handle can stop the task; nothing else in the
/// process can start a second one through it.
pub struct Scheduler {
    handle: JoinHandle<()>,
}

impl Scheduler {
    /// Start the repeating scan task.
    ///
    /// The first scan runs one full period after startup, matching a fixed
    /// cron cadence rather than firing immediately.
    #[must_use]
    pub fn start<M>(scanner: Arc<Scanner<M>>, period: Duration) -> Self
    where
        M: MailProvider + 'static,
    {
        info!(period_secs = period.as_secs(), "scan scheduler started");
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // interval yields its first tick immediately; consume it so the
            // loop below waits a full period before the first scan.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                debug!("scheduled scan tick");
                scanner.scan_all().await;
            }
        });
        Self { handle }
    }

    /// Whether the scan task is still alive.
    #[must_use]
    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }

    /// Stop the scan task.
    pub fn stop(self) {
        self.handle.abort();
    }
}
