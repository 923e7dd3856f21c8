//! Periodic report refresh.
//!
//! Runs the [`DataManager`] on a tokio interval and sends each
//! [`DashboardSnapshot`] through an `mpsc` channel, so the watch view
//! consumes fresh reports without any shared mutable state.

use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Utc};
use liftlog_core::models::DashboardReport;
use liftlog_core::settings::DashboardConfig;
use liftlog_core::time_utils::{today_in, MonthKey};
use liftlog_data::analysis::ReportRequest;
use tokio::sync::mpsc;
use tokio::time;

use crate::data_manager::DataManager;

// ── Public types ──────────────────────────────────────────────────────────────

/// One refresh result forwarded to the presentation layer.
#[derive(Debug, Clone)]
pub struct DashboardSnapshot {
    pub generated_at: DateTime<Utc>,
    /// Month the report was computed for.
    pub month: MonthKey,
    /// The report, or the message of the error that prevented it.
    pub outcome: Result<DashboardReport, String>,
}

// ── RefreshOrchestrator ───────────────────────────────────────────────────────

/// Background refresh coordinator.
///
/// Call [`RefreshOrchestrator::start`] to spawn the refresh loop and receive
/// the channel endpoint for snapshots.
pub struct RefreshOrchestrator {
    /// How often to rebuild the report.
    update_interval: Duration,
    source: PathBuf,
    config: DashboardConfig,
    /// Timezone used to decide "today" and the current month.
    timezone: String,
    /// Fixed month to report on; follows the calendar when `None`.
    month: Option<MonthKey>,
}

impl RefreshOrchestrator {
    pub fn new(
        update_interval_secs: u64,
        source: PathBuf,
        config: DashboardConfig,
        timezone: String,
        month: Option<MonthKey>,
    ) -> Self {
        Self {
            update_interval: Duration::from_secs(update_interval_secs.max(1)),
            source,
            config,
            timezone,
            month,
        }
    }

    /// Spawn the refresh loop.
    ///
    /// Returns the receiver for snapshots and a [`RefreshHandle`] that stops
    /// the loop.
    pub fn start(self) -> (mpsc::Receiver<DashboardSnapshot>, RefreshHandle) {
        let (tx, rx) = mpsc::channel(16);

        let handle = tokio::spawn(async move {
            self.refresh_loop(tx).await;
        });

        (rx, RefreshHandle { handle })
    }

    // ── Private implementation ────────────────────────────────────────────

    /// Refresh immediately, then on every `update_interval` tick until the
    /// receiver is dropped.
    async fn refresh_loop(self, tx: mpsc::Sender<DashboardSnapshot>) {
        let mut data_manager = Some(DataManager::new(self.source.clone()));

        self.refresh_and_send(&mut data_manager, &tx).await;

        let mut interval = time::interval(self.update_interval);
        // The first tick fires immediately; the initial refresh covered it.
        interval.tick().await;

        loop {
            interval.tick().await;

            if tx.is_closed() {
                tracing::debug!("snapshot channel closed; exiting loop");
                break;
            }

            self.refresh_and_send(&mut data_manager, &tx).await;
        }
    }

    fn request(&self) -> ReportRequest {
        let today = today_in(&self.timezone);
        ReportRequest {
            month: self.month.unwrap_or_else(|| MonthKey::of(today)),
            today,
            config: self.config.clone(),
        }
    }

    /// Build a report on the blocking pool and send the snapshot.
    async fn refresh_and_send(
        &self,
        data_manager: &mut Option<DataManager>,
        tx: &mpsc::Sender<DashboardSnapshot>,
    ) {
        let request = self.request();
        let month = request.month;
        let mut mgr = data_manager
            .take()
            .unwrap_or_else(|| DataManager::new(self.source.clone()));

        let joined = tokio::task::spawn_blocking(move || {
            let outcome = mgr.report(&request).map_err(|e| e.to_string());
            (mgr, outcome)
        })
        .await;

        let outcome = match joined {
            Ok((mgr, outcome)) => {
                *data_manager = Some(mgr);
                outcome
            }
            Err(e) => {
                tracing::error!(error = %e, "report task failed");
                Err(format!("report task failed: {e}"))
            }
        };

        let snapshot = DashboardSnapshot {
            generated_at: Utc::now(),
            month,
            outcome,
        };

        if let Err(e) = tx.send(snapshot).await {
            tracing::warn!(error = %e, "failed to send snapshot; receiver dropped");
        }
    }
}

// ── RefreshHandle ─────────────────────────────────────────────────────────────

/// Handle to the background refresh task.
pub struct RefreshHandle {
    handle: tokio::task::JoinHandle<()>,
}

impl RefreshHandle {
    /// Immediately abort the refresh loop.
    pub fn abort(&self) {
        self.handle.abort();
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
