use std::sync::Arc;
use std::time::Duration;

use tokio::{
    sync::watch,
    task::JoinHandle,
    time::{MissedTickBehavior, interval},
};
use tracing::info;

use super::stats::{Stats, WindowReport};

/// Handle to the reporter task; the task stops when this is dropped.
pub(crate) struct ReporterHandle(JoinHandle<()>);

impl Drop for ReporterHandle {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Spawns the periodic reporter. Every tick closes the current window, logs
/// its lines and publishes the snapshot on `reports_tx`.
pub(crate) fn spawn_reporter(
    stats: Arc<Stats>,
    period: Duration,
    reports_tx: watch::Sender<WindowReport>,
) -> ReporterHandle {
    ReporterHandle(tokio::spawn(async move {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // The first tick completes immediately.
        ticker.tick().await;

        loop {
            ticker.tick().await;
            let report = stats.take_window();
            for line in report.lines() {
                info!("{}", line);
            }
            reports_tx.send_replace(report);
        }
    }))
}
