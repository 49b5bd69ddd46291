//! Single-shot and continuous load modes over an [`Authenticator`].
//!
//! Continuous mode spawns one task per attempt and throttles the fan-out with
//! a semaphore sized to the thread count, so at most `threads` attempts are in
//! flight while new ones start as soon as a slot frees up.
mod reporter;
mod stats;

use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Semaphore, watch};
use tracing::debug;

use crate::auth::{AuthResult, Authenticator};
use crate::error::AuthError;

pub use stats::{Stats, WindowReport, failure_percent};

/// Default reporting window.
pub const REPORT_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadMode {
    Single,
    Continuous(NonZeroUsize),
}

impl LoadMode {
    /// `0` selects single-shot mode, anything else the continuous harness.
    #[must_use]
    pub fn from_threads(threads: usize) -> Self {
        NonZeroUsize::new(threads).map_or(Self::Single, Self::Continuous)
    }
}

/// Semaphore size for `threads`, capped at what tokio can hand out.
fn permit_count(threads: NonZeroUsize) -> usize {
    threads.get().min(Semaphore::MAX_PERMITS)
}

fn log_identity(result: &AuthResult) {
    debug!("User: {}", result.username);
    debug!("Project: {}", result.project_name);
}

/// Runs exactly one authentication.
///
/// # Errors
///
/// Returns whatever the authenticator reports.
pub async fn run_single<A>(authenticator: &A) -> Result<AuthResult, AuthError>
where
    A: Authenticator + ?Sized,
{
    let result = authenticator.authenticate().await?;
    log_identity(&result);
    Ok(result)
}

/// Continuous load generator sharing one authenticator between all workers.
#[derive(Debug)]
pub struct LoadHarness<A> {
    authenticator: Arc<A>,
    threads: NonZeroUsize,
    stats: Arc<Stats>,
    report_interval: Duration,
    reports_tx: watch::Sender<WindowReport>,
}

impl<A> LoadHarness<A>
where
    A: Authenticator + 'static,
{
    #[must_use]
    pub fn new(authenticator: Arc<A>, threads: NonZeroUsize, categorize_errors: bool) -> Self {
        let (reports_tx, _) = watch::channel(WindowReport::default());
        Self {
            authenticator,
            threads,
            stats: Arc::new(Stats::new(categorize_errors)),
            report_interval: REPORT_INTERVAL,
            reports_tx,
        }
    }

    #[must_use]
    pub const fn with_report_interval(mut self, report_interval: Duration) -> Self {
        self.report_interval = report_interval;
        self
    }

    #[must_use]
    pub fn stats(&self) -> Arc<Stats> {
        Arc::clone(&self.stats)
    }

    /// Subscribes to the snapshot published at the end of every window.
    #[must_use]
    pub fn reports(&self) -> watch::Receiver<WindowReport> {
        self.reports_tx.subscribe()
    }

    /// Dispatches attempts until the task is dropped or aborted. Failures are
    /// only counted, never propagated.
    pub async fn run(self) {
        let Self {
            authenticator,
            threads,
            stats,
            report_interval,
            reports_tx,
        } = self;

        let _reporter = reporter::spawn_reporter(Arc::clone(&stats), report_interval, reports_tx);
        let permits = Arc::new(Semaphore::new(permit_count(threads)));

        loop {
            let Ok(permit) = Arc::clone(&permits).acquire_owned().await else {
                break;
            };
            let authenticator = Arc::clone(&authenticator);
            let stats = Arc::clone(&stats);
            tokio::spawn(async move {
                match authenticator.authenticate().await {
                    Ok(result) => {
                        stats.record_success();
                        log_identity(&result);
                    }
                    Err(err) => stats.record_failure(&err),
                }
                drop(permit);
            });
        }
    }
}
