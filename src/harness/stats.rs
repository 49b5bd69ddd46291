use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};

use crate::error::AuthError;

/// Integer failure percentage; zero when nothing was attempted.
#[must_use]
pub fn failure_percent(failures: u64, attempts: u64) -> u64 {
    failures
        .saturating_mul(100)
        .checked_div(attempts)
        .unwrap_or(0)
}

/// Attempt counters shared by every worker and the reporter.
///
/// Workers bump the cumulative counters before the window counters, and the
/// reporter swaps the window before reading the totals, so a report never
/// shows a window larger than the running total. Within the window, attempts
/// are bumped before failures and failures are swapped before attempts, so a
/// window never holds more failures than attempts.
#[derive(Debug, Default)]
pub struct Stats {
    window_requests: AtomicU64,
    window_failures: AtomicU64,
    total_requests: AtomicU64,
    total_failures: AtomicU64,
    categorize_errors: bool,
    errors: RwLock<HashMap<String, AtomicU64>>,
}

impl Stats {
    #[must_use]
    pub fn new(categorize_errors: bool) -> Self {
        Self {
            categorize_errors,
            ..Self::default()
        }
    }

    pub fn record_success(&self) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        self.window_requests.fetch_add(1, Ordering::Release);
    }

    pub fn record_failure(&self, error: &AuthError) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        self.total_failures.fetch_add(1, Ordering::Relaxed);
        self.window_requests.fetch_add(1, Ordering::Release);
        self.window_failures.fetch_add(1, Ordering::Release);

        if self.categorize_errors {
            self.tally(error.category());
        }
    }

    fn tally(&self, category: String) {
        {
            let errors = self.errors.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(count) = errors.get(&category) {
                count.fetch_add(1, Ordering::Relaxed);
                return;
            }
        }
        let mut errors = self.errors.write().unwrap_or_else(PoisonError::into_inner);
        errors
            .entry(category)
            .or_default()
            .fetch_add(1, Ordering::Relaxed);
    }

    /// Cumulative `(attempts, failures)`.
    #[must_use]
    pub fn totals(&self) -> (u64, u64) {
        (
            self.total_requests.load(Ordering::Acquire),
            self.total_failures.load(Ordering::Acquire),
        )
    }

    /// Closes the current window: resets its counters and reports them next
    /// to the cumulative totals.
    pub fn take_window(&self) -> WindowReport {
        let failures = self.window_failures.swap(0, Ordering::AcqRel);
        let requests = self.window_requests.swap(0, Ordering::AcqRel);
        let (total_requests, total_failures) = self.totals();

        let errors = if self.categorize_errors {
            let errors = self.errors.read().unwrap_or_else(PoisonError::into_inner);
            let mut tally: Vec<(String, u64)> = errors
                .iter()
                .map(|(category, count)| (category.clone(), count.load(Ordering::Relaxed)))
                .collect();
            tally.sort();
            tally
        } else {
            Vec::new()
        };

        WindowReport {
            requests,
            failures,
            total_requests,
            total_failures,
            errors,
        }
    }
}

/// Snapshot produced once per reporting window.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WindowReport {
    pub requests: u64,
    pub failures: u64,
    pub total_requests: u64,
    pub total_failures: u64,
    /// Cumulative failures per category, sorted by category.
    pub errors: Vec<(String, u64)>,
}

impl WindowReport {
    #[must_use]
    pub fn failure_percent(&self) -> u64 {
        failure_percent(self.failures, self.requests)
    }

    #[must_use]
    pub fn total_failure_percent(&self) -> u64 {
        failure_percent(self.total_failures, self.total_requests)
    }

    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        let mut lines = Vec::with_capacity(self.errors.len().saturating_add(2));
        lines.push(format!(
            "{} rps, {} failed ({}%)",
            self.requests,
            self.failures,
            self.failure_percent()
        ));
        lines.push(format!(
            "total {} rps, {} failed: {}%",
            self.total_requests,
            self.total_failures,
            self.total_failure_percent()
        ));
        for (category, count) in &self.errors {
            lines.push(format!("ERROR: {} -> {}", category, count));
        }
        lines
    }
}
