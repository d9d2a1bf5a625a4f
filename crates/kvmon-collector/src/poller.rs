use crate::fetcher::Fetcher;
use crate::parser::parse_entries;
use kvmon_common::Target;
use kvmon_storage::MetricStore;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Result of one fetch → parse → update pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The listing decoded; `stored` entries were written, `skipped` records
    /// were rejected individually.
    Updated { stored: usize, skipped: usize },
    FetchFailed,
    DecodeFailed,
}

/// Polls one target forever, feeding the shared metric store.
///
/// Cycles never overlap for the same target, and every cycle is followed by
/// a full interval sleep whatever its outcome, so an unreachable store is
/// retried at the configured rate rather than in a tight loop.
pub struct Poller {
    target: Target,
    fetcher: Arc<dyn Fetcher>,
    store: Arc<MetricStore>,
    interval: Duration,
}

impl Poller {
    pub fn new(
        target: Target,
        fetcher: Arc<dyn Fetcher>,
        store: Arc<MetricStore>,
        interval: Duration,
    ) -> Self {
        Self {
            target,
            fetcher,
            store,
            interval,
        }
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    /// Runs cycles until `shutdown` is cancelled. Cancellation is observed
    /// both while fetching and while sleeping.
    pub async fn run(self, shutdown: CancellationToken) {
        tracing::info!(
            dc = %self.target.dc,
            directory = %self.target.directory,
            interval_secs = self.interval.as_secs_f64(),
            "Poller started"
        );

        loop {
            let outcome = tokio::select! {
                _ = shutdown.cancelled() => break,
                outcome = self.poll_once() => outcome,
            };

            if let CycleOutcome::Updated { stored, skipped } = outcome {
                tracing::debug!(
                    dc = %self.target.dc,
                    directory = %self.target.directory,
                    stored,
                    skipped,
                    "Poll cycle complete"
                );
            }

            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = tokio::time::sleep(self.interval) => {}
            }
        }

        tracing::info!(
            dc = %self.target.dc,
            directory = %self.target.directory,
            "Poller stopped"
        );
    }

    /// Performs a single cycle without sleeping. Errors are logged here and
    /// reported through the returned [`CycleOutcome`]; the store is only
    /// touched when the listing decodes.
    pub async fn poll_once(&self) -> CycleOutcome {
        let body = match self.fetcher.fetch(&self.target).await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!(
                    dc = %self.target.dc,
                    directory = %self.target.directory,
                    error = %e,
                    "Failed to fetch KV listing"
                );
                return CycleOutcome::FetchFailed;
            }
        };

        let parsed = match parse_entries(&body) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!(
                    dc = %self.target.dc,
                    directory = %self.target.directory,
                    error = %e,
                    "Failed to parse KV listing"
                );
                return CycleOutcome::DecodeFailed;
            }
        };

        for skipped in &parsed.skipped {
            tracing::warn!(
                dc = %self.target.dc,
                directory = %self.target.directory,
                index = skipped.index,
                error = %skipped.error,
                "Skipping malformed KV record"
            );
        }

        let stored = parsed.entries.len();
        for entry in parsed.entries {
            self.store.record(&entry.into_observation(&self.target.dc));
        }

        CycleOutcome::Updated {
            stored,
            skipped: parsed.skipped.len(),
        }
    }
}
