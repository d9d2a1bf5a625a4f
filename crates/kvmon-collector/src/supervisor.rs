use crate::fetcher::{Fetcher, HttpFetcher};
use crate::poller::Poller;
use anyhow::Result;
use kvmon_common::TargetSet;
use kvmon_storage::MetricStore;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Owns the poller tasks, one per target.
///
/// Pollers only share the metric store. A poller task that ends abnormally
/// is logged on shutdown and never respawned.
pub struct Supervisor {
    shutdown: CancellationToken,
    handles: Vec<JoinHandle<()>>,
}

impl Supervisor {
    /// Starts one HTTP poller per target against `base_uri`. All pollers
    /// share a single HTTP client.
    pub fn start(
        targets: TargetSet,
        base_uri: &str,
        store: Arc<MetricStore>,
        interval: Duration,
        shutdown: CancellationToken,
    ) -> Result<Self> {
        let fetcher: Arc<dyn Fetcher> = Arc::new(HttpFetcher::new(base_uri)?);
        Ok(Self::start_with_fetcher(
            targets, fetcher, store, interval, shutdown,
        ))
    }

    /// Starts one poller per target using the given fetcher.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start_with_fetcher(
        targets: TargetSet,
        fetcher: Arc<dyn Fetcher>,
        store: Arc<MetricStore>,
        interval: Duration,
        shutdown: CancellationToken,
    ) -> Self {
        if targets.is_empty() {
            tracing::warn!("No KV targets configured, nothing will be polled");
        }

        let handles = targets
            .into_iter()
            .map(|target| {
                let poller = Poller::new(target, fetcher.clone(), store.clone(), interval);
                tokio::spawn(poller.run(shutdown.child_token()))
            })
            .collect::<Vec<_>>();

        tracing::info!(
            pollers = handles.len(),
            interval_secs = interval.as_secs_f64(),
            "KV pollers started"
        );

        Self { shutdown, handles }
    }

    pub fn poller_count(&self) -> usize {
        self.handles.len()
    }

    /// Cancels every poller and waits for the tasks to finish.
    pub async fn shutdown(self) {
        self.shutdown.cancel();
        self.join().await;
    }

    /// Waits for the poller tasks without cancelling them; returns once the
    /// shutdown token has been cancelled elsewhere and every task exited.
    pub async fn join(self) {
        for handle in self.handles {
            if let Err(e) = handle.await {
                tracing::error!(error = %e, "Poller task panicked");
            }
        }
        tracing::info!("KV pollers stopped");
    }
}
