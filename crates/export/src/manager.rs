//! The export manager: dispatch, tracking, download and cancellation.
//!
//! [`ExportManager`] owns the job store and every poller it starts. Dropping
//! the manager (or calling [`ExportManager::dispose_all`]) stops all pollers.
//!
//! # Example
//!
//! ```rust,ignore
//! use coverage_export::{ExportManager, export_options};
//!
//! let manager = ExportManager::from_config(&config)?;
//! let options = manager.options(DataType::Teams, &filters);
//! let job = manager.submit(&options[1], &filters).await?;
//! let finished = manager.wait_until_settled(&job.job_id).await;
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use coverage_client::{
    ClientError, DataType, ExportApi, ExportClient, ExportFilters, ExportJob, ExportStatus,
    MetricsCollector,
};
use coverage_config::Config;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::error::{CancelError, DispatchError, RetrievalError};
use crate::options::{ExportOption, export_options};
use crate::scheduler::{PollContext, poll_until_terminal};
use crate::sink::{ArtifactSink, DirectorySink, artifact_filename};
use crate::store::{ActiveExport, JobStore, Poller};

/// Interval between status queries for each active job.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(2000);

/// Tracks server-side export jobs for one consumer.
pub struct ExportManager {
    api: Arc<dyn ExportApi>,
    sink: Arc<dyn ArtifactSink>,
    store: Arc<JobStore>,
    poll_interval: Duration,
    metrics: Option<MetricsCollector>,
}

/// Restores the in-flight flag if a submission is abandoned before it is
/// acknowledged, including when the submitting future is dropped.
///
/// The flag goes back to what it was before the submission, so an export
/// that is still being tracked keeps it set.
struct DispatchGuard<'a> {
    store: &'a JobStore,
    previous: ActiveExport,
    armed: bool,
}

impl DispatchGuard<'_> {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for DispatchGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut state = self.store.lock();
        if state.active == ActiveExport::Submitting {
            let restored = match std::mem::take(&mut self.previous) {
                ActiveExport::Tracking(job_id)
                    if state.get(&job_id).is_some_and(|job| job.poller.is_some()) =>
                {
                    ActiveExport::Tracking(job_id)
                }
                ActiveExport::Tracking(_) => ActiveExport::Idle,
                other => other,
            };
            state.active = restored;
        }
        drop(state);
        self.store.notify();
    }
}

impl ExportManager {
    pub fn new(api: Arc<dyn ExportApi>, sink: Arc<dyn ArtifactSink>) -> Self {
        Self {
            api,
            sink,
            store: Arc::new(JobStore::new()),
            poll_interval: DEFAULT_POLL_INTERVAL,
            metrics: None,
        }
    }

    /// Manager talking to the configured API and saving into the
    /// configured download directory.
    pub fn from_config(config: &Config) -> Result<Self, ClientError> {
        let client = ExportClient::builder().from_config(config).build()?;
        Ok(Self::new(
            Arc::new(client),
            Arc::new(DirectorySink::new(config.export.download_dir.clone())),
        )
        .with_poll_interval(config.export.poll_interval))
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Record job outcomes and poll failures.
    pub fn with_metrics(mut self, metrics: MetricsCollector) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Export options for `data_type`, stamped with today's date.
    pub fn options(&self, data_type: DataType, filters: &ExportFilters) -> Vec<ExportOption> {
        export_options(data_type, filters)
    }

    /// Submit `option` and start tracking the resulting job.
    ///
    /// The job is stored under the id the API assigned, with the status it
    /// acknowledged. A job acknowledged as already terminal is stored but not
    /// polled.
    ///
    /// # Errors
    ///
    /// [`DispatchError::Rejected`] when the API rejects or cannot be reached;
    /// nothing is stored. [`DispatchError::Disposed`] after teardown.
    pub async fn submit(
        &self,
        option: &ExportOption,
        filters: &ExportFilters,
    ) -> Result<ExportJob, DispatchError> {
        let previous = {
            let mut state = self.store.lock();
            if state.disposed {
                return Err(DispatchError::Disposed);
            }
            std::mem::replace(&mut state.active, ActiveExport::Submitting)
        };
        self.store.notify();
        let guard = DispatchGuard {
            store: &self.store,
            previous,
            armed: true,
        };

        let request = option.to_request(filters);
        let job = match self.api.create_export(&request).await {
            Ok(job) => job,
            Err(source) => {
                warn!(option = %option.id, error = %source, "Export submission failed");
                return Err(DispatchError::Rejected(source));
            }
        };

        {
            let mut state = self.store.lock();
            if state.disposed {
                warn!(job_id = %job.job_id, "Export acknowledged after teardown, not tracking it");
                return Err(DispatchError::Disposed);
            }

            state.insert(job.clone());
            if job.is_terminal() {
                if state.active == ActiveExport::Submitting {
                    state.active = ActiveExport::Idle;
                }
                if let Some(m) = &self.metrics {
                    m.record_export_finished(job.status);
                }
            } else {
                let generation = state.next_generation();
                let task = tokio::spawn(poll_until_terminal(
                    self.poll_context(),
                    job.job_id.clone(),
                    generation,
                ));
                if let Some(tracked) = state.get_mut(&job.job_id) {
                    tracked.poller = Some(Poller {
                        handle: task.abort_handle(),
                        generation,
                    });
                }
                state.active = ActiveExport::Tracking(job.job_id.clone());
            }
        }
        guard.disarm();
        self.store.notify();

        info!(
            job_id = %job.job_id,
            status = %job.status,
            data_type = %option.data_type,
            format = %option.format,
            "Export job submitted"
        );
        Ok(job)
    }

    fn poll_context(&self) -> PollContext {
        PollContext {
            api: Arc::clone(&self.api),
            store: Arc::clone(&self.store),
            interval: self.poll_interval,
            metrics: self.metrics.clone(),
        }
    }

    /// Every tracked job, in submission order.
    pub fn jobs(&self) -> Vec<ExportJob> {
        self.store
            .lock()
            .jobs_in_order()
            .map(|tracked| tracked.snapshot.clone())
            .collect()
    }

    /// Latest snapshot of `job_id`.
    pub fn job(&self, job_id: &str) -> Option<ExportJob> {
        self.store
            .lock()
            .get(job_id)
            .map(|tracked| tracked.snapshot.clone())
    }

    /// Whether a user-initiated export is still in flight.
    pub fn is_exporting(&self) -> bool {
        self.store.lock().active != ActiveExport::Idle
    }

    pub fn is_polling(&self, job_id: &str) -> bool {
        self.store
            .lock()
            .get(job_id)
            .is_some_and(|tracked| tracked.poller.is_some())
    }

    /// Number of jobs currently being polled.
    pub fn active_pollers(&self) -> usize {
        self.store
            .lock()
            .jobs_in_order()
            .filter(|tracked| tracked.poller.is_some())
            .count()
    }

    /// Receiver whose value changes on every store mutation.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.store.subscribe()
    }

    /// Wait until `job_id` is no longer polled and return its final snapshot.
    ///
    /// Returns immediately for jobs that are not being polled.
    pub async fn wait_until_settled(&self, job_id: &str) -> Option<ExportJob> {
        let mut revisions = self.subscribe();
        loop {
            if !self.is_polling(job_id) {
                return self.job(job_id);
            }
            if revisions.changed().await.is_err() {
                return self.job(job_id);
            }
        }
    }

    /// Download the artifact of a completed job and save it.
    ///
    /// # Errors
    ///
    /// Fails without touching the store when the job is unknown or not
    /// completed, when the artifact cannot be fetched, or when saving fails.
    pub async fn download(&self, job_id: &str) -> Result<PathBuf, RetrievalError> {
        let result = self.try_download(job_id).await;
        if let Err(error) = &result {
            warn!(job_id, error = %error, "Export download failed");
        }
        result
    }

    async fn try_download(&self, job_id: &str) -> Result<PathBuf, RetrievalError> {
        let snapshot = {
            let state = self.store.lock();
            if state.disposed {
                return Err(RetrievalError::Disposed);
            }
            let tracked = state
                .get(job_id)
                .ok_or_else(|| RetrievalError::UnknownJob(job_id.to_string()))?;
            if tracked.snapshot.status != ExportStatus::Completed {
                return Err(RetrievalError::NotReady {
                    job_id: job_id.to_string(),
                    status: tracked.snapshot.status,
                });
            }
            tracked.snapshot.clone()
        };

        let bytes = self
            .api
            .download(job_id)
            .await
            .map_err(|source| RetrievalError::Transport {
                job_id: job_id.to_string(),
                source,
            })?;

        let filename = artifact_filename(&snapshot);
        let path = self
            .sink
            .save(&filename, bytes)
            .await
            .map_err(|source| RetrievalError::Save {
                filename: filename.clone(),
                source,
            })?;

        info!(job_id, path = %path.display(), "Export artifact saved");
        Ok(path)
    }

    /// Ask the API to cancel `job_id`.
    ///
    /// Once acknowledged, polling stops immediately and a still-active job is
    /// marked `cancelled` without waiting for the next poll. A job that
    /// already reached another terminal state keeps it.
    ///
    /// # Errors
    ///
    /// [`CancelError::Transport`] when the request fails; the stored job is
    /// left exactly as it was.
    pub async fn cancel(&self, job_id: &str) -> Result<(), CancelError> {
        if self.store.lock().disposed {
            return Err(CancelError::Disposed);
        }

        if let Err(source) = self.api.cancel(job_id).await {
            let error = CancelError::Transport {
                job_id: job_id.to_string(),
                source,
            };
            warn!(error = %error, "Export cancellation failed");
            return Err(error);
        }

        let cancelled = {
            let mut state = self.store.lock();
            if state.disposed {
                return Ok(());
            }
            let cancelled = match state.get_mut(job_id) {
                Some(tracked) => {
                    tracked.stop_polling();
                    if tracked.snapshot.status.is_active() {
                        tracked.snapshot.status = ExportStatus::Cancelled;
                        true
                    } else {
                        false
                    }
                }
                None => false,
            };
            state.release_if_tracking(job_id);
            cancelled
        };
        self.store.notify();

        if cancelled && let Some(m) = &self.metrics {
            m.record_export_finished(ExportStatus::Cancelled);
        }
        info!(job_id, "Export job cancelled");
        Ok(())
    }

    /// Stop every poller and refuse further work. Idempotent.
    ///
    /// Stored jobs remain readable.
    pub fn dispose_all(&self) {
        let stopped = {
            let mut state = self.store.lock();
            if state.disposed {
                return;
            }
            state.disposed = true;
            state.active = ActiveExport::Idle;
            let mut stopped = 0;
            for tracked in state.jobs_mut() {
                if tracked.poller.is_some() {
                    tracked.stop_polling();
                    stopped += 1;
                }
            }
            stopped
        };
        self.store.notify();
        debug!(stopped, "Export manager disposed");
    }

    pub fn is_disposed(&self) -> bool {
        self.store.lock().disposed
    }
}

impl Drop for ExportManager {
    fn drop(&mut self) {
        self.dispose_all();
    }
}
