//! In-memory job store shared by the manager and its pollers.
//!
//! # Invariants
//! - Each job's entry is written by the dispatcher on insert, then only by
//!   that job's current poller or by an acknowledged cancellation.
//! - Poll results are replaced wholesale (snapshot replace), never merged.
//! - A poller may only write while its generation is registered; aborting or
//!   replacing it unregisters the generation first.
//! - Entries are never evicted.
//! - After disposal no poller is registered and none can be added.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use coverage_client::{ExportJob, ExportStatus};
use tokio::sync::watch;
use tokio::task::AbortHandle;

/// Which export the one-at-a-time UI flag is waiting on.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub(crate) enum ActiveExport {
    #[default]
    Idle,
    /// A submission has been sent and not yet acknowledged.
    Submitting,
    /// The acknowledged job whose terminal state will clear the flag.
    Tracking(String),
}

#[derive(Debug)]
pub(crate) struct Poller {
    pub(crate) handle: AbortHandle,
    pub(crate) generation: u64,
}

#[derive(Debug)]
pub(crate) struct TrackedJob {
    pub(crate) snapshot: ExportJob,
    pub(crate) poller: Option<Poller>,
}

impl TrackedJob {
    /// Stop this job's poller, if any. Its outstanding queries are dropped.
    pub(crate) fn stop_polling(&mut self) {
        if let Some(poller) = self.poller.take() {
            poller.handle.abort();
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct StoreState {
    jobs: HashMap<String, TrackedJob>,
    order: Vec<String>,
    pub(crate) active: ActiveExport,
    pub(crate) disposed: bool,
    next_generation: u64,
}

impl StoreState {
    pub(crate) fn get(&self, job_id: &str) -> Option<&TrackedJob> {
        self.jobs.get(job_id)
    }

    pub(crate) fn get_mut(&mut self, job_id: &str) -> Option<&mut TrackedJob> {
        self.jobs.get_mut(job_id)
    }

    /// Insert or replace a job. A replaced job's poller is stopped.
    pub(crate) fn insert(&mut self, snapshot: ExportJob) {
        let job_id = snapshot.job_id.clone();
        match self.jobs.get_mut(&job_id) {
            Some(existing) => {
                existing.stop_polling();
                existing.snapshot = snapshot;
            }
            None => {
                self.order.push(job_id.clone());
                self.jobs.insert(
                    job_id,
                    TrackedJob {
                        snapshot,
                        poller: None,
                    },
                );
            }
        }
    }

    /// Reserve the generation for a poller about to be spawned.
    pub(crate) fn next_generation(&mut self) -> u64 {
        self.next_generation += 1;
        self.next_generation
    }

    pub(crate) fn jobs_in_order(&self) -> impl Iterator<Item = &TrackedJob> {
        self.order.iter().filter_map(|id| self.jobs.get(id))
    }

    pub(crate) fn jobs_mut(&mut self) -> impl Iterator<Item = &mut TrackedJob> {
        self.jobs.values_mut()
    }

    /// Clear the in-flight flag if `job_id` is the export it waits on.
    pub(crate) fn release_if_tracking(&mut self, job_id: &str) {
        if matches!(&self.active, ActiveExport::Tracking(id) if id == job_id) {
            self.active = ActiveExport::Idle;
        }
    }

    fn owns(&self, job_id: &str, generation: u64) -> bool {
        self.jobs
            .get(job_id)
            .and_then(|job| job.poller.as_ref())
            .is_some_and(|poller| poller.generation == generation)
    }
}

/// Shared job store plus the revision channel observers subscribe to.
#[derive(Debug)]
pub(crate) struct JobStore {
    state: Mutex<StoreState>,
    revision: watch::Sender<u64>,
}

impl Default for JobStore {
    fn default() -> Self {
        Self::new()
    }
}

impl JobStore {
    pub(crate) fn new() -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            state: Mutex::new(StoreState::default()),
            revision,
        }
    }

    /// Lock the state. A poisoned lock is recovered; every mutation leaves
    /// the state consistent before it can panic.
    pub(crate) fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Tell observers the store changed.
    pub(crate) fn notify(&self) {
        self.revision.send_modify(|revision| *revision = revision.wrapping_add(1));
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    /// Status of `job_id` while it is still active and polled by `generation`.
    pub(crate) fn active_status(&self, job_id: &str, generation: u64) -> Option<ExportStatus> {
        let state = self.lock();
        if !state.owns(job_id, generation) {
            return None;
        }
        state
            .get(job_id)
            .map(|job| job.snapshot.status)
            .filter(|status| status.is_active())
    }

    /// Replace the stored snapshot with a poll result.
    ///
    /// Returns `None` when `generation` no longer owns the entry, in which
    /// case nothing is written.
    pub(crate) fn apply_snapshot(
        &self,
        job_id: &str,
        generation: u64,
        snapshot: ExportJob,
    ) -> Option<ExportStatus> {
        let status = {
            let mut state = self.lock();
            if !state.owns(job_id, generation) {
                return None;
            }
            let tracked = state.get_mut(job_id)?;
            let status = snapshot.status;
            // Keyed by the id we polled, whatever the body says.
            tracked.snapshot = ExportJob {
                job_id: job_id.to_string(),
                ..snapshot
            };
            status
        };
        self.notify();
        Some(status)
    }

    /// Unregister `generation` and release the in-flight flag it held.
    pub(crate) fn finish_polling(&self, job_id: &str, generation: u64) {
        {
            let mut state = self.lock();
            if !state.owns(job_id, generation) {
                return;
            }
            if let Some(tracked) = state.get_mut(job_id) {
                tracked.poller = None;
            }
            state.release_if_tracking(job_id);
        }
        self.notify();
    }
}
