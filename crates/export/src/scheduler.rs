//! Per-job status polling.
//!
//! Each active job gets one task that fires a status query every interval
//! until the job is terminal. Queries are not serialized: when a response is
//! slower than the interval, the next tick still fires and several queries
//! for the same job can be outstanding at once. Responses are applied in
//! arrival order.
//!
//! A failed query ends polling for the job. The failure is logged and the
//! last good snapshot stays in the store.

use std::sync::Arc;
use std::time::Duration;

use coverage_client::{ClientError, ExportApi, ExportJob, MetricsCollector};
use tokio::task::JoinSet;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::error::PollTransportError;
use crate::store::JobStore;

/// Everything a poller needs, cloned into each spawned task.
#[derive(Clone)]
pub(crate) struct PollContext {
    pub(crate) api: Arc<dyn ExportApi>,
    pub(crate) store: Arc<JobStore>,
    pub(crate) interval: Duration,
    pub(crate) metrics: Option<MetricsCollector>,
}

/// Poll `job_id` until it is terminal, polling fails, or the task is aborted.
///
/// The first query fires one full interval after the call.
pub(crate) async fn poll_until_terminal(ctx: PollContext, job_id: String, generation: u64) {
    let mut ticker = time::interval_at(Instant::now() + ctx.interval, ctx.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut queries: JoinSet<Result<ExportJob, ClientError>> = JoinSet::new();

    debug!(job_id = %job_id, interval_ms = ctx.interval.as_millis() as u64, "Polling export job");

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if ctx.store.active_status(&job_id, generation).is_none() {
                    break;
                }
                let api = Arc::clone(&ctx.api);
                let id = job_id.clone();
                queries.spawn(async move { api.get_status(&id).await });
            }
            Some(joined) = queries.join_next() => {
                match joined {
                    Ok(Ok(snapshot)) => {
                        let progress = snapshot.progress;
                        match ctx.store.apply_snapshot(&job_id, generation, snapshot) {
                            None => break,
                            Some(status) if status.is_terminal() => {
                                info!(job_id = %job_id, status = %status, "Export job finished");
                                if let Some(m) = &ctx.metrics {
                                    m.record_export_finished(status);
                                }
                                break;
                            }
                            Some(status) => {
                                debug!(job_id = %job_id, status = %status, progress, "Export job progress");
                            }
                        }
                    }
                    Ok(Err(source)) => {
                        if let Some(m) = &ctx.metrics {
                            m.record_poll_failure(&source);
                        }
                        let error = PollTransportError {
                            job_id: job_id.clone(),
                            source,
                        };
                        warn!(error = %error, "Stopped polling export job");
                        break;
                    }
                    Err(join_error) => {
                        warn!(job_id = %job_id, error = %join_error, "Status query task failed");
                        break;
                    }
                }
            }
        }
    }

    queries.abort_all();
    ctx.store.finish_polling(&job_id, generation);
}
