//! A scripted, in-memory [`ExportApi`].
//!
//! Replies are queued per operation (and per job for status queries). The
//! last queued status reply for a job is repeated once the queue would
//! otherwise run dry, so a job scripted as `processing` stays `processing`.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;

use crate::api::ExportApi;
use crate::error::{ClientError, Result};
use crate::models::{ExportJob, ExportRequest};

/// A failure the fake should report, turned into [`ClientError::ApiError`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptedFailure {
    pub status: u16,
    pub message: String,
}

impl ScriptedFailure {
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    fn into_error(self, path: &str) -> ClientError {
        ClientError::ApiError {
            status: self.status,
            url: format!("scripted://{}", path),
            message: self.message,
            request_id: None,
        }
    }
}

#[derive(Debug, Clone)]
struct StatusStep {
    delay: Duration,
    reply: std::result::Result<ExportJob, ScriptedFailure>,
}

#[derive(Debug, Default)]
struct Script {
    create: VecDeque<std::result::Result<ExportJob, ScriptedFailure>>,
    status: HashMap<String, VecDeque<StatusStep>>,
    download: HashMap<String, std::result::Result<Vec<u8>, ScriptedFailure>>,
    cancel: HashMap<String, std::result::Result<(), ScriptedFailure>>,
}

#[derive(Debug, Default)]
struct Calls {
    create: Vec<ExportRequest>,
    status: HashMap<String, usize>,
    download: HashMap<String, usize>,
    cancel: HashMap<String, usize>,
}

/// In-memory [`ExportApi`] driven by queued replies.
#[derive(Debug, Default)]
pub struct ScriptedExportApi {
    script: Mutex<Script>,
    calls: Mutex<Calls>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl ScriptedExportApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the snapshot returned by the next `create_export`.
    pub fn on_create(&self, job: ExportJob) -> &Self {
        lock(&self.script).create.push_back(Ok(job));
        self
    }

    /// Queue a rejection for the next `create_export`.
    pub fn on_create_failure(&self, failure: ScriptedFailure) -> &Self {
        lock(&self.script).create.push_back(Err(failure));
        self
    }

    /// Queue a status snapshot for `job_id`.
    pub fn on_status(&self, job_id: &str, job: ExportJob) -> &Self {
        self.push_status(job_id, Duration::ZERO, Ok(job))
    }

    /// Queue a status snapshot for `job_id` that takes `delay` to arrive.
    pub fn on_status_after(&self, job_id: &str, delay: Duration, job: ExportJob) -> &Self {
        self.push_status(job_id, delay, Ok(job))
    }

    /// Queue a failed status query for `job_id`.
    pub fn on_status_failure(&self, job_id: &str, failure: ScriptedFailure) -> &Self {
        self.push_status(job_id, Duration::ZERO, Err(failure))
    }

    fn push_status(
        &self,
        job_id: &str,
        delay: Duration,
        reply: std::result::Result<ExportJob, ScriptedFailure>,
    ) -> &Self {
        lock(&self.script)
            .status
            .entry(job_id.to_string())
            .or_default()
            .push_back(StatusStep { delay, reply });
        self
    }

    /// Artifact bytes served for `job_id`.
    pub fn on_download(&self, job_id: &str, bytes: impl Into<Vec<u8>>) -> &Self {
        lock(&self.script)
            .download
            .insert(job_id.to_string(), Ok(bytes.into()));
        self
    }

    pub fn on_download_failure(&self, job_id: &str, failure: ScriptedFailure) -> &Self {
        lock(&self.script)
            .download
            .insert(job_id.to_string(), Err(failure));
        self
    }

    /// Make cancellation of `job_id` fail. Cancellation succeeds otherwise.
    pub fn on_cancel_failure(&self, job_id: &str, failure: ScriptedFailure) -> &Self {
        lock(&self.script)
            .cancel
            .insert(job_id.to_string(), Err(failure));
        self
    }

    /// Requests received by `create_export`, in order.
    pub fn create_requests(&self) -> Vec<ExportRequest> {
        lock(&self.calls).create.clone()
    }

    /// Status queries started for `job_id`, including ones still in flight.
    pub fn status_calls(&self, job_id: &str) -> usize {
        lock(&self.calls).status.get(job_id).copied().unwrap_or(0)
    }

    pub fn download_calls(&self, job_id: &str) -> usize {
        lock(&self.calls).download.get(job_id).copied().unwrap_or(0)
    }

    pub fn cancel_calls(&self, job_id: &str) -> usize {
        lock(&self.calls).cancel.get(job_id).copied().unwrap_or(0)
    }

    fn next_status(&self, job_id: &str) -> Option<StatusStep> {
        let mut script = lock(&self.script);
        let queue = script.status.get_mut(job_id)?;
        if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        }
    }
}

#[async_trait]
impl ExportApi for ScriptedExportApi {
    async fn create_export(&self, request: &ExportRequest) -> Result<ExportJob> {
        lock(&self.calls).create.push(request.clone());
        let reply = lock(&self.script).create.pop_front();
        match reply {
            Some(Ok(job)) => Ok(job),
            Some(Err(failure)) => Err(failure.into_error("/exports")),
            None => Err(ClientError::InvalidResponse(
                "no scripted create reply".to_string(),
            )),
        }
    }

    async fn get_status(&self, job_id: &str) -> Result<ExportJob> {
        *lock(&self.calls).status.entry(job_id.to_string()).or_default() += 1;
        let Some(step) = self.next_status(job_id) else {
            return Err(ClientError::NotFound(format!("/exports/{}/status", job_id)));
        };
        if !step.delay.is_zero() {
            tokio::time::sleep(step.delay).await;
        }
        step.reply
            .map_err(|failure| failure.into_error(&format!("/exports/{}/status", job_id)))
    }

    async fn download(&self, job_id: &str) -> Result<Vec<u8>> {
        *lock(&self.calls)
            .download
            .entry(job_id.to_string())
            .or_default() += 1;
        let reply = lock(&self.script).download.get(job_id).cloned();
        match reply {
            Some(Ok(bytes)) => Ok(bytes),
            Some(Err(failure)) => {
                Err(failure.into_error(&format!("/exports/{}/download", job_id)))
            }
            None => Err(ClientError::NotFound(format!(
                "/exports/{}/download",
                job_id
            ))),
        }
    }

    async fn cancel(&self, job_id: &str) -> Result<()> {
        *lock(&self.calls).cancel.entry(job_id.to_string()).or_default() += 1;
        let reply = lock(&self.script).cancel.get(job_id).cloned();
        match reply {
            Some(Err(failure)) => Err(failure.into_error(&format!("/exports/{}/cancel", job_id))),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ExportStatus;
    use crate::testing::job;

    #[tokio::test]
    async fn test_last_status_reply_repeats() {
        let api = ScriptedExportApi::new();
        api.on_status("a", job("a", ExportStatus::Pending, 0))
            .on_status("a", job("a", ExportStatus::Processing, 50));

        assert_eq!(api.get_status("a").await.unwrap().status, ExportStatus::Pending);
        assert_eq!(api.get_status("a").await.unwrap().progress, 50);
        assert_eq!(api.get_status("a").await.unwrap().progress, 50);
        assert_eq!(api.status_calls("a"), 3);
    }

    #[tokio::test]
    async fn test_unscripted_calls_fail() {
        let api = ScriptedExportApi::new();
        assert!(matches!(
            api.get_status("missing").await,
            Err(ClientError::NotFound(_))
        ));
        assert!(api.download("missing").await.is_err());
        assert!(api.cancel("missing").await.is_ok());
    }

    #[tokio::test]
    async fn test_scripted_failure_becomes_api_error() {
        let api = ScriptedExportApi::new();
        api.on_cancel_failure("a", ScriptedFailure::new(409, "already finished"));

        let err = api.cancel("a").await.unwrap_err();
        assert_eq!(err.status(), Some(409));
        assert_eq!(api.cancel_calls("a"), 1);
    }
}
