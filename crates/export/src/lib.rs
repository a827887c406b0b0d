//! Server-side export job tracking.
//!
//! An [`ExportManager`] submits export jobs to the coverage API, polls each
//! active job on a fixed interval until it reaches a terminal state, keeps
//! the latest snapshot of every job for display, and downloads or cancels
//! jobs on request.
//!
//! Background polling never surfaces errors to the caller. User-initiated
//! operations do; see [`error`].

pub mod error;
mod manager;
pub mod options;
mod scheduler;
pub mod sink;
mod store;

pub use error::{CancelError, DispatchError, PollTransportError, RetrievalError};
pub use manager::{DEFAULT_POLL_INTERVAL, ExportManager};
pub use options::{ExportOption, export_filename, export_options, export_options_at};
pub use sink::{ArtifactSink, DirectorySink, artifact_filename};
