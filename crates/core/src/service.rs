//! Capability traits the core calls through.
//!
//! The remote job service and the operator-facing surface are external
//! collaborators. The core only depends on these traits so the state
//! machine can be driven by in-memory fakes in tests.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::ServiceError;
use crate::types::{Candidate, JobDetail, JobId, JobSummary};

/// The four operations of the remote job service.
#[async_trait]
pub trait JobService: Send + Sync {
    /// Open jobs, newest first, exactly as the service orders them.
    async fn list_open_jobs(&self) -> Result<Vec<JobSummary>, ServiceError>;

    /// Detail for one job, or `None` when the service has none to give.
    async fn job_detail(&self, id: &JobId) -> Result<Option<JobDetail>, ServiceError>;

    /// Ask the service to check that the operator performed the action.
    async fn verify_retweet(&self, id: &JobId) -> Result<Option<Value>, ServiceError>;

    /// Read back the service's verification status for the job.
    async fn verify_status(&self, id: &JobId) -> Result<Option<Value>, ServiceError>;
}

/// Operator-facing surface: rendering, clipboard, notifications and the
/// human confirmation signal.
///
/// Failures on this side never affect the state machine. `copy_to_clipboard`
/// reports success as a bool; `notify` is fire-and-forget.
#[async_trait]
pub trait PresentationSink: Send + Sync {
    /// Render the newly active job.
    async fn present(&self, candidate: &Candidate);

    /// Place `text` on the shared clipboard.
    async fn copy_to_clipboard(&self, text: &str) -> bool;

    /// Emit an external notification. Errors are swallowed by implementors.
    async fn notify(&self, message: &str);

    /// Suspend until the operator signals that the action is done.
    async fn wait_for_confirmation(&self);

    /// Announce that every known job is exhausted.
    async fn announce_idle(&self);
}
