use adgen_core::{AdResult, Style, TaskId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub(crate) const INVALID_FILE_MESSAGE: &str = "Please choose an image file.";
pub(crate) const MISSING_TASK_ID_MESSAGE: &str = "Server response did not contain a task id.";
pub(crate) const JOB_FAILED_FALLBACK: &str = "Unknown server error while processing.";

/// Image plus style, ready to be posted as a multipart body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub file_name: String,
    /// Declared media type; anything outside `image/*` is rejected.
    pub media_type: String,
    pub bytes: Vec<u8>,
    pub style: Style,
    /// Local preview reference stored alongside the task id.
    pub preview_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollStatus {
    /// 202: the job is still running.
    Pending,
    /// 200 with a well-formed payload.
    Ready(AdResult),
}

/// The single active-task record kept for the browsing session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRecord {
    #[serde(rename = "activeTaskId")]
    pub task_id: TaskId,
    #[serde(rename = "tempImageURL")]
    pub preview_url: String,
}

/// Every way a task can fail, from input checking to the backend giving up.
///
/// `Display` is the message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LifecycleError {
    /// Bad input; never reaches the network.
    #[error("{0}")]
    Validation(String),
    /// Submission request rejected or failed in transit.
    #[error("{0}")]
    Submission(String),
    /// A poll could not reach the server or the success body was unreadable.
    #[error("{0}")]
    PollTransport(String),
    /// The backend reported the job as failed.
    #[error("{message}")]
    JobFailed { status: u16, message: String },
}

impl LifecycleError {
    pub fn kind(&self) -> &'static str {
        match self {
            LifecycleError::Validation(_) => "validation",
            LifecycleError::Submission(_) => "submission",
            LifecycleError::PollTransport(_) => "poll transport",
            LifecycleError::JobFailed { .. } => "job failed",
        }
    }
}
