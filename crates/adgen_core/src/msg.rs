use crate::{AdResult, ImageSelection, TaskId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User picked an image and a style.
    ImageChosen(ImageSelection),
    /// Submission returned a task id and the session record was written.
    SubmitAccepted { task_id: TaskId, preview_url: String },
    /// Submission was rejected, failed in transit, or the input was invalid.
    SubmitFailed { message: String },
    /// Startup found an active task in the session record.
    ResumeFound { task_id: TaskId, preview_url: String },
    /// Backend answered 202 for a poll.
    PollPending { task_id: TaskId },
    /// Backend answered 200 with a well-formed payload.
    PollSucceeded { task_id: TaskId, result: AdResult },
    /// Any other poll outcome.
    PollFailed { task_id: TaskId, message: String },
    /// User asked to go back to the upload surface.
    ResetClicked,
    /// Fallback for placeholder wiring.
    NoOp,
}
