use crate::{ImageSelection, TaskId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Run the submitter for the selected image.
    SubmitImage(ImageSelection),
    /// Start the poller for a task, fresh or resumed.
    StartPolling { task_id: TaskId },
    /// Cancel the poller of an abandoned task.
    StopPolling { task_id: TaskId },
}
