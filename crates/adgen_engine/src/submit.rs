use std::sync::Arc;

use adgen_logging::{adgen_info, adgen_warn};

use crate::types::INVALID_FILE_MESSAGE;
use crate::{GenerationApi, ImageUpload, LifecycleError, TaskRecord, TaskStore};

/// Turns a selected image into a tracked remote task.
#[derive(Clone)]
pub struct Submitter {
    api: Arc<dyn GenerationApi>,
    store: Arc<dyn TaskStore>,
}

impl Submitter {
    pub fn new(api: Arc<dyn GenerationApi>, store: Arc<dyn TaskStore>) -> Self {
        Self { api, store }
    }

    /// Validates, posts and records the upload. The returned record is what
    /// the poller should track next.
    ///
    /// A record that cannot be stored only costs resumption after a restart,
    /// so that failure is logged and the submission still succeeds.
    pub async fn submit(&self, upload: ImageUpload) -> Result<TaskRecord, LifecycleError> {
        validate_upload(&upload)?;

        adgen_info!(
            "Submitting {} ({} bytes, {}, style={})",
            upload.file_name,
            upload.bytes.len(),
            upload.media_type,
            upload.style
        );
        let task_id = self.api.submit(&upload).await.inspect_err(|err| {
            adgen_warn!("Submission of {} failed: {}", upload.file_name, err);
        })?;
        adgen_info!("Task {} accepted", task_id);

        let record = TaskRecord {
            task_id,
            preview_url: upload.preview_url,
        };
        if let Err(err) = self.store.save(&record) {
            adgen_warn!(
                "Task {} will not survive a restart, saving the session record failed: {}",
                record.task_id,
                err
            );
        }
        Ok(record)
    }
}

/// Only `image/*` uploads are accepted.
pub fn validate_upload(upload: &ImageUpload) -> Result<(), LifecycleError> {
    validate_media_type(&upload.media_type)
}

pub fn validate_media_type(media_type: &str) -> Result<(), LifecycleError> {
    if media_type.trim().to_ascii_lowercase().starts_with("image/") {
        Ok(())
    } else {
        Err(LifecycleError::Validation(INVALID_FILE_MESSAGE.to_string()))
    }
}
