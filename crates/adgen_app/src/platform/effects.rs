use std::collections::HashMap;
use std::path::Path;

use adgen_core::{Effect, ImageSelection, Msg, TaskId};
use adgen_engine::{validate_media_type, ImageUpload, Lifecycle, PollObserver, PollOutcome};
use adgen_logging::{adgen_debug, adgen_info};
use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;

/// Executes core effects on the runtime and feeds their results back as messages.
pub struct EffectRunner {
    lifecycle: Lifecycle,
    msg_tx: UnboundedSender<Msg>,
    pollers: HashMap<TaskId, CancellationToken>,
}

struct ChannelObserver {
    msg_tx: UnboundedSender<Msg>,
}

impl PollObserver for ChannelObserver {
    fn on_pending(&self, task_id: &str) {
        let _ = self.msg_tx.send(Msg::PollPending {
            task_id: task_id.to_string(),
        });
    }
}

impl EffectRunner {
    pub fn new(lifecycle: Lifecycle, msg_tx: UnboundedSender<Msg>) -> Self {
        Self {
            lifecycle,
            msg_tx,
            pollers: HashMap::new(),
        }
    }

    pub fn enqueue(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::SubmitImage(selection) => {
                    adgen_info!(
                        "SubmitImage path={:?} media_type={} style={}",
                        selection.path,
                        selection.media_type,
                        selection.style
                    );
                    self.spawn_submission(selection);
                }
                Effect::StartPolling { task_id } => {
                    adgen_info!("StartPolling task_id={}", task_id);
                    self.spawn_poller(task_id);
                }
                Effect::StopPolling { task_id } => {
                    if let Some(cancel) = self.pollers.remove(&task_id) {
                        adgen_info!("StopPolling task_id={} (abandoned)", task_id);
                        cancel.cancel();
                    }
                }
            }
        }
    }

    /// Cancels every poller. Session records stay, so a later run resumes.
    pub fn shutdown(&mut self) {
        for (task_id, cancel) in self.pollers.drain() {
            adgen_debug!("Cancelling poller for task {}", task_id);
            cancel.cancel();
        }
    }

    fn spawn_submission(&self, selection: ImageSelection) {
        let submitter = self.lifecycle.submitter();
        let msg_tx = self.msg_tx.clone();
        tokio::spawn(async move {
            let submitted = match read_upload(&selection).await {
                Ok(upload) => submitter.submit(upload).await.map_err(|err| err.to_string()),
                Err(message) => Err(message),
            };
            let msg = match submitted {
                Ok(record) => Msg::SubmitAccepted {
                    task_id: record.task_id,
                    preview_url: record.preview_url,
                },
                Err(message) => Msg::SubmitFailed { message },
            };
            let _ = msg_tx.send(msg);
        });
    }

    fn spawn_poller(&mut self, task_id: TaskId) {
        let cancel = CancellationToken::new();
        if let Some(previous) = self.pollers.insert(task_id.clone(), cancel.clone()) {
            previous.cancel();
        }
        let poller = self.lifecycle.poller();
        let msg_tx = self.msg_tx.clone();
        tokio::spawn(async move {
            let observer = ChannelObserver {
                msg_tx: msg_tx.clone(),
            };
            let msg = match poller.run(&task_id, &cancel, &observer).await {
                PollOutcome::Succeeded(result) => Msg::PollSucceeded { task_id, result },
                PollOutcome::Failed(err) => Msg::PollFailed {
                    task_id,
                    message: err.to_string(),
                },
                PollOutcome::Cancelled => return,
            };
            let _ = msg_tx.send(msg);
        });
    }
}

/// Reads the selected file, after checking its media type so a non-image is
/// never loaded.
async fn read_upload(selection: &ImageSelection) -> Result<ImageUpload, String> {
    validate_media_type(&selection.media_type).map_err(|err| err.to_string())?;
    let bytes = tokio::fs::read(&selection.path)
        .await
        .map_err(|err| format!("Could not read {}: {}", selection.path.display(), err))?;
    Ok(ImageUpload {
        file_name: file_name(&selection.path),
        media_type: selection.media_type.clone(),
        bytes,
        style: selection.style,
        preview_url: selection.preview_url(),
    })
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string())
}
