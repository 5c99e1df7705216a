use crate::view_model::{AppViewModel, CharacteristicLine, ResultView};
use crate::{AdResult, PreviewSource, TaskId};

/// Which surface of the interface is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Screen {
    /// Upload surface visible; nothing in flight.
    #[default]
    Upload,
    /// Loading indicator visible while a task is submitted or polled.
    Loading,
    /// Result area visible.
    Result,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct TrackedTask {
    task_id: TaskId,
    preview: PreviewSource,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    screen: Screen,
    tracked: Option<TrackedTask>,
    result: Option<ResultView>,
    error: Option<String>,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> AppViewModel {
        AppViewModel {
            screen: self.screen,
            upload_visible: self.screen == Screen::Upload,
            loader_visible: self.screen == Screen::Loading,
            result_visible: self.screen == Screen::Result,
            error_message: self.error.clone(),
            tracked_task: self.tracked_task().cloned(),
            result: self.result.clone(),
            dirty: self.dirty,
        }
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    /// Task whose poll outcomes are currently accepted.
    pub fn tracked_task(&self) -> Option<&TaskId> {
        self.tracked.as_ref().map(|tracked| &tracked.task_id)
    }

    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    /// Result presenter: shows the characteristics in payload order, the
    /// generated text verbatim and the resolved preview.
    pub fn present_result(&mut self, result: AdResult, preview: &PreviewSource) {
        let characteristic_lines = result
            .characteristics
            .into_iter()
            .map(|characteristic| CharacteristicLine {
                label: characteristic.name,
                value: characteristic.value,
            })
            .collect();
        self.result = Some(ResultView {
            preview_url: preview.url().to_string(),
            preview_cached: preview.is_cached(),
            characteristic_lines,
            ad_text: result.ad_text,
        });
        self.error = None;
        self.screen = Screen::Result;
        self.dirty = true;
    }

    /// Error presenter: shows the message and puts the interface back to its
    /// pre-submission layout. Repeated calls leave the same state.
    pub fn present_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
        self.result = None;
        self.screen = Screen::Upload;
        self.dirty = true;
    }

    /// Upload surface back, error and result hidden.
    pub(crate) fn reset(&mut self) {
        self.error = None;
        self.result = None;
        self.screen = Screen::Upload;
        self.dirty = true;
    }

    /// Loader up for an upload. A tracked task keeps being tracked until the
    /// backend accepts the new one.
    pub(crate) fn begin_submission(&mut self) {
        self.error = None;
        self.result = None;
        self.screen = Screen::Loading;
        self.dirty = true;
    }

    /// Start tracking a task. Returns the id of a previously tracked task that
    /// is now abandoned, if any.
    pub(crate) fn track(&mut self, task_id: TaskId, preview: PreviewSource) -> Option<TaskId> {
        let abandoned = self
            .tracked
            .replace(TrackedTask {
                task_id: task_id.clone(),
                preview,
            })
            .map(|previous| previous.task_id)
            .filter(|previous| *previous != task_id);
        self.screen = Screen::Loading;
        self.dirty = true;
        abandoned
    }

    /// Stops tracking `task_id` and hands back its preview. `None` means the
    /// task is not the tracked one, so its outcome must be dropped.
    pub(crate) fn resolve(&mut self, task_id: &str) -> Option<PreviewSource> {
        let is_tracked = self
            .tracked
            .as_ref()
            .is_some_and(|tracked| tracked.task_id == task_id);
        if is_tracked {
            self.tracked.take().map(|tracked| tracked.preview)
        } else {
            None
        }
    }
}
