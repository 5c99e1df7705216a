use std::fmt;

use crate::{Screen, TaskId};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub screen: Screen,
    pub upload_visible: bool,
    pub loader_visible: bool,
    pub result_visible: bool,
    pub error_message: Option<String>,
    pub tracked_task: Option<TaskId>,
    pub result: Option<ResultView>,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultView {
    pub preview_url: String,
    /// Preview came from the session record rather than the selected file.
    pub preview_cached: bool,
    pub characteristic_lines: Vec<CharacteristicLine>,
    /// Editable text surface content.
    pub ad_text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacteristicLine {
    pub label: String,
    pub value: String,
}

impl fmt::Display for CharacteristicLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.label, self.value)
    }
}
