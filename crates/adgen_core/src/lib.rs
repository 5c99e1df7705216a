//! Adgen core: pure task-tracking state machine, presenters and view-model helpers.
mod effect;
mod msg;
mod state;
mod types;
mod update;
mod view_model;

pub use effect::Effect;
pub use msg::Msg;
pub use state::{AppState, Screen};
pub use types::{
    fresh_preview_url, AdResult, Characteristic, ImageSelection, PreviewSource, Style, TaskId,
    UnknownStyle,
};
pub use update::update;
pub use view_model::{AppViewModel, CharacteristicLine, ResultView};
