use crate::{AppState, Effect, Msg, PreviewSource, Screen, TaskId};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::ImageChosen(selection) => {
            state.begin_submission();
            vec![Effect::SubmitImage(selection)]
        }
        Msg::SubmitAccepted {
            task_id,
            preview_url,
        } => start_tracking(&mut state, task_id, PreviewSource::Fresh(preview_url)),
        Msg::ResumeFound {
            task_id,
            preview_url,
        } => start_tracking(&mut state, task_id, PreviewSource::Cached(preview_url)),
        Msg::SubmitFailed { message } => {
            state.present_error(message);
            Vec::new()
        }
        // 202 is "not yet": nothing to show, nothing to do.
        Msg::PollPending { .. } => Vec::new(),
        Msg::PollSucceeded { task_id, result } => {
            if let Some(preview) = state.resolve(&task_id) {
                state.present_result(result, &preview);
            }
            Vec::new()
        }
        Msg::PollFailed { task_id, message } => {
            if state.resolve(&task_id).is_some() {
                state.present_error(message);
            }
            Vec::new()
        }
        Msg::ResetClicked => {
            if state.screen() != Screen::Loading {
                state.reset();
            }
            Vec::new()
        }
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn start_tracking(state: &mut AppState, task_id: TaskId, preview: PreviewSource) -> Vec<Effect> {
    if state.tracked_task() == Some(&task_id) {
        return Vec::new();
    }
    let abandoned = state.track(task_id.clone(), preview);
    let mut effects = stop_polling(abandoned);
    effects.push(Effect::StartPolling { task_id });
    effects
}

fn stop_polling(abandoned: Option<TaskId>) -> Vec<Effect> {
    abandoned
        .map(|task_id| Effect::StopPolling { task_id })
        .into_iter()
        .collect()
}
