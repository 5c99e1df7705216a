use adgen_core::{AppViewModel, ResultView, Screen};

const RULE: &str = "────────────────────────────────────────";

/// Turns the view model into the lines printed on stdout.
pub fn render(view: &AppViewModel) -> Vec<String> {
    let mut lines = Vec::new();

    if let Some(message) = &view.error_message {
        lines.push(format!("Error: {message}"));
    }

    match view.screen {
        Screen::Upload => {
            if view.error_message.is_none() {
                lines.push("Ready for a new image.".to_string());
            }
        }
        Screen::Loading => lines.push(match &view.tracked_task {
            Some(task_id) => format!("Generating ad (task {task_id})..."),
            None => "Uploading image...".to_string(),
        }),
        Screen::Result => {
            if let Some(result) = &view.result {
                render_result(result, &mut lines);
            }
        }
    }

    lines
}

fn render_result(result: &ResultView, lines: &mut Vec<String>) {
    let origin = if result.preview_cached {
        " (from previous run)"
    } else {
        ""
    };
    lines.push(RULE.to_string());
    lines.push(format!("Image: {}{}", result.preview_url, origin));
    lines.push(String::new());
    lines.push("Characteristics:".to_string());
    for line in &result.characteristic_lines {
        lines.push(format!("  • {line}"));
    }
    lines.push(String::new());
    lines.push("Ad text:".to_string());
    lines.push(result.ad_text.clone());
    lines.push(RULE.to_string());
}
