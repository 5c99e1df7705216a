use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use adgen_core::{update, AppState, ImageSelection, Msg, Screen, Style};
use adgen_engine::{Lifecycle, ReqwestApi, SessionFileStore, TaskStore};
use adgen_logging::{adgen_info, adgen_warn};
use anyhow::Context;
use tokio::sync::mpsc;

use super::effects::EffectRunner;
use super::{config, logging, render};
use crate::Cli;

/// Exit code after Ctrl-C, as shells report for SIGINT.
const INTERRUPTED: u8 = 130;

pub async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let (config, warnings) = config::resolve(&cli);
    logging::initialize(cli.log, &config.state_dir);
    for warning in warnings {
        adgen_warn!("{}", warning);
    }
    adgen_info!(
        "adgen starting: server={} session={} state_dir={:?}",
        config.api.base_url,
        config.session,
        config.state_dir
    );

    let store: Arc<dyn TaskStore> = Arc::new(SessionFileStore::new(
        &config.state_dir,
        &config.session,
    ));
    let api = ReqwestApi::new(config.api.clone()).context("building the HTTP client")?;
    let lifecycle = Lifecycle::new(Arc::new(api), store, config.poll.clone());

    let (msg_tx, mut msg_rx) = mpsc::unbounded_channel::<Msg>();
    let mut runner = EffectRunner::new(lifecycle.clone(), msg_tx);

    let mut startup = Vec::new();
    if let Some(record) = lifecycle.resume_pending() {
        startup.push(Msg::ResumeFound {
            task_id: record.task_id,
            preview_url: record.preview_url,
        });
    }
    if let Some(path) = &cli.image {
        startup.push(Msg::ImageChosen(select_image(path, cli.style)));
    }
    if startup.is_empty() {
        println!("Nothing to resume in this session. Pass an image to generate an ad.");
        return Ok(ExitCode::SUCCESS);
    }

    let mut state = AppState::new();
    for msg in startup {
        state = dispatch(state, msg, &mut runner);
    }

    // A rejected upload shows its error while an earlier task keeps polling.
    while state.screen() == Screen::Loading || state.tracked_task().is_some() {
        tokio::select! {
            msg = msg_rx.recv() => match msg {
                Some(msg) => state = dispatch(state, msg, &mut runner),
                None => break,
            },
            _ = tokio::signal::ctrl_c() => {
                runner.shutdown();
                if let Some(task_id) = state.tracked_task() {
                    adgen_info!("Interrupted while tracking task {}", task_id);
                    println!("Task {task_id} is still running; run adgen again in this terminal to resume.");
                }
                return Ok(ExitCode::from(INTERRUPTED));
            }
        }
    }
    runner.shutdown();

    if state.view().result_visible {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

fn dispatch(state: AppState, msg: Msg, runner: &mut EffectRunner) -> AppState {
    let (mut state, effects) = update(state, msg);
    if state.consume_dirty() {
        for line in render::render(&state.view()) {
            println!("{line}");
        }
    }
    runner.enqueue(effects);
    state
}

/// Builds the selection the way a file picker would: absolute path, media
/// type guessed from the extension.
fn select_image(path: &Path, style: Style) -> ImageSelection {
    let path = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    let media_type = mime_guess::from_path(&path)
        .first_or_octet_stream()
        .essence_str()
        .to_string();
    ImageSelection {
        path,
        media_type,
        style,
    }
}
