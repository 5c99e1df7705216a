use std::path::PathBuf;
use std::process::ExitCode;

use adgen_core::Style;
use clap::Parser;

mod platform;

use platform::logging::LogDestination;

/// Generate a listing ad from a photo.
///
/// Re-running in the same terminal picks up a task that is still being
/// generated instead of submitting it again.
#[derive(Debug, Parser)]
#[command(name = "adgen", version, about, long_about = None)]
pub struct Cli {
    /// Image to submit. Without it, only an unfinished task of this session is resumed.
    pub image: Option<PathBuf>,

    /// Writing style: brief, professional or social
    #[arg(long, default_value_t = Style::Brief)]
    pub style: Style,

    /// Base URL of the generation server
    #[arg(long, env = "ADGEN_SERVER")]
    pub server: Option<String>,

    /// Session name; defaults to one per terminal
    #[arg(long, env = "ADGEN_SESSION")]
    pub session: Option<String>,

    /// Directory holding session records and the log file
    #[arg(long, env = "ADGEN_STATE_DIR")]
    pub state_dir: Option<PathBuf>,

    /// RON configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Where log output goes
    #[arg(long, value_enum, default_value_t = LogDestination::File)]
    pub log: LogDestination,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<ExitCode> {
    platform::app::run(Cli::parse()).await
}
