use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use adgen_engine::{ApiSettings, PollSettings};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::Cli;

const CONFIG_FILENAME: &str = "adgen.ron";

/// Optional overrides read from `adgen.ron`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
struct FileConfig {
    server_url: Option<String>,
    poll_interval_ms: Option<u64>,
    request_timeout_ms: Option<u64>,
    state_dir: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api: ApiSettings,
    pub poll: PollSettings,
    pub state_dir: PathBuf,
    pub session: String,
}

/// Merges defaults, the config file and the command line, in that order.
///
/// Returns the warnings collected on the way; they are logged once the logger
/// exists, which itself depends on the resolved state directory.
pub fn resolve(cli: &Cli) -> (AppConfig, Vec<String>) {
    let dirs = ProjectDirs::from("", "", "adgen");
    let mut warnings = Vec::new();

    let file = match &cli.config {
        Some(path) => load_file_config(path, &mut warnings),
        None => match &dirs {
            Some(dirs) => {
                let path = dirs.config_dir().join(CONFIG_FILENAME);
                if path.exists() {
                    load_file_config(&path, &mut warnings)
                } else {
                    FileConfig::default()
                }
            }
            None => FileConfig::default(),
        },
    };

    (merge(cli, file, dirs.as_ref()), warnings)
}

fn merge(cli: &Cli, file: FileConfig, dirs: Option<&ProjectDirs>) -> AppConfig {
    let mut api = ApiSettings::default();
    if let Some(url) = cli.server.clone().or(file.server_url) {
        api.base_url = url;
    }
    if let Some(ms) = file.request_timeout_ms.filter(|ms| *ms > 0) {
        api.request_timeout = Duration::from_millis(ms);
    }

    let mut poll = PollSettings::default();
    if let Some(ms) = file.poll_interval_ms.filter(|ms| *ms > 0) {
        poll.interval = Duration::from_millis(ms);
    }

    let state_dir = cli
        .state_dir
        .clone()
        .or(file.state_dir)
        .unwrap_or_else(|| default_state_dir(dirs));
    let session = cli.session.clone().unwrap_or_else(default_session);

    AppConfig {
        api,
        poll,
        state_dir,
        session,
    }
}

fn load_file_config(path: &Path, warnings: &mut Vec<String>) -> FileConfig {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) => {
            warnings.push(format!("Failed to read config from {:?}: {}", path, err));
            return FileConfig::default();
        }
    };

    match ron::from_str(&content) {
        Ok(config) => config,
        Err(err) => {
            warnings.push(format!("Failed to parse config from {:?}: {}", path, err));
            FileConfig::default()
        }
    }
}

/// Per-user runtime dir (wiped at logout), else the cache dir, else temp.
fn default_state_dir(dirs: Option<&ProjectDirs>) -> PathBuf {
    match dirs {
        Some(dirs) => dirs
            .runtime_dir()
            .unwrap_or_else(|| dirs.cache_dir())
            .to_path_buf(),
        None => std::env::temp_dir().join("adgen"),
    }
}

/// One session per invoking shell, so a terminal resumes only its own task.
fn default_session() -> String {
    #[cfg(unix)]
    {
        format!("ppid-{}", std::os::unix::process::parent_id())
    }
    #[cfg(not(unix))]
    {
        "default".to_string()
    }
}
