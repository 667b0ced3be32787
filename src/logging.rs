// File logging setup.
// The terminal belongs to the TUI, so log records go to a file in the cache dir.

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use env_logger::{Env, Target};

use crate::error::Result;

const LOG_FILE_NAME: &str = "glpipes.log";

/// Get the base cache directory (~/.cache/glpipes on Linux).
pub fn cache_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "glpipes").map(|dirs| dirs.cache_dir().to_path_buf())
}

/// Open (creating if needed) the log file inside `dir`, appending.
pub fn open_log_file(dir: &Path) -> Result<File> {
    fs::create_dir_all(dir)?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join(LOG_FILE_NAME))?;
    Ok(file)
}

/// Install the global logger. Returns the log path when logging is active.
///
/// Failing to open the file leaves logging disabled instead of aborting.
pub fn init() -> Option<PathBuf> {
    let dir = cache_dir()?;
    let file = open_log_file(&dir).ok()?;

    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .target(Target::Pipe(Box::new(file)))
        .format_timestamp_millis()
        .try_init()
        .ok()?;

    Some(dir.join(LOG_FILE_NAME))
}
