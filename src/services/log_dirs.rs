//! XDG-compliant log directory management
//!
//! Logs are stored in `$XDG_STATE_HOME/add-to-search/logs/` (typically
//! `~/.local/state/add-to-search/logs/`), one PID-named file per run. Old
//! files from other runs are removed on startup.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::{Duration, SystemTime};

use crate::config_io::DirectoryContext;

/// Minimum age for log files to be cleaned up (24 hours)
const CLEANUP_AGE: Duration = Duration::from_secs(24 * 60 * 60);

const APP_DIR_NAME: &str = "add-to-search";

/// Cached log directory path
static LOG_DIR: OnceLock<PathBuf> = OnceLock::new();

/// Get the base log directory, creating it if necessary.
///
/// Falls back to the system temp directory when the XDG directory cannot be
/// determined or created.
pub fn log_dir() -> &'static PathBuf {
    LOG_DIR.get_or_init(|| {
        let fallback = std::env::temp_dir().join(format!("{APP_DIR_NAME}-logs"));
        let dir = get_xdg_log_dir().unwrap_or_else(|| fallback.clone());

        if let Err(e) = fs::create_dir_all(&dir) {
            tracing::warn!("Failed to create log directory {:?}: {}", dir, e);
            return fallback;
        }

        dir
    })
}

/// Get the XDG state home log directory
fn get_xdg_log_dir() -> Option<PathBuf> {
    if let Ok(state_home) = std::env::var("XDG_STATE_HOME") {
        let path = PathBuf::from(state_home);
        if path.is_absolute() {
            return Some(path.join(APP_DIR_NAME).join("logs"));
        }
    }

    dirs::home_dir().map(|home| {
        home.join(".local")
            .join("state")
            .join(APP_DIR_NAME)
            .join("logs")
    })
}

/// Get the path for this process's log file.
///
/// Returns `{log_dir}/add-to-search-{PID}.log`
pub fn main_log_path() -> PathBuf {
    log_dir().join(format!("{APP_DIR_NAME}-{}.log", std::process::id()))
}

/// Remove log files older than a day that belong to other runs.
pub fn cleanup_stale_logs() {
    cleanup_stale_logs_in_dir(log_dir(), std::process::id(), CLEANUP_AGE);
}

fn cleanup_stale_logs_in_dir(dir: &Path, current_pid: u32, age: Duration) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };

    for entry in entries.flatten() {
        let file_name = entry.file_name();
        let name = file_name.to_string_lossy();

        let Some(pid) = extract_pid_from_filename(&name) else {
            continue;
        };
        if pid == current_pid {
            continue;
        }

        if entry.file_type().map(|t| t.is_file()).unwrap_or(false)
            && is_file_older_than(&entry.path(), age)
        {
            if let Err(e) = fs::remove_file(entry.path()) {
                tracing::debug!("Failed to clean up stale log {:?}: {}", entry.path(), e);
            } else {
                tracing::debug!("Cleaned up stale log file: {:?}", entry.path());
            }
        }
    }
}

/// Check if a file is older than the specified duration
fn is_file_older_than(path: &Path, age: Duration) -> bool {
    let Ok(metadata) = fs::metadata(path) else {
        return false;
    };

    let Ok(modified) = metadata.modified() else {
        return false;
    };

    SystemTime::now()
        .duration_since(modified)
        .map(|elapsed| elapsed >= age)
        .unwrap_or(false)
}

/// Extract PID from a filename like "add-to-search-12345.log"
fn extract_pid_from_filename(name: &str) -> Option<u32> {
    let without_ext = name.strip_suffix(".log")?;
    let last_hyphen = without_ext.rfind('-')?;
    without_ext[last_hyphen + 1..].parse().ok()
}

/// Print all directories used by the tool to stdout
pub fn print_all_paths(dir_context: &DirectoryContext, working_dir: &Path) {
    use std::io::Write;

    let stdout = std::io::stdout();
    let mut handle = stdout.lock();

    let project = crate::config_io::project_dir(working_dir);

    writeln!(handle, "Config:     {}", dir_context.config_dir.display()).ok();
    writeln!(
        handle,
        "  config.json:  {}",
        dir_context.config_path().display()
    )
    .ok();
    writeln!(handle).ok();

    writeln!(handle, "Project:    {}", project.display()).ok();
    writeln!(
        handle,
        "  config.json:  {}",
        project.join("config.json").display()
    )
    .ok();
    writeln!(
        handle,
        "  session.json: {}",
        project.join("session.json").display()
    )
    .ok();
    writeln!(handle).ok();

    writeln!(handle, "Logs:       {}", log_dir().display()).ok();
}
