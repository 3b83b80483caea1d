use std::{
    env,
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
    sync::{Mutex, OnceLock},
};

use chrono::{DateTime, SecondsFormat, Utc};

use crate::{APP_DIR_NAME, KIOSK_LOG_FILE, LOG_DIR_ENV};

static KIOSK_LOG_WRITE_LOCK: Mutex<()> = Mutex::new(());
static KIOSK_LOG_PATH: OnceLock<PathBuf> = OnceLock::new();

pub(crate) fn resolve_kiosk_log_dir(override_dir: Option<&str>, data_dir: Option<PathBuf>) -> PathBuf {
    if let Some(dir) = override_dir.map(str::trim).filter(|dir| !dir.is_empty()) {
        return PathBuf::from(dir);
    }

    data_dir
        .map(|dir| dir.join(APP_DIR_NAME))
        .unwrap_or_else(|| env::temp_dir().join(APP_DIR_NAME))
}

pub(crate) fn kiosk_log_path() -> &'static Path {
    KIOSK_LOG_PATH.get_or_init(|| {
        let override_dir = env::var(LOG_DIR_ENV).ok();
        resolve_kiosk_log_dir(override_dir.as_deref(), dirs::data_dir()).join(KIOSK_LOG_FILE)
    })
}

pub(crate) fn format_log_line(timestamp: DateTime<Utc>, message: &str) -> String {
    format!(
        "[{}] {}\n",
        timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
        message
    )
}

pub(crate) fn append_log_line(path: &Path, line: &str, lock: &Mutex<()>) -> Result<(), String> {
    let _guard = lock
        .lock()
        .map_err(|_| "Kiosk log lock poisoned.".to_string())?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|error| {
            format!(
                "Failed to create log directory {}: {}",
                parent.display(),
                error
            )
        })?;
    }

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|error| format!("Failed to open log {}: {}", path.display(), error))?;
    file.write_all(line.as_bytes())
        .map_err(|error| format!("Failed to write log {}: {}", path.display(), error))
}

/// Appends one timestamped line to the kiosk log and echoes it to stderr.
///
/// Never fails: a broken log file only loses the file copy of the line.
pub(crate) fn append_kiosk_log(message: &str) {
    let line = format_log_line(Utc::now(), message);
    let _ = append_log_line(kiosk_log_path(), &line, &KIOSK_LOG_WRITE_LOCK);
    eprintln!("{message}");
}
