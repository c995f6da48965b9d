use std::fs;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use tracing::{info, warn};

/// File name prefix of the daily-rolled log files.
pub const LOG_FILE_PREFIX: &str = "swapdeck.log";

/// Total log size above which a warning is emitted (50MB)
const MAX_LOG_SIZE: u64 = 50 * 1024 * 1024;

/// Number of daily log files kept by [`rotate_logs`]
const MAX_LOG_FILES: usize = 7;

fn is_log_file(path: &Path) -> bool {
    path.is_file()
        && path
            .file_name()
            .map_or(false, |name| name.to_string_lossy().starts_with(LOG_FILE_PREFIX))
}

fn log_files(log_dir: &Path) -> anyhow::Result<Vec<(PathBuf, fs::Metadata)>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(log_dir)? {
        let path = entry?.path();
        if is_log_file(&path) {
            if let Ok(metadata) = fs::metadata(&path) {
                files.push((path, metadata));
            }
        }
    }
    Ok(files)
}

/// Creates the log directory if needed and reports its total size.
pub fn check_log_directory(log_dir: &str) -> anyhow::Result<()> {
    let log_path = Path::new(log_dir);
    if !log_path.exists() {
        fs::create_dir_all(log_path)?;
        info!(target: "log_management", "Created log directory: {}", log_dir);
        return Ok(());
    }

    let files = log_files(log_path)?;
    let total_size: u64 = files.iter().map(|(_, m)| m.len()).sum();

    if total_size > MAX_LOG_SIZE {
        warn!(
            target: "log_management",
            total_size_mb = total_size / (1024 * 1024),
            max_size_mb = MAX_LOG_SIZE / (1024 * 1024),
            "Log directory size exceeds recommended maximum"
        );
    } else {
        info!(
            target: "log_management",
            total_size_mb = total_size / (1024 * 1024),
            log_count = files.len(),
            "Log directory size within limits"
        );
    }
    Ok(())
}

/// Removes all but the newest [`MAX_LOG_FILES`] log files. Returns how many
/// were removed.
pub fn rotate_logs(log_dir: &str) -> anyhow::Result<usize> {
    let log_path = Path::new(log_dir);
    if !log_path.exists() {
        return Ok(0);
    }

    let mut files: Vec<(PathBuf, u64)> = log_files(log_path)?
        .into_iter()
        .map(|(path, metadata)| {
            let modified = metadata
                .modified()
                .ok()
                .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
                .map(|d| d.as_secs())
                .unwrap_or_default();
            (path, modified)
        })
        .collect();

    // Newest first; daily names break ties in date order.
    files.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| b.0.cmp(&a.0)));

    let mut removed = 0;
    for (path, _) in files.iter().skip(MAX_LOG_FILES) {
        info!(target: "log_management", path = %path.display(), "Removing old log file");
        match fs::remove_file(path) {
            Ok(()) => removed += 1,
            Err(e) => {
                warn!(target: "log_management", path = %path.display(), error = %e, "Failed to remove old log file")
            }
        }
    }
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotate_keeps_newest_files() {
        let dir = std::env::temp_dir().join(format!("swapdeck-logs-{}", uuid::Uuid::new_v4()));
        fs::create_dir_all(&dir).unwrap();
        for day in 1..=9 {
            fs::write(dir.join(format!("{}.2024-01-{:02}", LOG_FILE_PREFIX, day)), "x").unwrap();
        }
        fs::write(dir.join("unrelated.txt"), "keep").unwrap();

        let removed = rotate_logs(dir.to_str().unwrap()).unwrap();
        assert_eq!(removed, 2);

        let remaining = log_files(&dir).unwrap();
        assert_eq!(remaining.len(), MAX_LOG_FILES);
        assert!(dir.join("unrelated.txt").exists());

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_missing_directory_is_not_an_error() {
        let dir = std::env::temp_dir().join(format!("swapdeck-missing-{}", uuid::Uuid::new_v4()));
        assert_eq!(rotate_logs(dir.to_str().unwrap()).unwrap(), 0);
    }
}
