//! Log-file path construction
//!
//! Log files land in a per-platform log root: `/var/log` on Linux,
//! `~/Library/Logs` on macOS, the system temporary directory elsewhere.

use arpscope_core::Result;
use chrono::{DateTime, Local};
use std::path::PathBuf;

/// File name for a watch session started at `now`
pub fn log_file_name(now: DateTime<Local>) -> String {
    format!("arpscope_{}.log", now.format("%Y-%m-%d_%H.%M.%S%.9f"))
}

fn default_log_root() -> PathBuf {
    if cfg!(target_os = "linux") {
        PathBuf::from("/var/log")
    } else if cfg!(target_os = "macos") {
        std::env::var_os("HOME")
            .map(|home| PathBuf::from(home).join("Library").join("Logs"))
            .unwrap_or_else(std::env::temp_dir)
    } else {
        std::env::temp_dir()
    }
}

/// Build the default log file path, creating the log directory on demand
pub fn default_log_path(now: DateTime<Local>) -> Result<PathBuf> {
    let dir = default_log_root().join("arpscope");
    std::fs::create_dir_all(&dir)?;
    Ok(dir.join(log_file_name(now)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_log_file_name_format() {
        let now = Local.with_ymd_and_hms(2026, 8, 7, 13, 5, 59).unwrap();
        let name = log_file_name(now);
        assert!(name.starts_with("arpscope_2026-08-07_13.05.59"));
        assert!(name.ends_with(".log"));
    }

    #[test]
    fn test_names_are_unique_per_instant() {
        let a = Local.with_ymd_and_hms(2026, 8, 7, 13, 5, 59).unwrap();
        let b = a + chrono::Duration::nanoseconds(1_000_000);
        assert_ne!(log_file_name(a), log_file_name(b));
    }
}
