//! CSV export of report rows.
//!
//! Headers are written explicitly so an empty report still produces a valid,
//! self-describing file.

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};

use super::rows::{CumulativeRow, HistoryRow, SessionRow};

pub trait CsvRow: Serialize {
    const HEADERS: &'static [&'static str];
}

impl CsvRow for SessionRow {
    const HEADERS: &'static [&'static str] = &[
        "name",
        "camera_off_seconds",
        "camera_off_minutes",
        "percentage_off",
        "join_time",
    ];
}

impl CsvRow for CumulativeRow {
    const HEADERS: &'static [&'static str] = &[
        "name",
        "camera_off_seconds",
        "camera_off_minutes",
        "attended_sessions",
    ];
}

impl CsvRow for HistoryRow {
    const HEADERS: &'static [&'static str] = &[
        "name",
        "session_id",
        "day",
        "date",
        "camera_off_seconds",
        "camera_off_minutes",
    ];
}

/// Write `rows` to `path`, creating parent directories as needed.
pub fn write_csv<T: CsvRow>(path: &Path, rows: &[T]) -> Result<PathBuf> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create output directory {}", parent.display()))?;
    }

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;

    writer
        .write_record(T::HEADERS)
        .context("Failed to write CSV header")?;
    for row in rows {
        writer.serialize(row).context("Failed to write CSV row")?;
    }
    writer.flush().context("Failed to flush CSV output")?;

    Ok(path.to_path_buf())
}

/// File names used for each export, keyed by meeting and timestamp.
pub mod file_names {
    pub fn interim(meeting_id: &str, stamp: &str) -> String {
        format!("interim_zoom_tracking_{}_{}.csv", meeting_id, stamp)
    }

    pub fn session(meeting_id: &str, stamp: &str) -> String {
        format!("session_zoom_tracking_{}_{}.csv", meeting_id, stamp)
    }

    pub fn cumulative(meeting_id: &str, stamp: &str) -> String {
        format!("cumulative_zoom_tracking_{}_{}.csv", meeting_id, stamp)
    }

    pub fn detailed_history(meeting_id: &str, stamp: &str) -> String {
        format!("detailed_history_{}_{}.csv", meeting_id, stamp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_session_csv() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.csv");
        let rows = vec![SessionRow {
            name: "Doe, Jane".to_string(),
            camera_off_seconds: 30.0,
            camera_off_minutes: 0.5,
            percentage_off: 12.5,
            join_time: "2024-03-04 10:00:00".to_string(),
        }];

        write_csv(&path, &rows).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        let mut lines = content.lines();
        assert_eq!(
            lines.next(),
            Some("name,camera_off_seconds,camera_off_minutes,percentage_off,join_time")
        );
        assert_eq!(
            lines.next(),
            Some("\"Doe, Jane\",30.0,0.5,12.5,2024-03-04 10:00:00")
        );
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn test_empty_report_still_has_header() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("cumulative.csv");

        write_csv::<CumulativeRow>(&path, &[]).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            content.trim_end(),
            "name,camera_off_seconds,camera_off_minutes,attended_sessions"
        );
    }

    #[test]
    fn test_write_to_missing_directory_fails() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, "x").unwrap();

        let result = write_csv::<HistoryRow>(&blocker.join("history.csv"), &[]);
        assert!(result.is_err());
    }

    #[test]
    fn test_file_names() {
        assert_eq!(
            file_names::session("123", "20240304_100000"),
            "session_zoom_tracking_123_20240304_100000.csv"
        );
        assert_eq!(
            file_names::detailed_history("123", "20240304_100000"),
            "detailed_history_123_20240304_100000.csv"
        );
    }
}
