//! Per-meeting persistence of participant records.
//!
//! One pretty-printed JSON file per meeting identifier. Writes go through a
//! temporary file in the same directory that is renamed over the target.

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use indexmap::IndexMap;
use serde::Deserialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{error, info, warn};

use super::session::SessionRecord;
use super::tracker::{CameraTracker, ParticipantRecord};

/// On-disk shape accepted by `load`. Older files may lack the cumulative
/// total or history; those are filled in during conversion.
#[derive(Debug, Deserialize)]
struct StoredParticipant {
    #[serde(default)]
    identifier: String,
    #[serde(alias = "name", default)]
    display_name: String,
    #[serde(default)]
    camera_off_total: f64,
    #[serde(default)]
    cumulative_camera_off_total: Option<f64>,
    #[serde(default)]
    camera_off_start: Option<DateTime<Local>>,
    #[serde(default)]
    join_time: Option<DateTime<Local>>,
    #[serde(default)]
    session_history: Vec<SessionRecord>,
}

impl StoredParticipant {
    fn into_fresh_session(self, key: &str) -> ParticipantRecord {
        let cumulative = self
            .cumulative_camera_off_total
            .unwrap_or(self.camera_off_total);
        let identifier = if self.identifier.is_empty() {
            key.to_string()
        } else {
            self.identifier
        };

        let mut record = ParticipantRecord {
            identifier,
            display_name: self.display_name,
            camera_off_total: self.camera_off_total,
            cumulative_camera_off_total: cumulative,
            camera_off_start: self.camera_off_start,
            join_time: self.join_time,
            session_history: self.session_history,
        };
        record.reset_session();
        record
    }
}

pub struct SessionStore {
    dir: PathBuf,
}

impl SessionStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File backing the given meeting.
    pub fn path_for(&self, meeting_key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", sanitize_key(meeting_key)))
    }

    /// Load the tracker for a meeting with every record reset to a fresh session.
    ///
    /// A missing file yields an empty tracker. Unreadable or corrupt data is
    /// logged and also yields an empty tracker.
    pub fn load(&self, meeting_key: &str) -> CameraTracker {
        let path = self.path_for(meeting_key);
        if !path.exists() {
            info!("No stored data for meeting {}, starting fresh", meeting_key);
            return CameraTracker::new();
        }

        match Self::read_records(&path) {
            Ok(records) => {
                info!(
                    "Loaded cumulative data for {} participants from previous sessions",
                    records.len()
                );
                CameraTracker::from_records(records)
            }
            Err(e) => {
                error!("Error loading cumulative data from {:?}: {:#}", path, e);
                warn!("Starting with fresh tracking data");
                CameraTracker::new()
            }
        }
    }

    fn read_records(path: &Path) -> Result<IndexMap<String, ParticipantRecord>> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let stored: IndexMap<String, StoredParticipant> =
            serde_json::from_str(&content).context("Failed to parse stored participants")?;

        Ok(stored
            .into_iter()
            .map(|(key, participant)| {
                let record = participant.into_fresh_session(&key);
                (key, record)
            })
            .collect())
    }

    /// Persist the full mapping for a meeting, replacing any previous content.
    pub fn save(&self, meeting_key: &str, tracker: &CameraTracker) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create store directory {}", self.dir.display()))?;

        let path = self.path_for(meeting_key);
        let content = serde_json::to_string_pretty(tracker.records())
            .context("Failed to serialize participant records")?;

        let mut tmp = NamedTempFile::new_in(&self.dir)
            .context("Failed to create temporary store file")?;
        tmp.write_all(content.as_bytes())
            .context("Failed to write temporary store file")?;
        tmp.as_file()
            .sync_all()
            .context("Failed to flush temporary store file")?;
        tmp.persist(&path)
            .map_err(|e| e.error)
            .with_context(|| format!("Failed to replace {}", path.display()))?;

        info!("Saved cumulative data to {:?}", path);
        Ok(path)
    }
}

fn sanitize_key(meeting_key: &str) -> String {
    let sanitized: String = meeting_key
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if sanitized.is_empty() {
        "meeting".to_string()
    } else {
        sanitized
    }
}
