//! Session identity and the per-participant snapshot written at finalization.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Identity of one tracking run, fixed at process start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionInfo {
    pub session_id: String,
    pub day: String,
    pub date: String,
}

impl SessionInfo {
    pub fn start(now: DateTime<Local>) -> Self {
        Self {
            session_id: now.format("%Y%m%d_%H%M%S").to_string(),
            day: now.format("%A").to_string(),
            date: now.format("%Y-%m-%d").to_string(),
        }
    }

    /// Label used in console reports, e.g. `2024-03-04 (Monday)`.
    pub fn label(&self) -> String {
        format!("{} ({})", self.date, self.day)
    }
}

/// Immutable outcome of one finalized session for one participant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub session_id: String,
    pub day: String,
    pub date: String,
    pub camera_off_seconds: f64,
    pub camera_off_minutes: f64,
}

impl SessionRecord {
    pub fn new(session: &SessionInfo, camera_off_seconds: f64) -> Self {
        Self {
            session_id: session.session_id.clone(),
            day: session.day.clone(),
            date: session.date.clone(),
            camera_off_seconds,
            camera_off_minutes: round2(camera_off_seconds / 60.0),
        }
    }
}

/// Round to two decimal places for display and export.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_session_info_formats() {
        let now = Local.with_ymd_and_hms(2024, 3, 4, 9, 5, 7).unwrap();
        let session = SessionInfo::start(now);
        assert_eq!(session.session_id, "20240304_090507");
        assert_eq!(session.day, "Monday");
        assert_eq!(session.date, "2024-03-04");
        assert_eq!(session.label(), "2024-03-04 (Monday)");
    }

    #[test]
    fn test_session_record_minutes() {
        let now = Local.with_ymd_and_hms(2024, 3, 4, 9, 0, 0).unwrap();
        let record = SessionRecord::new(&SessionInfo::start(now), 95.0);
        assert_eq!(record.camera_off_seconds, 95.0);
        assert_eq!(record.camera_off_minutes, 1.58);
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(1.005_1), 1.01);
        assert_eq!(round2(0.0), 0.0);
        assert_eq!(round2(33.333_333), 33.33);
    }
}
