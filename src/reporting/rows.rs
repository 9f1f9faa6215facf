//! Result rows derived from tracker state.

use chrono::{DateTime, Local};
use indexmap::IndexMap;
use serde::Serialize;

use crate::tracking::{round2, seconds_between, ParticipantRecord};

const JOIN_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionRow {
    pub name: String,
    pub camera_off_seconds: f64,
    pub camera_off_minutes: f64,
    pub percentage_off: f64,
    pub join_time: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CumulativeRow {
    pub name: String,
    pub camera_off_seconds: f64,
    pub camera_off_minutes: f64,
    pub attended_sessions: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryRow {
    pub name: String,
    pub session_id: String,
    pub day: String,
    pub date: String,
    pub camera_off_seconds: f64,
    pub camera_off_minutes: f64,
}

/// Builds report rows from a borrowed participant mapping.
pub struct ReportBuilder<'a> {
    records: &'a IndexMap<String, ParticipantRecord>,
}

impl<'a> ReportBuilder<'a> {
    pub fn new(records: &'a IndexMap<String, ParticipantRecord>) -> Self {
        Self { records }
    }

    /// One row per participant who joined this session, most off-time first.
    pub fn session_results(&self, now: DateTime<Local>) -> Vec<SessionRow> {
        let mut rows: Vec<SessionRow> = self
            .records
            .values()
            .filter_map(|record| {
                let join_time = record.join_time?;
                let in_meeting = seconds_between(join_time, now);
                let percentage = if in_meeting > 0.0 {
                    record.camera_off_total / in_meeting * 100.0
                } else {
                    0.0
                };

                Some(SessionRow {
                    name: record.display_name.clone(),
                    camera_off_seconds: record.camera_off_total,
                    camera_off_minutes: round2(record.camera_off_total / 60.0),
                    percentage_off: round2(percentage),
                    join_time: join_time.format(JOIN_TIME_FORMAT).to_string(),
                })
            })
            .collect();

        rows.sort_by(|a, b| b.camera_off_seconds.total_cmp(&a.camera_off_seconds));
        rows
    }

    /// One row per known participant with cumulative totals, most off-time first.
    pub fn cumulative_results(&self) -> Vec<CumulativeRow> {
        let mut rows: Vec<CumulativeRow> = self
            .records
            .values()
            .map(|record| CumulativeRow {
                name: record.display_name.clone(),
                camera_off_seconds: record.cumulative_camera_off_total,
                camera_off_minutes: round2(record.cumulative_camera_off_total / 60.0),
                attended_sessions: record.session_history.len(),
            })
            .collect();

        rows.sort_by(|a, b| b.camera_off_seconds.total_cmp(&a.camera_off_seconds));
        rows
    }

    /// Every (participant, session) pair, ordered by name then date.
    pub fn history_rows(&self) -> Vec<HistoryRow> {
        let mut rows: Vec<HistoryRow> = self
            .records
            .values()
            .flat_map(|record| {
                record.session_history.iter().map(move |session| HistoryRow {
                    name: record.display_name.clone(),
                    session_id: session.session_id.clone(),
                    day: session.day.clone(),
                    date: session.date.clone(),
                    camera_off_seconds: session.camera_off_seconds,
                    camera_off_minutes: session.camera_off_minutes,
                })
            })
            .collect();

        rows.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.date.cmp(&b.date)));
        rows
    }
}
