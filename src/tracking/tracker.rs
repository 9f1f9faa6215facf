//! Per-participant camera state machine.
//!
//! Off-time is integrated only when an observed off→on transition closes, so the
//! totals do not depend on how regular the polling cadence is.

use chrono::{DateTime, Local};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::error::TrackerError;
use super::session::{SessionInfo, SessionRecord};

/// Instantaneous camera state reported by the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraState {
    On,
    Off,
}

impl CameraState {
    /// Anything other than `"on"` counts as off, including a missing value.
    pub fn from_status(status: Option<&str>) -> Self {
        match status {
            Some(value) if value.eq_ignore_ascii_case("on") => Self::On,
            _ => Self::Off,
        }
    }
}

/// Observable camera transition.
#[derive(Debug, Clone, PartialEq)]
pub enum CameraEvent {
    TurnedOff {
        identifier: String,
        name: String,
        at: DateTime<Local>,
    },
    TurnedOn {
        identifier: String,
        name: String,
        at: DateTime<Local>,
        off_seconds: f64,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticipantRecord {
    pub identifier: String,
    pub display_name: String,
    /// Seconds off during the current session.
    pub camera_off_total: f64,
    /// Seconds off across all finalized sessions.
    pub cumulative_camera_off_total: f64,
    /// Set while the camera is off and has not come back on.
    pub camera_off_start: Option<DateTime<Local>>,
    /// First observation in the current session.
    pub join_time: Option<DateTime<Local>>,
    pub session_history: Vec<SessionRecord>,
}

impl ParticipantRecord {
    pub fn new(identifier: &str, name: &str, now: DateTime<Local>) -> Self {
        Self {
            identifier: identifier.to_string(),
            display_name: name.to_string(),
            camera_off_total: 0.0,
            cumulative_camera_off_total: 0.0,
            camera_off_start: None,
            join_time: Some(now),
            session_history: Vec::new(),
        }
    }

    /// Clear everything scoped to a single session, keeping cumulative data.
    pub fn reset_session(&mut self) {
        self.camera_off_total = 0.0;
        self.camera_off_start = None;
        self.join_time = None;
    }

    fn close_off_interval(&mut self, now: DateTime<Local>) -> Option<f64> {
        let started = self.camera_off_start.take()?;
        let off_seconds = seconds_between(started, now);
        self.camera_off_total += off_seconds;
        Some(off_seconds)
    }
}

/// Owns the live `identifier -> ParticipantRecord` mapping for one session.
#[derive(Debug, Default)]
pub struct CameraTracker {
    participants: IndexMap<String, ParticipantRecord>,
    finalized: bool,
}

impl CameraTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(participants: IndexMap<String, ParticipantRecord>) -> Self {
        Self {
            participants,
            finalized: false,
        }
    }

    pub fn records(&self) -> &IndexMap<String, ParticipantRecord> {
        &self.participants
    }

    pub fn get(&self, identifier: &str) -> Option<&ParticipantRecord> {
        self.participants.get(identifier)
    }

    pub fn len(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    /// Register a participant for the current session.
    ///
    /// Unknown identifiers get a fresh record joined at `now`. Known identifiers
    /// without a join time (loaded from a previous session) are joined at `now`.
    /// Already-joined participants only get their name refreshed.
    pub fn initialize(&mut self, identifier: &str, name: &str, now: DateTime<Local>) {
        match self.participants.get_mut(identifier) {
            Some(record) => {
                record.display_name = name.to_string();
                if record.join_time.is_none() {
                    record.join_time = Some(now);
                }
            }
            None => {
                self.participants.insert(
                    identifier.to_string(),
                    ParticipantRecord::new(identifier, name, now),
                );
            }
        }
    }

    /// Apply one camera observation. Returns the transition it caused, if any.
    pub fn update_status(
        &mut self,
        identifier: &str,
        name: &str,
        state: CameraState,
        now: DateTime<Local>,
    ) -> Result<Option<CameraEvent>, TrackerError> {
        let record = self
            .participants
            .get_mut(identifier)
            .ok_or_else(|| TrackerError::UnknownParticipant(identifier.to_string()))?;
        record.display_name = name.to_string();

        let event = match (state, record.camera_off_start) {
            (CameraState::Off, None) => {
                record.camera_off_start = Some(now);
                info!("[{}] {} turned camera OFF", now.format("%H:%M:%S"), name);
                Some(CameraEvent::TurnedOff {
                    identifier: identifier.to_string(),
                    name: name.to_string(),
                    at: now,
                })
            }
            (CameraState::On, Some(_)) => {
                let off_seconds = record.close_off_interval(now).unwrap_or_default();
                info!(
                    "[{}] {} turned camera ON (was off for {:.1} seconds)",
                    now.format("%H:%M:%S"),
                    name,
                    off_seconds
                );
                Some(CameraEvent::TurnedOn {
                    identifier: identifier.to_string(),
                    name: name.to_string(),
                    at: now,
                    off_seconds,
                })
            }
            _ => None,
        };

        Ok(event)
    }

    /// Fold this session into the cumulative totals and session history.
    ///
    /// Runs at most once per tracker; later calls return `false` and change nothing.
    /// With `close_open_intervals`, cameras still off are closed at `now` first,
    /// otherwise their trailing off-time is dropped.
    pub fn finalize(
        &mut self,
        session: &SessionInfo,
        now: DateTime<Local>,
        close_open_intervals: bool,
    ) -> bool {
        if self.finalized {
            return false;
        }

        for record in self.participants.values_mut() {
            if close_open_intervals {
                if let Some(off_seconds) = record.close_off_interval(now) {
                    info!(
                        "{} still had camera off at session end, adding {:.1} seconds",
                        record.display_name, off_seconds
                    );
                }
            }

            record.cumulative_camera_off_total += record.camera_off_total;

            if record.join_time.is_some() {
                record
                    .session_history
                    .push(SessionRecord::new(session, record.camera_off_total));
            }
        }

        self.finalized = true;
        true
    }
}

/// Non-negative seconds from `start` to `end`, with millisecond resolution.
pub fn seconds_between(start: DateTime<Local>, end: DateTime<Local>) -> f64 {
    let millis = (end - start).num_milliseconds().max(0);
    millis as f64 / 1000.0
}
