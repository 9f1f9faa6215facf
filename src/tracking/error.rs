use thiserror::Error;

/// Contract violations inside the camera tracker.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TrackerError {
    #[error("participant {0} was never initialized for this session")]
    UnknownParticipant(String),
}
