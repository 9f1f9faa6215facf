//! Failure reasons for participant fetches.

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("no access token available")]
    NoToken,
    #[error("meeting {0} not found or has ended")]
    MeetingNotFound(String),
    #[error("unauthorized, check the API credentials and scopes (meeting:read:meeting:admin, meeting:read:participant:admin)")]
    Unauthorized,
    #[error("unexpected status {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("failed to parse participants response: {0}")]
    Parse(#[from] serde_json::Error),
}

impl FetchError {
    pub fn from_status(meeting_id: &str, status: StatusCode, body: String) -> Self {
        match status {
            StatusCode::NOT_FOUND => Self::MeetingNotFound(meeting_id.to_string()),
            StatusCode::UNAUTHORIZED => Self::Unauthorized,
            status => Self::Status { status, body },
        }
    }
}
