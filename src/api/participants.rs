use async_trait::async_trait;
use serde::{Deserialize, Deserializer};
use anyhow::Context;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use super::error::FetchError;
use crate::auth::CredentialProvider;
use crate::tracking::CameraState;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// One participant's camera state at the moment of the poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParticipantObservation {
    pub participant_id: String,
    pub display_name: String,
    pub camera_state: CameraState,
}

/// Current participants of a meeting. Implementations return an empty list on
/// any failure and log the reason themselves.
#[async_trait]
pub trait ParticipantSource: Send + Sync {
    async fn fetch(&self, meeting_id: &str) -> Vec<ParticipantObservation>;
}

#[derive(Debug, Deserialize)]
struct ParticipantsResponse {
    #[serde(default)]
    participants: Vec<RawParticipant>,
}

#[derive(Debug, Deserialize)]
struct RawParticipant {
    #[serde(default, deserialize_with = "string_or_number")]
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    video: Option<String>,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        serde_json::Value::Null => Ok(String::new()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number id, got {}",
            other
        ))),
    }
}

/// Turn a participants payload into observations, dropping entries without an id.
pub fn parse_participants(body: &str) -> Result<Vec<ParticipantObservation>, FetchError> {
    let response: ParticipantsResponse = serde_json::from_str(body)?;

    Ok(response
        .participants
        .into_iter()
        .filter_map(|raw| {
            if raw.id.is_empty() {
                debug!("Skipping participant without id: {:?}", raw.name);
                return None;
            }
            Some(ParticipantObservation {
                camera_state: CameraState::from_status(raw.video.as_deref()),
                participant_id: raw.id,
                display_name: raw.name,
            })
        })
        .collect())
}

/// Reads live participants from the Zoom REST API.
pub struct ZoomParticipantSource {
    client: reqwest::Client,
    api_base: String,
    credentials: Arc<dyn CredentialProvider>,
}

impl ZoomParticipantSource {
    pub fn new(
        api_base: &str,
        credentials: Arc<dyn CredentialProvider>,
    ) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            credentials,
        })
    }

    fn participants_url(&self, meeting_id: &str) -> String {
        format!("{}/meetings/{}/participants", self.api_base, meeting_id)
    }

    async fn try_fetch(&self, meeting_id: &str) -> Result<Vec<ParticipantObservation>, FetchError> {
        let token = self
            .credentials
            .get_token()
            .await
            .ok_or(FetchError::NoToken)?;

        let response = self
            .client
            .get(self.participants_url(meeting_id))
            .bearer_auth(token)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(FetchError::from_status(meeting_id, status, body));
        }

        parse_participants(&body)
    }
}

#[async_trait]
impl ParticipantSource for ZoomParticipantSource {
    async fn fetch(&self, meeting_id: &str) -> Vec<ParticipantObservation> {
        match self.try_fetch(meeting_id).await {
            Ok(participants) => participants,
            Err(FetchError::NoToken) => {
                warn!("Failed to get access token, skipping this poll");
                Vec::new()
            }
            Err(e) => {
                warn!("Error getting participants: {}", e);
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::StubServer;

    struct NoToken;

    #[async_trait]
    impl CredentialProvider for NoToken {
        async fn get_token(&self) -> Option<String> {
            None
        }
    }

    struct FixedToken;

    #[async_trait]
    impl CredentialProvider for FixedToken {
        async fn get_token(&self) -> Option<String> {
            Some("tok".to_string())
        }
    }

    #[test]
    fn test_parse_participants() {
        let body = r#"{
            "page_count": 1,
            "participants": [
                {"id": "abc", "name": "Alice", "video": "on"},
                {"id": 42, "name": "Bob", "video": "off"},
                {"id": "carol", "name": "Carol"},
                {"name": "Nobody", "video": "on"}
            ]
        }"#;

        let parsed = parse_participants(body).unwrap();
        assert_eq!(parsed.len(), 3);
        assert_eq!(parsed[0].participant_id, "abc");
        assert_eq!(parsed[0].camera_state, CameraState::On);
        assert_eq!(parsed[1].participant_id, "42");
        assert_eq!(parsed[1].display_name, "Bob");
        assert_eq!(parsed[1].camera_state, CameraState::Off);
        assert_eq!(parsed[2].camera_state, CameraState::Off);
    }

    #[test]
    fn test_parse_without_participants_key() {
        assert!(parse_participants("{}").unwrap().is_empty());
    }

    #[test]
    fn test_parse_invalid_body() {
        assert!(matches!(
            parse_participants("<html>"),
            Err(FetchError::Parse(_))
        ));
    }

    #[test]
    fn test_participants_url() {
        let source =
            ZoomParticipantSource::new("https://api.zoom.us/v2/", Arc::new(NoToken)).unwrap();
        assert_eq!(
            source.participants_url("123"),
            "https://api.zoom.us/v2/meetings/123/participants"
        );
    }

    #[tokio::test]
    async fn test_fetch_without_token_is_empty() {
        let server = StubServer::respond("200 OK", r#"{"participants":[]}"#).await;
        let source = ZoomParticipantSource::new(&server.base_url, Arc::new(NoToken)).unwrap();

        assert!(source.fetch("123").await.is_empty());
        assert_eq!(server.hits(), 0);
    }

    #[tokio::test]
    async fn test_unauthorized_fetch() {
        let server = StubServer::respond("401 Unauthorized", r#"{"code":124}"#).await;
        let source = ZoomParticipantSource::new(&server.base_url, Arc::new(FixedToken)).unwrap();

        assert!(matches!(
            source.try_fetch("123").await,
            Err(FetchError::Unauthorized)
        ));
        assert!(source.fetch("123").await.is_empty());
        assert_eq!(server.hits(), 2);
    }

    #[tokio::test]
    async fn test_fetch_parses_live_response() {
        let server = StubServer::respond(
            "200 OK",
            r#"{"participants":[{"id":"abc","name":"Alice","video":"on"}]}"#,
        )
        .await;
        let source = ZoomParticipantSource::new(&server.base_url, Arc::new(FixedToken)).unwrap();

        let participants = source.fetch("123").await;
        assert_eq!(participants.len(), 1);
        assert_eq!(participants[0].display_name, "Alice");
        assert_eq!(participants[0].camera_state, CameraState::On);
    }
}
