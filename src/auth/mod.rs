//! Bearer token acquisition for the Zoom API.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde::Deserialize;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, error, info};

use crate::config::Credentials;

/// Tokens are refreshed this long before the provider says they expire.
const EXPIRY_BUFFER: Duration = Duration::from_secs(300);
const DEFAULT_EXPIRES_IN: u64 = 3600;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Source of bearer tokens. `None` means no token is available right now; the
/// implementation logs the reason.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    async fn get_token(&self) -> Option<String>;
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: Option<u64>,
}

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

impl CachedToken {
    fn new(access_token: String, expires_in: Option<u64>, issued_at: Instant) -> Self {
        let lifetime = Duration::from_secs(expires_in.unwrap_or(DEFAULT_EXPIRES_IN))
            .saturating_sub(EXPIRY_BUFFER);
        Self {
            access_token,
            expires_at: issued_at + lifetime,
        }
    }

    fn is_valid(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

/// Zoom server-to-server OAuth (`account_credentials` grant).
pub struct ZoomAuth {
    client: reqwest::Client,
    token_url: String,
    account_id: String,
    client_id: String,
    client_secret: String,
    cached: Mutex<Option<CachedToken>>,
}

impl ZoomAuth {
    pub fn new(credentials: &Credentials, token_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self {
            client,
            token_url: token_url.into(),
            account_id: credentials.account_id.clone(),
            client_id: credentials.client_id.clone(),
            client_secret: credentials.client_secret.clone(),
            cached: Mutex::new(None),
        })
    }

    fn basic_auth_header(&self) -> String {
        let raw = format!("{}:{}", self.client_id, self.client_secret);
        format!("Basic {}", BASE64.encode(raw.as_bytes()))
    }

    async fn request_token(&self) -> Result<TokenResponse> {
        debug!("Requesting new access token from {}", self.token_url);

        let response = self
            .client
            .post(&self.token_url)
            .header(reqwest::header::AUTHORIZATION, self.basic_auth_header())
            .form(&[
                ("grant_type", "account_credentials"),
                ("account_id", self.account_id.as_str()),
            ])
            .send()
            .await
            .context("Failed to send token request")?;

        let status = response.status();
        let body = response
            .text()
            .await
            .context("Failed to read token response body")?;

        if !status.is_success() {
            bail!("Token request failed with status {}: {}", status, body);
        }

        serde_json::from_str(&body).context("Failed to parse token response")
    }
}

#[async_trait]
impl CredentialProvider for ZoomAuth {
    async fn get_token(&self) -> Option<String> {
        let mut cached = self.cached.lock().await;
        let now = Instant::now();

        if let Some(token) = cached.as_ref().filter(|token| token.is_valid(now)) {
            return Some(token.access_token.clone());
        }

        match self.request_token().await {
            Ok(response) => {
                let token = CachedToken::new(response.access_token, response.expires_in, now);
                info!(
                    "Obtained access token (valid for {}s)",
                    token.expires_at.saturating_duration_since(now).as_secs()
                );
                let access_token = token.access_token.clone();
                *cached = Some(token);
                Some(access_token)
            }
            Err(e) => {
                error!("Error getting access token: {:#}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::StubServer;

    fn credentials() -> Credentials {
        Credentials {
            account_id: "acct".to_string(),
            client_id: "client".to_string(),
            client_secret: "secret".to_string(),
            meeting_id: "123".to_string(),
        }
    }

    #[test]
    fn test_cached_token_expiry_buffer() {
        let issued = Instant::now();
        let token = CachedToken::new("abc".to_string(), Some(3600), issued);

        assert!(token.is_valid(issued));
        assert!(token.is_valid(issued + Duration::from_secs(3299)));
        assert!(!token.is_valid(issued + Duration::from_secs(3300)));
    }

    #[test]
    fn test_cached_token_default_lifetime() {
        let issued = Instant::now();
        let token = CachedToken::new("abc".to_string(), None, issued);
        assert_eq!(token.expires_at - issued, Duration::from_secs(3300));
    }

    #[test]
    fn test_short_lived_token_is_never_cached_as_valid() {
        let issued = Instant::now();
        let token = CachedToken::new("abc".to_string(), Some(60), issued);
        assert!(!token.is_valid(issued));
    }

    #[test]
    fn test_basic_auth_header() {
        let auth = ZoomAuth::new(&credentials(), "https://zoom.us/oauth/token").unwrap();
        assert_eq!(auth.basic_auth_header(), "Basic Y2xpZW50OnNlY3JldA==");
    }

    #[test]
    fn test_token_response_parsing() {
        let parsed: TokenResponse =
            serde_json::from_str(r#"{"access_token":"tok","token_type":"bearer","expires_in":3599}"#)
                .unwrap();
        assert_eq!(parsed.access_token, "tok");
        assert_eq!(parsed.expires_in, Some(3599));
    }

    #[tokio::test]
    async fn test_rejected_token_request_yields_none() {
        let server =
            StubServer::respond("401 Unauthorized", r#"{"reason":"Invalid client"}"#).await;
        let auth = ZoomAuth::new(&credentials(), server.url("/oauth/token")).unwrap();

        assert!(auth.get_token().await.is_none());
        assert_eq!(server.hits(), 1);
        assert!(auth.cached.lock().await.is_none());
    }

    #[tokio::test]
    async fn test_token_is_cached_between_calls() {
        let server = StubServer::respond(
            "200 OK",
            r#"{"access_token":"tok","token_type":"bearer","expires_in":3599}"#,
        )
        .await;
        let auth = ZoomAuth::new(&credentials(), server.url("/oauth/token")).unwrap();

        assert_eq!(auth.get_token().await.as_deref(), Some("tok"));
        assert_eq!(auth.get_token().await.as_deref(), Some("tok"));
        assert_eq!(server.hits(), 1);
    }
}
