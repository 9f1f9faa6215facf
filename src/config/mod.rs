use crate::global;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};

/// Environment variable names holding the Zoom server-to-server OAuth credentials.
pub mod credential_env {
    pub const ACCOUNT_ID: &str = "ZOOM_ACCOUNT_ID";
    pub const CLIENT_ID: &str = "ZOOM_CLIENT_ID";
    pub const CLIENT_SECRET: &str = "ZOOM_CLIENT_SECRET";
    pub const MEETING_ID: &str = "ZOOM_MEETING_ID";
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub tracking: TrackingConfig,
    pub output: OutputConfig,
    pub store: StoreConfig,
    pub zoom: ZoomConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingConfig {
    /// Seconds to sleep between participant polls.
    pub poll_interval_seconds: u64,
    /// Total tracking run length in minutes (default: 210 = 3.5 hours)
    pub duration_minutes: u64,
    pub save_interim: bool,
    pub interim_minutes: u64,
    /// Close cameras still off at the end of the session instead of dropping
    /// the trailing off-time.
    pub close_open_intervals: bool,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            poll_interval_seconds: 15,
            duration_minutes: 210,
            save_interim: true,
            interim_minutes: 30,
            close_open_intervals: false,
        }
    }
}

impl TrackingConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_seconds.max(1))
    }

    pub fn duration(&self) -> Duration {
        Duration::from_secs(self.duration_minutes.saturating_mul(60))
    }

    pub fn interim_interval(&self) -> Duration {
        Duration::from_secs(self.interim_minutes.saturating_mul(60))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory CSV reports are written into.
    pub directory: PathBuf,
    /// Also export the flattened per-session history at the end of a run.
    pub detailed_history: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
            detailed_history: false,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub directory: Option<PathBuf>,
}

impl StoreConfig {
    pub fn resolve_dir(&self) -> Result<PathBuf> {
        match &self.directory {
            Some(dir) => Ok(dir.clone()),
            None => global::meetings_dir(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoomConfig {
    pub oauth_url: String,
    pub api_base: String,
}

impl Default for ZoomConfig {
    fn default() -> Self {
        Self {
            oauth_url: "https://zoom.us/oauth/token".to_string(),
            api_base: "https://api.zoom.us/v2".to_string(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        if !config_path.exists() {
            info!(
                "Config file not found, creating default at {:?}",
                config_path
            );
            let config = Self::default();
            config.save()?;
            return Ok(config);
        }

        let content =
            std::fs::read_to_string(&config_path).context("Failed to read config file")?;

        let config: Self = toml::from_str(&content).context("Failed to parse config file")?;

        info!("Loaded config from {:?}", config_path);
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(&config_path, content).context("Failed to write config file")?;

        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        global::config_file()
    }
}

/// Read `.env` from the working directory into the process environment.
/// Variables already set are left untouched.
pub fn load_dotenv() -> Result<()> {
    match dotenvy::dotenv() {
        Ok(path) => debug!("Loaded environment from {:?}", path),
        Err(e) if e.not_found() => debug!("No .env file found"),
        Err(e) => return Err(e).context("Failed to read .env file"),
    }
    Ok(())
}

/// Zoom credentials and the meeting to track, read from the environment.
#[derive(Clone)]
pub struct Credentials {
    pub account_id: String,
    pub client_id: String,
    pub client_secret: String,
    pub meeting_id: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("account_id", &self.account_id)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("meeting_id", &self.meeting_id)
            .finish()
    }
}

impl Credentials {
    /// Load credentials from the process environment. `meeting_override` takes
    /// precedence over `ZOOM_MEETING_ID`.
    pub fn from_env(meeting_override: Option<&str>) -> Result<Self> {
        Self::from_lookup(|key| {
            if key == credential_env::MEETING_ID {
                if let Some(meeting) = meeting_override {
                    return Some(meeting.to_string());
                }
            }
            std::env::var(key).ok()
        })
    }

    /// Build credentials from any key lookup. Every missing or empty variable is
    /// reported in a single error.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let fetch = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let account_id = fetch(credential_env::ACCOUNT_ID);
        let client_id = fetch(credential_env::CLIENT_ID);
        let client_secret = fetch(credential_env::CLIENT_SECRET);
        let meeting_id = fetch(credential_env::MEETING_ID);

        let missing: Vec<&str> = [
            (credential_env::ACCOUNT_ID, account_id.is_none()),
            (credential_env::CLIENT_ID, client_id.is_none()),
            (credential_env::CLIENT_SECRET, client_secret.is_none()),
            (credential_env::MEETING_ID, meeting_id.is_none()),
        ]
        .into_iter()
        .filter_map(|(key, absent)| absent.then_some(key))
        .collect();

        match (account_id, client_id, client_secret, meeting_id) {
            (Some(account_id), Some(client_id), Some(client_secret), Some(meeting_id)) => {
                Ok(Self {
                    account_id,
                    client_id,
                    client_secret,
                    meeting_id,
                })
            }
            _ => bail!(
                "Missing credentials: {}. Set them in the environment or in a .env file",
                missing.join(", ")
            ),
        }
    }
}
