//! CLI handler for live tracking.

use anyhow::Result;
use chrono::Local;
use std::sync::Arc;
use tracing::info;

use super::args::TrackCliArgs;
use crate::api::ZoomParticipantSource;
use crate::app::{TrackingOptions, TrackingSession};
use crate::auth::{CredentialProvider, ZoomAuth};
use crate::config::{Config, Credentials};
use crate::tracking::SessionStore;

pub async fn handle_track_command(args: TrackCliArgs) -> Result<()> {
    let config = Config::load()?;
    let credentials = Credentials::from_env(args.meeting.as_deref())?;
    let options = apply_overrides(TrackingOptions::from_config(&config), &args);

    let auth: Arc<dyn CredentialProvider> =
        Arc::new(ZoomAuth::new(&credentials, config.zoom.oauth_url.clone())?);
    let source = ZoomParticipantSource::new(&config.zoom.api_base, auth)?;
    let store = SessionStore::new(config.store.resolve_dir()?);
    info!("Using store directory {:?}", store.dir());

    let mut session = TrackingSession::new(
        credentials.meeting_id.clone(),
        Box::new(source),
        store,
        options,
        Local::now(),
    );
    session.run().await?;

    Ok(())
}

fn apply_overrides(mut options: TrackingOptions, args: &TrackCliArgs) -> TrackingOptions {
    if let Some(interval) = args.interval {
        options.poll_interval = std::time::Duration::from_secs(interval.max(1));
    }
    if let Some(minutes) = args.duration {
        options.duration = std::time::Duration::from_secs(minutes.saturating_mul(60));
    }
    if let Some(minutes) = args.interim {
        options.save_interim = true;
        options.interim_interval = std::time::Duration::from_secs(minutes.saturating_mul(60));
    }
    if args.no_interim {
        options.save_interim = false;
    }
    if let Some(dir) = &args.output_dir {
        options.output_dir = dir.clone();
    }
    options
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::Duration;

    #[test]
    fn test_apply_overrides() {
        let base = TrackingOptions::from_config(&Config::default());
        let args = TrackCliArgs {
            interval: Some(0),
            duration: Some(5),
            no_interim: true,
            output_dir: Some(PathBuf::from("/tmp/reports")),
            ..Default::default()
        };

        let options = apply_overrides(base, &args);
        assert_eq!(options.poll_interval, Duration::from_secs(1));
        assert_eq!(options.duration, Duration::from_secs(300));
        assert!(!options.save_interim);
        assert_eq!(options.output_dir, PathBuf::from("/tmp/reports"));
    }

    #[test]
    fn test_huge_duration_saturates() {
        let base = TrackingOptions::from_config(&Config::default());
        let args = TrackCliArgs {
            duration: Some(u64::MAX),
            interim: Some(u64::MAX / 10),
            ..Default::default()
        };

        let options = apply_overrides(base, &args);
        assert_eq!(options.duration, Duration::from_secs(u64::MAX));
        assert_eq!(options.interim_interval, Duration::from_secs(u64::MAX));
        assert!(options.save_interim);
    }

    #[test]
    fn test_no_overrides_keeps_config() {
        let base = TrackingOptions::from_config(&Config::default());
        let options = apply_overrides(base, &TrackCliArgs::default());
        assert_eq!(options.poll_interval, Duration::from_secs(15));
        assert_eq!(options.interim_interval, Duration::from_secs(1800));
        assert!(options.save_interim);
    }
}
