//! Poll loop orchestration for one tracking session.
//!
//! fetch → update tracker → (interim save) → sleep, until the deadline or
//! Ctrl-C, then finalize → export → save → print.

use anyhow::Result;
use chrono::{DateTime, Local};
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::api::ParticipantSource;
use crate::config::Config;
use crate::reporting::{
    file_names, render_cumulative_table, render_session_table, write_csv, CumulativeRow,
    ReportBuilder, SessionRow,
};
use crate::tracking::{CameraTracker, SessionInfo, SessionStore};

const STAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Knobs for a single tracking run.
#[derive(Debug, Clone)]
pub struct TrackingOptions {
    pub poll_interval: Duration,
    pub duration: Duration,
    pub save_interim: bool,
    pub interim_interval: Duration,
    pub close_open_intervals: bool,
    pub output_dir: PathBuf,
    pub detailed_history: bool,
}

impl TrackingOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            poll_interval: config.tracking.poll_interval(),
            duration: config.tracking.duration(),
            save_interim: config.tracking.save_interim,
            interim_interval: config.tracking.interim_interval(),
            close_open_intervals: config.tracking.close_open_intervals,
            output_dir: config.output.directory.clone(),
            detailed_history: config.output.detailed_history,
        }
    }
}

/// Outcome of a single poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickSummary {
    pub participants: usize,
    pub camera_changes: usize,
}

/// What a finished session produced.
pub struct SessionSummary {
    pub session_rows: Vec<SessionRow>,
    pub cumulative_rows: Vec<CumulativeRow>,
    pub exported: Vec<PathBuf>,
    pub store_path: Option<PathBuf>,
}

pub struct TrackingSession {
    meeting_id: String,
    source: Box<dyn ParticipantSource>,
    store: SessionStore,
    tracker: CameraTracker,
    session: SessionInfo,
    options: TrackingOptions,
    last_save: DateTime<Local>,
}

impl TrackingSession {
    /// Start a session, loading prior cumulative data for the meeting.
    pub fn new(
        meeting_id: impl Into<String>,
        source: Box<dyn ParticipantSource>,
        store: SessionStore,
        options: TrackingOptions,
        started_at: DateTime<Local>,
    ) -> Self {
        let meeting_id = meeting_id.into();
        let tracker = store.load(&meeting_id);

        Self {
            meeting_id,
            source,
            store,
            tracker,
            session: SessionInfo::start(started_at),
            options,
            last_save: started_at,
        }
    }

    pub fn tracker(&self) -> &CameraTracker {
        &self.tracker
    }

    pub fn session(&self) -> &SessionInfo {
        &self.session
    }

    /// One poll: fetch participants and feed each observation to the tracker.
    ///
    /// The tracker is only touched after the fetch resolves, so dropping this
    /// future mid-poll leaves it unchanged.
    pub async fn tick(&mut self, now: DateTime<Local>) -> Result<TickSummary> {
        let participants = self.source.fetch(&self.meeting_id).await;

        let mut camera_changes = 0;
        for participant in &participants {
            self.tracker.initialize(
                &participant.participant_id,
                &participant.display_name,
                now,
            );
            let event = self.tracker.update_status(
                &participant.participant_id,
                &participant.display_name,
                participant.camera_state,
                now,
            )?;
            if event.is_some() {
                camera_changes += 1;
            }
        }

        info!(
            "[{}] Found {} participants, {} camera changes",
            now.format("%H:%M:%S"),
            participants.len(),
            camera_changes
        );

        Ok(TickSummary {
            participants: participants.len(),
            camera_changes,
        })
    }

    pub fn interim_due(&self, now: DateTime<Local>) -> bool {
        if !self.options.save_interim {
            return false;
        }
        (now - self.last_save)
            .to_std()
            .map(|elapsed| elapsed >= self.options.interim_interval)
            .unwrap_or(false)
    }

    /// Export the in-progress session rows and persist the store. Failures are
    /// logged; tracking continues either way.
    pub fn save_interim(&mut self, now: DateTime<Local>) {
        info!("[{}] Saving interim results...", now.format("%H:%M:%S"));
        let stamp = now.format(STAMP_FORMAT).to_string();

        let rows = ReportBuilder::new(self.tracker.records()).session_results(now);
        let path = self
            .options
            .output_dir
            .join(file_names::interim(&self.meeting_id, &stamp));
        match write_csv(&path, &rows) {
            Ok(path) => println!("Session results saved to {}", path.display()),
            Err(e) => error!("Failed to write interim results: {:#}", e),
        }

        if let Err(e) = self.store.save(&self.meeting_id, &self.tracker) {
            error!("Error saving cumulative data: {:#}", e);
        }
        self.last_save = now;
    }

    /// Finalize the session, write every export, persist, and print both tables.
    pub fn finish(&mut self, now: DateTime<Local>) -> SessionSummary {
        self.tracker
            .finalize(&self.session, now, self.options.close_open_intervals);

        println!("{}", "-".repeat(50));
        println!("Tracking completed!");

        let builder = ReportBuilder::new(self.tracker.records());
        let session_rows = builder.session_results(now);
        let cumulative_rows = builder.cumulative_results();
        let stamp = now.format(STAMP_FORMAT).to_string();
        let dir = &self.options.output_dir;
        let mut exported = Vec::new();

        let session_path = dir.join(file_names::session(&self.meeting_id, &stamp));
        match write_csv(&session_path, &session_rows) {
            Ok(path) => {
                println!("Session results saved to {}", path.display());
                exported.push(path);
            }
            Err(e) => error!("Failed to write session results: {:#}", e),
        }

        let cumulative_path = dir.join(file_names::cumulative(&self.meeting_id, &stamp));
        match write_csv(&cumulative_path, &cumulative_rows) {
            Ok(path) => {
                println!("Cumulative results saved to {}", path.display());
                exported.push(path);
            }
            Err(e) => error!("Failed to write cumulative results: {:#}", e),
        }

        if self.options.detailed_history {
            let history_path = dir.join(file_names::detailed_history(&self.meeting_id, &stamp));
            match write_csv(&history_path, &builder.history_rows()) {
                Ok(path) => {
                    println!("Detailed history saved to {}", path.display());
                    exported.push(path);
                }
                Err(e) => error!("Failed to write detailed history: {:#}", e),
            }
        }

        let store_path = match self.store.save(&self.meeting_id, &self.tracker) {
            Ok(path) => Some(path),
            Err(e) => {
                error!("Error saving cumulative data: {:#}", e);
                None
            }
        };

        print!(
            "{}",
            render_session_table(&self.meeting_id, &self.session.label(), &session_rows)
        );
        print!(
            "{}",
            render_cumulative_table(&self.meeting_id, &cumulative_rows)
        );

        SessionSummary {
            session_rows,
            cumulative_rows,
            exported,
            store_path,
        }
    }

    fn print_banner(&self) {
        println!("Starting camera tracking for meeting {}", self.meeting_id);
        println!("Session: {}, {}", self.session.day, self.session.date);
        println!(
            "Tracking will run for {:.1} minutes",
            self.options.duration.as_secs_f64() / 60.0
        );
        println!(
            "Will check camera status every {} seconds",
            self.options.poll_interval.as_secs()
        );
        if self.options.save_interim {
            println!(
                "Interim results will be saved every {} minutes",
                self.options.interim_interval.as_secs() / 60
            );
        }
        println!("{}", "-".repeat(50));
    }

    /// Poll until the configured duration elapses or Ctrl-C arrives, then finish.
    pub async fn run(&mut self) -> Result<SessionSummary> {
        let shutdown = interrupt_signal();
        self.run_until(shutdown).await
    }

    /// Poll until the configured duration elapses or `shutdown` resolves, then
    /// finish. A poll in flight when `shutdown` fires is abandoned.
    pub async fn run_until<F>(&mut self, shutdown: F) -> Result<SessionSummary>
    where
        F: Future<Output = ()>,
    {
        self.print_banner();

        let deadline = tokio::time::Instant::now().checked_add(self.options.duration);
        if deadline.is_none() {
            warn!("Tracking duration is out of range, polling until interrupted");
        }
        tokio::pin!(shutdown);

        while deadline.map_or(true, |deadline| tokio::time::Instant::now() < deadline) {
            let now = Local::now();

            tokio::select! {
                result = self.tick(now) => {
                    result?;
                }
                _ = &mut shutdown => {
                    warn!("Interrupted, finalizing session early");
                    break;
                }
            }

            if self.interim_due(now) {
                self.save_interim(now);
            }

            tokio::select! {
                _ = tokio::time::sleep(self.options.poll_interval) => {}
                _ = &mut shutdown => {
                    warn!("Interrupted, finalizing session early");
                    break;
                }
            }
        }

        Ok(self.finish(Local::now()))
    }
}

type ShutdownSignal = Pin<Box<dyn Future<Output = ()> + Send>>;

/// Resolves on the first Ctrl-C. The handler is installed before this returns,
/// so an interrupt during the first poll is not lost.
#[cfg(unix)]
fn interrupt_signal() -> ShutdownSignal {
    use tokio::signal::unix::{signal, SignalKind};

    match signal(SignalKind::interrupt()) {
        Ok(mut interrupt) => Box::pin(async move {
            interrupt.recv().await;
        }),
        Err(e) => {
            warn!("Unable to listen for Ctrl-C: {}", e);
            Box::pin(std::future::pending())
        }
    }
}

#[cfg(not(unix))]
fn interrupt_signal() -> ShutdownSignal {
    let (tx, rx) = tokio::sync::oneshot::channel();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                let _ = tx.send(());
            }
            Err(e) => warn!("Unable to listen for Ctrl-C: {}", e),
        }
    });
    Box::pin(async move {
        if rx.await.is_err() {
            std::future::pending::<()>().await;
        }
    })
}
