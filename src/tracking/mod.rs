//! Camera tracking core.
//!
//! Holds the per-participant camera state machine, the session identity used
//! at finalization, and the per-meeting store that carries cumulative totals
//! between runs.

pub mod error;
pub mod session;
pub mod store;
pub mod tracker;

pub use error::TrackerError;
pub use session::{round2, SessionInfo, SessionRecord};
pub use store::SessionStore;
pub use tracker::{seconds_between, CameraEvent, CameraState, CameraTracker, ParticipantRecord};
