//! Zoom REST API client for meeting participants.
//!
//! Every failure degrades to "no participants this tick"; callers never see
//! why a fetch came back empty.

pub mod error;
pub mod participants;

pub use error::FetchError;
pub use participants::{
    parse_participants, ParticipantObservation, ParticipantSource, ZoomParticipantSource,
};
