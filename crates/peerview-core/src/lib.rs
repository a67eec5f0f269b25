//! PeerView Core - Fundamental types and primitives
//!
//! This crate defines the core types shared by the peer view monitors:
//! - Identifiers (PeerId, TrackId)
//! - Media tracks, track pairs and playback streams
//! - The view state record written by the monitors
//! - Configuration and errors

pub mod id;
pub mod track;
pub mod state;
pub mod config;
pub mod error;

pub use id::*;
pub use track::*;
pub use state::*;
pub use config::*;
pub use error::*;
