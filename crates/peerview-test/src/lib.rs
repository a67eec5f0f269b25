//! PeerView Test Harness - scripted collaborators for monitor testing
//!
//! This crate provides:
//! - A controllable playback sink
//! - A scripted audio level engine
//! - A scripted face detector
//! - A lifecycle event recorder
//! - Synthetic collaborators for the simulation driver

pub mod sink;
pub mod level;
pub mod detector;
pub mod recorder;
pub mod synthetic;

pub use sink::*;
pub use level::*;
pub use detector::*;
pub use recorder::*;
pub use synthetic::*;
