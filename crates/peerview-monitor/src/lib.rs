//! PeerView Monitor - live media monitoring for a single peer
//!
//! A peer view binds one audio track and one video track at a time and runs
//! up to three monitors against them:
//!
//! - `AudioLevelAnalyzer`: decibel readings → discrete volume 0..=10
//! - `ResolutionSampler`: polls the decoded video size once per second
//! - `FaceDetectionLoop`: refresh-driven single-face detection overlay
//!
//! `TrackBinder` decides when the bound pair changed and restarts the
//! monitors, always stopping every monitor of the old pair first.
//! External collaborators (playback sink, level engine, face detector) are
//! traits so hosts can plug in their media stack.

pub mod lifecycle;
pub mod writer;
pub mod sink;
pub mod audio_level;
pub mod resolution;
pub mod face;
pub mod binder;

pub use lifecycle::*;
pub use writer::*;
pub use sink::*;
pub use audio_level::*;
pub use resolution::*;
pub use face::*;
pub use binder::*;
