//! Error types for the peer view

use thiserror::Error;

/// Core peer view errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PeerViewError {
    // Precondition errors
    #[error("Audio level analysis requires a stream with an audio track")]
    MissingAudioTrack,

    // Media errors
    #[error("Playback failed: {0}")]
    PlaybackFailed(String),

    #[error("Face detection failed: {0}")]
    DetectionFailed(String),

    #[error("Audio level engine error: {0}")]
    LevelEngine(String),

    // Configuration errors
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for peer view operations
pub type PeerViewResult<T> = Result<T, PeerViewError>;
