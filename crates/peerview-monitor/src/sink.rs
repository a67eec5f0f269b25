//! Playback sink boundary

use async_trait::async_trait;

use peerview_core::{MediaStream, PeerViewResult, VideoResolution};

/// Decode readiness of the playback sink, ordered from least to most data
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum ReadyState {
    /// Nothing decoded yet
    #[default]
    HaveNothing = 0,
    /// Duration and track metadata known
    HaveMetadata = 1,
    /// The current frame is decoded
    HaveCurrentData = 2,
    /// At least one frame ahead is decoded
    HaveFutureData = 3,
    /// Enough data to play through
    HaveEnoughData = 4,
}

impl ReadyState {
    /// Whether a frame can be handed to the face detector
    pub fn can_inspect_frame(self) -> bool {
        self >= ReadyState::HaveCurrentData
    }
}

/// The element that plays the bound tracks
///
/// A sink accepts a stream of zero, one or two tracks. Implementations must be
/// cheap to query; the monitors call the getters from their timers.
#[async_trait]
pub trait PlaybackSink: Send + Sync {
    /// Replace the playing stream; `None` detaches the sink entirely
    fn attach(&self, stream: Option<MediaStream>);

    /// Whether the attached stream carries a video track
    fn has_video(&self) -> bool;

    /// Start playback of the attached stream
    async fn play(&self) -> PeerViewResult<()>;

    fn ready_state(&self) -> ReadyState;

    /// Size of the decoded video frames (0x0 until the first frame)
    fn decoded_size(&self) -> VideoResolution;

    /// Current on-screen size of the sink
    fn display_size(&self) -> (u32, u32);
}
