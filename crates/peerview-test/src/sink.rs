//! Controllable playback sink

use async_trait::async_trait;
use parking_lot::Mutex;

use peerview_core::{MediaStream, PeerViewError, PeerViewResult, TrackId, VideoResolution};
use peerview_monitor::{PlaybackSink, ReadyState};

#[derive(Debug, Default)]
struct SinkState {
    stream: Option<MediaStream>,
    ready_state: ReadyState,
    decoded: VideoResolution,
    display: (u32, u32),
    fail_play: Option<String>,
    play_calls: u32,
    attachments: Vec<Option<Vec<TrackId>>>,
}

/// Playback sink whose readiness, sizes and play outcome are set by the test
#[derive(Debug, Default)]
pub struct FakeSink {
    state: Mutex<SinkState>,
}

impl FakeSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sink that already decoded a `width` x `height` frame
    pub fn decoding(width: u32, height: u32) -> Self {
        let sink = Self::new();
        sink.set_ready_state(ReadyState::HaveEnoughData);
        sink.set_decoded_size(width, height);
        sink.set_display_size(width, height);
        sink
    }

    pub fn set_ready_state(&self, ready_state: ReadyState) {
        self.state.lock().ready_state = ready_state;
    }

    pub fn set_decoded_size(&self, width: u32, height: u32) {
        self.state.lock().decoded = VideoResolution::new(width, height);
    }

    pub fn set_display_size(&self, width: u32, height: u32) {
        self.state.lock().display = (width, height);
    }

    /// Make every following `play()` reject with `reason`
    pub fn fail_play(&self, reason: impl Into<String>) {
        self.state.lock().fail_play = Some(reason.into());
    }

    pub fn play_calls(&self) -> u32 {
        self.state.lock().play_calls
    }

    pub fn is_attached(&self) -> bool {
        self.state.lock().stream.is_some()
    }

    /// Track ids of every `attach` call, `None` for a detach
    pub fn attachments(&self) -> Vec<Option<Vec<TrackId>>> {
        self.state.lock().attachments.clone()
    }
}

#[async_trait]
impl PlaybackSink for FakeSink {
    fn attach(&self, stream: Option<MediaStream>) {
        let mut state = self.state.lock();
        let ids = stream
            .as_ref()
            .map(|s| s.tracks().iter().map(|t| t.id).collect());
        state.attachments.push(ids);
        state.stream = stream;
    }

    fn has_video(&self) -> bool {
        self.state
            .lock()
            .stream
            .as_ref()
            .is_some_and(|s| s.video_tracks().next().is_some())
    }

    async fn play(&self) -> PeerViewResult<()> {
        let mut state = self.state.lock();
        state.play_calls += 1;
        match &state.fail_play {
            Some(reason) => Err(PeerViewError::PlaybackFailed(reason.clone())),
            None => Ok(()),
        }
    }

    fn ready_state(&self) -> ReadyState {
        self.state.lock().ready_state
    }

    fn decoded_size(&self) -> VideoResolution {
        self.state.lock().decoded
    }

    fn display_size(&self) -> (u32, u32) {
        self.state.lock().display
    }
}
