//! Scripted face detector

use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use peerview_core::{DetectorOptions, FaceBox, PeerViewResult, VideoResolution};
use peerview_monitor::{FaceDetection, FaceDetector, PlaybackSink};

#[derive(Default)]
struct DetectorState {
    script: VecDeque<PeerViewResult<Option<FaceDetection>>>,
    calls: u32,
    in_flight: u32,
    max_in_flight: u32,
    last_options: Option<DetectorOptions>,
}

/// Face detector replaying scripted results, then reporting no face
#[derive(Default)]
pub struct ScriptedFaceDetector {
    state: Mutex<DetectorState>,
    latency: Duration,
}

impl ScriptedFaceDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every detection takes `latency` of (virtual) time
    pub fn with_latency(latency: Duration) -> Self {
        ScriptedFaceDetector {
            latency,
            ..Self::default()
        }
    }

    pub fn push(&self, result: PeerViewResult<Option<FaceDetection>>) {
        self.state.lock().script.push_back(result);
    }

    /// Queue a face found in a `frame` sized image
    pub fn push_face(&self, bounds: FaceBox, frame: VideoResolution) {
        self.push(Ok(Some(FaceDetection {
            score: 0.9,
            bounds,
            image_size: frame,
        })));
    }

    pub fn calls(&self) -> u32 {
        self.state.lock().calls
    }

    /// Highest number of concurrently outstanding requests seen
    pub fn max_in_flight(&self) -> u32 {
        self.state.lock().max_in_flight
    }

    pub fn last_options(&self) -> Option<DetectorOptions> {
        self.state.lock().last_options.clone()
    }
}

#[async_trait]
impl FaceDetector for ScriptedFaceDetector {
    async fn detect_single_face(
        &self,
        _sink: &dyn PlaybackSink,
        options: &DetectorOptions,
    ) -> PeerViewResult<Option<FaceDetection>> {
        {
            let mut state = self.state.lock();
            state.calls += 1;
            state.in_flight += 1;
            state.max_in_flight = state.max_in_flight.max(state.in_flight);
            state.last_options = Some(options.clone());
        }

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let mut state = self.state.lock();
        state.in_flight -= 1;
        state.script.pop_front().unwrap_or(Ok(None))
    }
}
