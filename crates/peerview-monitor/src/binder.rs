//! Track binding - decides when the bound pair changed and restarts monitors

use std::sync::Arc;

use tokio::sync::{broadcast, watch};

use peerview_core::{MediaStream, MediaTrackPair, MonitorConfig, PeerViewResult, PeerViewState};
use peerview_time::ScheduledTask;

use crate::{
    AudioLevelAnalyzer, AudioLevelEngine, FaceDetectionLoop, FaceDetector, FaceLoopConfig,
    FaceLoopPhase, LifecycleEvents, MonitorEvent, PlaybackSink, ResolutionSampler, ViewStateHub,
};

/// Result of a `bind` call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindOutcome {
    /// Same track handles as before, nothing touched
    Unchanged,
    /// Monitors restarted for a pair with at least one track
    Rebound,
    /// Both slots empty, sink detached
    Detached,
}

/// Everything that belongs to the currently bound pair
///
/// Only `TrackBinder::bind` and `TrackBinder::shutdown` mutate it.
struct Binding {
    pair: MediaTrackPair,
    analyzer: Option<AudioLevelAnalyzer>,
    sampler: ResolutionSampler,
    face: FaceDetectionLoop,
    playback: Option<ScheduledTask>,
}

/// Binds one peer's audio/video tracks to a playback sink and its monitors
///
/// INVARIANT: every monitor of the previous pair is stopped before any
/// monitor of the new pair starts.
pub struct TrackBinder {
    config: MonitorConfig,
    sink: Arc<dyn PlaybackSink>,
    engine: Arc<dyn AudioLevelEngine>,
    hub: ViewStateHub,
    events: LifecycleEvents,
    binding: Binding,
}

impl TrackBinder {
    pub fn new(
        config: MonitorConfig,
        sink: Arc<dyn PlaybackSink>,
        engine: Arc<dyn AudioLevelEngine>,
        detector: Arc<dyn FaceDetector>,
    ) -> Self {
        let hub = ViewStateHub::new();
        let events = LifecycleEvents::default();

        let sampler = ResolutionSampler::new(
            config.resolution_poll_interval(),
            hub.clone(),
            events.clone(),
        );
        let face = FaceDetectionLoop::new(
            FaceLoopConfig {
                refresh_interval: config.refresh_interval(),
                throttle: config.face_detection_throttle(),
                detector: config.detector.clone(),
            },
            detector,
            hub.clone(),
            events.clone(),
        );

        TrackBinder {
            config,
            sink,
            engine,
            hub,
            events,
            binding: Binding {
                pair: MediaTrackPair::empty(),
                analyzer: None,
                sampler,
                face,
                playback: None,
            },
        }
    }

    /// Bind a new pair of tracks
    ///
    /// A pair holding the same track handles as the current one is a no-op.
    /// Errors from the audio level engine are returned after the video
    /// monitors have been started.
    pub fn bind(&mut self, pair: MediaTrackPair) -> PeerViewResult<BindOutcome> {
        if self.binding.pair.same_binding(&pair) {
            return Ok(BindOutcome::Unchanged);
        }

        self.stop_monitors();
        self.binding.pair = pair.clone();

        if pair.is_empty() {
            self.binding.playback = None;
            self.sink.attach(None);
            tracing::debug!("tracks unbound, sink detached");
            return Ok(BindOutcome::Detached);
        }

        let stream = MediaStream::from_pair(&pair);
        self.sink.attach(Some(stream.clone()));
        self.binding.playback = Some(self.spawn_playback());

        tracing::debug!(
            audio = ?pair.audio.as_ref().map(|t| t.id),
            video = ?pair.video.as_ref().map(|t| t.id),
            "tracks bound"
        );

        let mut audio_error = None;
        if pair.audio.is_some() {
            match AudioLevelAnalyzer::start(&stream, self.engine.as_ref(), &self.hub, &self.events) {
                Ok(analyzer) => self.binding.analyzer = Some(analyzer),
                Err(e) => {
                    tracing::warn!(error = %e, "audio level analyzer not started");
                    audio_error = Some(e);
                }
            }
        }

        if pair.video.is_some() {
            self.binding.sampler.start(Arc::clone(&self.sink));
            if self.config.face_detection {
                self.binding.face.start(Arc::clone(&self.sink));
            }
        }

        match audio_error {
            Some(e) => Err(e),
            None => Ok(BindOutcome::Rebound),
        }
    }

    /// Stop every monitor regardless of the binding state (teardown)
    pub fn shutdown(&mut self) {
        if let Some(mut analyzer) = self.binding.analyzer.take() {
            analyzer.stop();
        }
        self.binding.sampler.stop();
        self.binding.face.stop();
        if let Some(mut playback) = self.binding.playback.take() {
            playback.cancel();
        }
        tracing::debug!("peer monitors shut down");
    }

    fn stop_monitors(&mut self) {
        if let Some(mut analyzer) = self.binding.analyzer.take() {
            analyzer.stop();
        }
        self.binding.sampler.stop();
        if self.config.face_detection {
            self.binding.face.stop();
        }
    }

    /// Start playback in the background; failure is logged and not retried
    fn spawn_playback(&self) -> ScheduledTask {
        let sink = Arc::clone(&self.sink);
        ScheduledTask::spawn("playback", async move {
            if let Err(e) = sink.play().await {
                tracing::warn!(error = %e, "sink playback failed");
            }
        })
    }

    /// Currently bound pair
    pub fn pair(&self) -> &MediaTrackPair {
        &self.binding.pair
    }

    pub fn state(&self) -> PeerViewState {
        self.hub.snapshot()
    }

    pub fn subscribe_state(&self) -> watch::Receiver<PeerViewState> {
        self.hub.subscribe()
    }

    pub fn subscribe_lifecycle(&self) -> broadcast::Receiver<MonitorEvent> {
        self.events.subscribe()
    }

    pub fn is_audio_monitored(&self) -> bool {
        self.binding.analyzer.as_ref().is_some_and(|a| a.is_running())
    }

    pub fn is_resolution_sampled(&self) -> bool {
        self.binding.sampler.is_running()
    }

    pub fn is_face_detecting(&self) -> bool {
        self.binding.face.is_running()
    }

    pub fn face_phase(&self) -> FaceLoopPhase {
        self.binding.face.phase()
    }

    /// Detection requests issued so far
    pub fn face_detections(&self) -> u64 {
        self.binding.face.detections()
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }
}
