//! Face detection loop
//!
//! Cooperative, refresh-driven loop:
//!
//! ```text
//! Idle → WaitingReady ─(frame ready)→ Detecting ─┬─(face)→ Drawing ──┐
//!            ↑   └─(not ready: next tick)─┘      └─(none)→ Clearing ─┤
//!            └──────── Scheduled (next tick + throttle) ←────────────┘
//! any → Terminal on stop
//! ```
//!
//! At most one detection request is outstanding: the next one is only issued
//! after the previous one resolved and the throttle elapsed.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use peerview_core::{DetectorOptions, FaceBox, PeerViewResult, VideoResolution};
use peerview_time::{RefreshClock, ScheduledTask};

use crate::{FieldWriter, LifecycleEvents, MonitorEvent, MonitorKind, PlaybackSink, ViewStateHub};

/// A single detected face
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceDetection {
    /// Detector confidence in [0, 1]
    pub score: f32,
    /// Box in the coordinates of `image_size`
    pub bounds: FaceBox,
    /// Size of the frame the detector looked at
    pub image_size: VideoResolution,
}

impl FaceDetection {
    /// Rescale the detection to a `width` x `height` surface
    pub fn for_size(&self, width: u32, height: u32) -> FaceDetection {
        if self.image_size.width == 0 || self.image_size.height == 0 {
            return *self;
        }
        let sx = width as f32 / self.image_size.width as f32;
        let sy = height as f32 / self.image_size.height as f32;
        FaceDetection {
            score: self.score,
            bounds: self.bounds.scale(sx, sy),
            image_size: VideoResolution::new(width, height),
        }
    }
}

/// Single-face detector
#[async_trait]
pub trait FaceDetector: Send + Sync {
    /// Detect at most one face in the sink's current frame
    async fn detect_single_face(
        &self,
        sink: &dyn PlaybackSink,
        options: &DetectorOptions,
    ) -> PeerViewResult<Option<FaceDetection>>;
}

/// Phase of the detection loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FaceLoopPhase {
    #[default]
    Idle,
    WaitingReady,
    Detecting,
    Drawing,
    Clearing,
    Scheduled,
    Terminal,
}

impl fmt::Display for FaceLoopPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Face detection loop timing
#[derive(Clone, Debug)]
pub struct FaceLoopConfig {
    /// Display refresh period
    pub refresh_interval: Duration,
    /// Extra delay after each completed cycle
    pub throttle: Duration,
    pub detector: DetectorOptions,
}

impl Default for FaceLoopConfig {
    fn default() -> Self {
        FaceLoopConfig {
            refresh_interval: Duration::from_millis(16),
            throttle: Duration::from_millis(100),
            detector: DetectorOptions::default(),
        }
    }
}

/// Owner of the detection loop task
pub struct FaceDetectionLoop {
    config: FaceLoopConfig,
    detector: Arc<dyn FaceDetector>,
    hub: ViewStateHub,
    events: LifecycleEvents,
    phase: Arc<Mutex<FaceLoopPhase>>,
    running: Option<(ScheduledTask, FieldWriter)>,
    detections: Arc<Mutex<u64>>,
}

impl FaceDetectionLoop {
    pub fn new(
        config: FaceLoopConfig,
        detector: Arc<dyn FaceDetector>,
        hub: ViewStateHub,
        events: LifecycleEvents,
    ) -> Self {
        FaceDetectionLoop {
            config,
            detector,
            hub,
            events,
            phase: Arc::new(Mutex::new(FaceLoopPhase::Idle)),
            running: None,
            detections: Arc::new(Mutex::new(0)),
        }
    }

    pub fn phase(&self) -> FaceLoopPhase {
        *self.phase.lock()
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    /// Detection requests issued since construction
    pub fn detections(&self) -> u64 {
        *self.detections.lock()
    }

    /// Start the loop against `sink`
    pub fn start(&mut self, sink: Arc<dyn PlaybackSink>) {
        if self.is_running() {
            self.stop();
        }

        let writer = self.hub.writer();
        let cycle = DetectionCycle {
            sink,
            detector: Arc::clone(&self.detector),
            options: self.config.detector.clone(),
            throttle: self.config.throttle,
            clock: RefreshClock::new(self.config.refresh_interval),
            writer: writer.clone(),
            phase: Arc::clone(&self.phase),
            detections: Arc::clone(&self.detections),
        };

        let task = ScheduledTask::spawn("face-detection", cycle.run());
        self.running = Some((task, writer));
        self.events.emit(MonitorEvent::Started(MonitorKind::FaceDetection));
    }

    /// Cancel the pending tick and hide the overlay
    ///
    /// Always collapses the overlay, even when the loop was not running.
    pub fn stop(&mut self) {
        let hide = |state: &mut peerview_core::PeerViewState| state.face_box = None;
        match self.running.take() {
            Some((mut task, writer)) => {
                task.cancel();
                writer.retire(hide);
                self.events.emit(MonitorEvent::Stopped(MonitorKind::FaceDetection));
            }
            None => self.hub.force(hide),
        }
        *self.phase.lock() = FaceLoopPhase::Terminal;
    }
}

/// State moved into the loop task
struct DetectionCycle {
    sink: Arc<dyn PlaybackSink>,
    detector: Arc<dyn FaceDetector>,
    options: DetectorOptions,
    throttle: Duration,
    clock: RefreshClock,
    writer: FieldWriter,
    phase: Arc<Mutex<FaceLoopPhase>>,
    detections: Arc<Mutex<u64>>,
}

impl DetectionCycle {
    fn enter(&self, next: FaceLoopPhase) {
        self.writer.when_live(|| *self.phase.lock() = next);
    }

    fn frame_ready(&self) -> bool {
        self.sink.has_video() && self.sink.ready_state().can_inspect_frame()
    }

    async fn run(mut self) {
        loop {
            self.enter(FaceLoopPhase::WaitingReady);
            // The detector never settles on a frame that is not decoded yet
            while !self.frame_ready() {
                self.clock.tick().await;
            }

            self.enter(FaceLoopPhase::Detecting);
            *self.detections.lock() += 1;
            match self
                .detector
                .detect_single_face(self.sink.as_ref(), &self.options)
                .await
            {
                Ok(Some(detection)) => {
                    self.enter(FaceLoopPhase::Drawing);
                    let (width, height) = self.sink.display_size();
                    let resized = detection.for_size(width, height);
                    self.writer.update(|state| {
                        state.face_box = Some(resized.bounds);
                        true
                    });
                    tracing::trace!(score = detection.score, bounds = ?resized.bounds, "face drawn");
                }
                Ok(None) => {
                    self.enter(FaceLoopPhase::Clearing);
                    self.writer.update(|state| state.face_box.take().is_some());
                }
                Err(e) => {
                    // Overlay keeps its last value; the next cycle retries
                    tracing::warn!(error = %e, "face detection failed");
                }
            }

            self.enter(FaceLoopPhase::Scheduled);
            self.clock.tick_then_sleep(self.throttle).await;
        }
    }
}
