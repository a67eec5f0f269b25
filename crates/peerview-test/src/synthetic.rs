//! Synthetic collaborators that produce plausible media signals on their own

use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::mpsc;

use peerview_core::{DetectorOptions, FaceBox, MediaStream, PeerViewError, PeerViewResult};
use peerview_monitor::{AudioLevelEngine, FaceDetection, FaceDetector, LevelReceiver, PlaybackSink};

/// Level engine emitting a slow speech-like envelope
pub struct SyntheticLevelEngine {
    period: Duration,
    seed: u64,
}

impl SyntheticLevelEngine {
    pub fn new(period: Duration, seed: u64) -> Self {
        SyntheticLevelEngine { period, seed }
    }
}

impl AudioLevelEngine for SyntheticLevelEngine {
    fn open(&self, stream: &MediaStream) -> PeerViewResult<LevelReceiver> {
        if stream.audio_tracks().next().is_none() {
            return Err(PeerViewError::MissingAudioTrack);
        }

        let (tx, rx) = mpsc::channel(16);
        let period = self.period;
        let mut rng = StdRng::seed_from_u64(self.seed);

        tokio::spawn(async move {
            let mut phase = 0.0f64;
            loop {
                tokio::time::sleep(period).await;
                phase += 0.15;
                // Envelope between roughly -90 dB (silence) and -5 dB (loud)
                let envelope = (phase.sin() + 1.0) / 2.0;
                let noise = rng.gen_range(-3.0..3.0);
                let db = (-90.0 + envelope * 85.0 + noise).min(0.0);
                if tx.send(db).await.is_err() {
                    break; // Subscription dropped
                }
            }
        });

        Ok(rx)
    }
}

/// Detector reporting a jittering face near the frame centre
pub struct SyntheticFaceDetector {
    rng: Mutex<StdRng>,
    /// Probability that a frame contains no face
    miss_rate: f64,
}

impl SyntheticFaceDetector {
    pub fn new(seed: u64, miss_rate: f64) -> Self {
        SyntheticFaceDetector {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
            miss_rate: miss_rate.clamp(0.0, 1.0),
        }
    }
}

#[async_trait]
impl FaceDetector for SyntheticFaceDetector {
    async fn detect_single_face(
        &self,
        sink: &dyn PlaybackSink,
        options: &DetectorOptions,
    ) -> PeerViewResult<Option<FaceDetection>> {
        let frame = sink.decoded_size();
        let (score, jitter_x, jitter_y) = {
            let mut rng = self.rng.lock();
            if rng.gen_bool(self.miss_rate) {
                return Ok(None);
            }
            (
                rng.gen_range(0.3f32..1.0),
                rng.gen_range(-8.0f32..8.0),
                rng.gen_range(-8.0f32..8.0),
            )
        };

        if score < options.score_threshold {
            return Ok(None);
        }

        let w = frame.width as f32 / 4.0;
        let h = frame.height as f32 / 3.0;
        Ok(Some(FaceDetection {
            score,
            bounds: FaceBox::new(
                (frame.width as f32 - w) / 2.0 + jitter_x,
                (frame.height as f32 - h) / 2.0 + jitter_y,
                w,
                h,
            ),
            image_size: frame,
        }))
    }
}
