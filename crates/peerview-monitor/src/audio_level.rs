//! Audio level analysis
//!
//! Decibel readings (roughly -100..0 dB) are mapped to a discrete volume in
//! 0..=10. The exact dB → linear formula is `10^(dB/20)`; we use a divisor of
//! 85 instead, which exaggerates quiet speech enough to be visible on a
//! ten-step bar.

use tokio::sync::mpsc;

use peerview_core::{MediaStream, PeerViewError, PeerViewResult, MAX_AUDIO_VOLUME};
use peerview_time::ScheduledTask;

use crate::{FieldWriter, LifecycleEvents, MonitorEvent, MonitorKind, ViewStateHub};

/// Stream of decibel readings produced by an audio level engine
pub type LevelReceiver = mpsc::Receiver<f64>;

/// Producer side of a level stream
pub type LevelSender = mpsc::Sender<f64>;

/// Decibel divisor of the volume curve
pub const VOLUME_DB_DIVISOR: f64 = 85.0;

/// Source of periodic audio level readings
pub trait AudioLevelEngine: Send + Sync {
    /// Start emitting readings for the audio track of `stream`
    ///
    /// Readings stop when the returned receiver is dropped.
    fn open(&self, stream: &MediaStream) -> PeerViewResult<LevelReceiver>;
}

/// Convert a decibel reading into the discrete 0..=10 volume
///
/// A computed value of 1 is collapsed to 0 so background noise does not keep
/// toggling the bar between its two lowest steps.
pub fn volume_from_db(db: f64) -> u8 {
    if db.is_nan() {
        return 0;
    }
    let linear = 10f64.powf(db / VOLUME_DB_DIVISOR);
    let volume = (linear * 10.0).round().clamp(0.0, MAX_AUDIO_VOLUME as f64) as u8;
    if volume == 1 {
        0
    } else {
        volume
    }
}

/// A running audio level subscription
pub struct AudioLevelAnalyzer {
    task: ScheduledTask,
    writer: FieldWriter,
    events: LifecycleEvents,
}

impl AudioLevelAnalyzer {
    /// Subscribe to level readings for the audio track of `stream`
    ///
    /// Fails with `MissingAudioTrack` when the stream carries no audio track;
    /// that is a caller bug, the binder never does it.
    pub fn start(
        stream: &MediaStream,
        engine: &dyn AudioLevelEngine,
        hub: &ViewStateHub,
        events: &LifecycleEvents,
    ) -> PeerViewResult<Self> {
        let track = stream
            .audio_tracks()
            .next()
            .ok_or(PeerViewError::MissingAudioTrack)?;
        let track_id = track.id;

        let mut levels = engine.open(stream)?;
        let writer = hub.writer();
        let task_writer = writer.clone();

        let task = ScheduledTask::spawn("audio-level", async move {
            while let Some(db) = levels.recv().await {
                let volume = volume_from_db(db);
                let changed = task_writer.update(|state| {
                    if state.audio_volume == volume {
                        return false;
                    }
                    state.audio_volume = volume;
                    true
                });
                if changed {
                    tracing::trace!(track = %track_id, db, volume, "audio volume changed");
                }
            }
        });

        events.emit(MonitorEvent::Started(MonitorKind::AudioLevel));

        Ok(AudioLevelAnalyzer {
            task,
            writer,
            events: events.clone(),
        })
    }

    pub fn is_running(&self) -> bool {
        self.writer.is_live()
    }

    /// Cancel the subscription and zero the volume
    pub fn stop(&mut self) {
        self.task.cancel();
        if self.writer.retire(|state| state.audio_volume = 0) {
            self.events.emit(MonitorEvent::Stopped(MonitorKind::AudioLevel));
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use parking_lot::Mutex;
    use proptest::prelude::*;

    use peerview_core::{MediaTrack, MediaTrackPair};

    use super::*;

    /// Hands out one channel and keeps the sender for the test
    #[derive(Default)]
    struct ChannelEngine {
        sender: Mutex<Option<LevelSender>>,
    }

    impl AudioLevelEngine for ChannelEngine {
        fn open(&self, _stream: &MediaStream) -> PeerViewResult<LevelReceiver> {
            let (tx, rx) = mpsc::channel(16);
            *self.sender.lock() = Some(tx);
            Ok(rx)
        }
    }

    fn audio_stream() -> MediaStream {
        MediaStream::from_pair(&MediaTrackPair::new(Some(MediaTrack::audio(1, "mic")), None))
    }

    #[test]
    fn test_volume_reference_points() {
        assert_eq!(volume_from_db(0.0), 10);
        assert_eq!(volume_from_db(-100.0), 0);
        // 10^(-85/85) * 10 = 1 → collapsed
        assert_eq!(volume_from_db(-85.0), 0);
        // 10^(-42.5/85) * 10 ≈ 3.16
        assert_eq!(volume_from_db(-42.5), 3);
        assert_eq!(volume_from_db(f64::NAN), 0);
        assert_eq!(volume_from_db(12.0), 10);
    }

    proptest! {
        #[test]
        fn prop_volume_matches_curve(db in -100.0f64..=0.0) {
            let expected = (10f64.powf(db / 85.0) * 10.0).round() as u8;
            let expected = if expected == 1 { 0 } else { expected };
            let volume = volume_from_db(db);
            prop_assert_eq!(volume, expected);
            prop_assert!(volume <= 10);
            prop_assert_ne!(volume, 1);
        }
    }

    #[test]
    fn test_start_requires_audio_track() {
        let hub = ViewStateHub::new();
        let events = LifecycleEvents::default();
        let video_only =
            MediaStream::from_pair(&MediaTrackPair::new(None, Some(MediaTrack::video(2, "cam"))));

        let result = AudioLevelAnalyzer::start(&video_only, &ChannelEngine::default(), &hub, &events);
        assert_eq!(result.err(), Some(PeerViewError::MissingAudioTrack));
    }

    #[tokio::test(start_paused = true)]
    async fn test_readings_update_volume_until_stopped() {
        let hub = ViewStateHub::new();
        let events = LifecycleEvents::default();
        let engine = Arc::new(ChannelEngine::default());
        let mut rx = hub.subscribe();

        let mut analyzer =
            AudioLevelAnalyzer::start(&audio_stream(), engine.as_ref(), &hub, &events).unwrap();
        let sender = engine.sender.lock().clone().unwrap();

        sender.send(0.0).await.unwrap();
        rx.changed().await.unwrap();
        assert_eq!(hub.snapshot().audio_volume, 10);

        // Same volume again: no notification
        sender.send(-0.1).await.unwrap();
        tokio::time::sleep(Duration::from_millis(1)).await;
        assert!(!rx.has_changed().unwrap());

        analyzer.stop();
        assert!(!analyzer.is_running());
        assert_eq!(hub.snapshot().audio_volume, 0);

        // The subscription is gone
        tokio::time::sleep(Duration::from_millis(1)).await;
        assert!(sender.send(0.0).await.is_err());
        assert_eq!(hub.snapshot().audio_volume, 0);

        // Idempotent
        analyzer.stop();
        assert_eq!(hub.snapshot().audio_volume, 0);
    }
}
