//! PeerView simulation driver
//!
//! Runs one peer view against synthetic collaborators:
//! - Speech-like audio levels
//! - A decoding sink with a fixed frame size
//! - A jittering face detector
//!
//! Usage: `peerview-sim [config.json]`

use std::sync::Arc;
use std::time::Duration;

use peerview_core::{MediaTrack, MediaTrackPair, PeerId, PeerViewConfig};
use peerview_quality::{PeerControls, ScoreRecord, ScoreValue};
use peerview_runtime::{init_logging, DeviceInfo, PeerInfo, PeerView, PeerViewProps};
use peerview_test::{FakeSink, SyntheticFaceDetector, SyntheticLevelEngine};

const FRAMES: u32 = 20;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = match std::env::args().nth(1) {
        Some(path) => PeerViewConfig::from_json_str(&std::fs::read_to_string(path)?)?,
        None => PeerViewConfig {
            monitor: peerview_core::MonitorConfig::with_face_detection(),
            ..PeerViewConfig::default()
        },
    };
    init_logging(&config.logging)?;

    let sink = Arc::new(FakeSink::decoding(1280, 720));
    let engine = Arc::new(SyntheticLevelEngine::new(Duration::from_millis(50), 7));
    let detector = Arc::new(SyntheticFaceDetector::new(7, 0.2));
    let controls = PeerControls::new()
        .on_change_preferred_layer(|layer| println!("  -> preferred layer {}", layer))
        .on_request_key_frame(|| println!("  -> key frame requested"));

    let mut view = PeerView::new(config, sink, engine, detector, controls)?;

    let props = PeerViewProps {
        peer: PeerInfo {
            id: PeerId::new("sim-peer"),
            display_name: "Simulated peer".into(),
            device: DeviceInfo {
                flag: "chrome".into(),
                name: "Chrome".into(),
                version: Some("126".into()),
            },
        },
        audio_consumer_id: Some("sim-audio".into()),
        video_consumer_id: Some("sim-video".into()),
        tracks: MediaTrackPair::new(
            Some(MediaTrack::audio(1, "sim-mic")),
            Some(MediaTrack::video(2, "sim-cam")),
        ),
        video_visible: true,
        video_multi_layer: true,
        video_current_spatial_layer: Some(1),
        video_preferred_spatial_layer: Some(1),
        audio_codec: Some("opus".into()),
        video_codec: Some("vp8".into()),
        video_score: Some(ScoreValue::One(ScoreRecord::Consumer {
            producer: 10,
            consumer: 10,
        })),
        ..PeerViewProps::default()
    };

    let outcome = view.mount(props.clone())?;
    tracing::info!(?outcome, peer = %props.peer.id, "peer mounted");
    for _ in 0..FRAMES {
        tokio::time::sleep(Duration::from_millis(250)).await;
        println!("{}", view.snapshot());
    }

    view.layer_down();
    view.request_key_frame();

    // New track handles for the same peer
    let rebound = PeerViewProps {
        tracks: MediaTrackPair::new(
            Some(MediaTrack::audio(3, "sim-mic")),
            Some(MediaTrack::video(4, "sim-cam")),
        ),
        video_score: Some(ScoreValue::One(ScoreRecord::Consumer {
            producer: 10,
            consumer: 3,
        })),
        ..props
    };
    let outcome = view.update(rebound)?;
    tracing::info!(?outcome, "tracks replaced");
    for _ in 0..FRAMES / 2 {
        tokio::time::sleep(Duration::from_millis(250)).await;
        println!("{}", view.snapshot());
    }

    view.unmount();
    tracing::info!(state = ?view.state(), "peer unmounted");
    Ok(())
}
