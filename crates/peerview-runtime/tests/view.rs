//! Peer view composition: props, user actions and snapshots

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use peerview_core::{
    FaceBox, MediaTrack, MediaTrackPair, PeerId, PeerViewConfig, PeerViewState, VideoResolution,
};
use peerview_monitor::BindOutcome;
use peerview_quality::{PeerControls, ScoreRecord, ScoreValue, Ssrc, SpatialLayer};
use peerview_runtime::{DeviceInfo, PeerInfo, PeerView, PeerViewProps};
use peerview_test::{FakeSink, ScriptedFaceDetector, ScriptedLevelEngine};

#[derive(Default)]
struct Recorded {
    layers: Vec<SpatialLayer>,
    key_frames: u32,
    names: Vec<String>,
}

struct Fixture {
    view: PeerView,
    engine: Arc<ScriptedLevelEngine>,
    detector: Arc<ScriptedFaceDetector>,
    recorded: Arc<Mutex<Recorded>>,
}

fn fixture(config: PeerViewConfig) -> Fixture {
    let sink = Arc::new(FakeSink::decoding(1280, 720));
    let engine = Arc::new(ScriptedLevelEngine::new());
    let detector = Arc::new(ScriptedFaceDetector::new());
    let recorded = Arc::new(Mutex::new(Recorded::default()));

    let controls = PeerControls::new()
        .on_change_preferred_layer({
            let recorded = Arc::clone(&recorded);
            move |layer| recorded.lock().layers.push(layer)
        })
        .on_request_key_frame({
            let recorded = Arc::clone(&recorded);
            move || recorded.lock().key_frames += 1
        })
        .on_change_display_name({
            let recorded = Arc::clone(&recorded);
            move |name| recorded.lock().names.push(name.to_string())
        });

    let view = PeerView::new(config, sink, engine.clone(), detector.clone(), controls).unwrap();
    Fixture {
        view,
        engine,
        detector,
        recorded,
    }
}

fn remote_props(tracks: MediaTrackPair) -> PeerViewProps {
    PeerViewProps {
        is_me: false,
        peer: PeerInfo {
            id: PeerId::new("p1"),
            display_name: "Alice".into(),
            device: DeviceInfo {
                flag: "firefox".into(),
                name: "Firefox".into(),
                version: Some("128".into()),
            },
        },
        audio_consumer_id: Some("ac1".into()),
        video_consumer_id: Some("vc1".into()),
        tracks,
        video_visible: true,
        video_multi_layer: true,
        video_current_spatial_layer: Some(1),
        video_preferred_spatial_layer: Some(1),
        audio_codec: Some("opus".into()),
        video_codec: Some("vp8".into()),
        video_score: Some(ScoreValue::One(ScoreRecord::Consumer {
            producer: 10,
            consumer: 9,
        })),
        ..PeerViewProps::default()
    }
}

fn av_tracks() -> MediaTrackPair {
    MediaTrackPair::new(
        Some(MediaTrack::audio(1, "mic")),
        Some(MediaTrack::video(2, "cam")),
    )
}

#[tokio::test(start_paused = true)]
async fn test_mount_and_snapshot() {
    let mut f = fixture(PeerViewConfig::default());
    assert_eq!(f.view.mount(remote_props(av_tracks())).unwrap(), BindOutcome::Rebound);

    tokio::time::sleep(Duration::from_millis(1)).await;
    assert!(f.engine.push(-42.5));
    tokio::time::sleep(Duration::from_millis(1000)).await;

    let snapshot = f.view.snapshot();
    assert_eq!(snapshot.display_name, "Alice");
    assert_eq!(snapshot.device_label, "Firefox 128");
    assert_eq!(snapshot.volume_class, "level3");
    assert!(!snapshot.show_info);
    assert!(!snapshot.spinner);

    let audio = snapshot.audio.unwrap();
    assert_eq!(audio.ids, vec!["ac1".to_string()]);
    assert_eq!(audio.codec.as_deref(), Some("opus"));

    let video = snapshot.video.unwrap();
    assert_eq!(video.resolution.as_deref(), Some("1280x720"));
    assert!(video.layer_controls);
    assert!(video.key_frame_control);
    assert_eq!(video.preferred_spatial_layer, Some(1));
    assert_eq!(video.scores.len(), 1);
    assert_eq!(video.scores[0].heading, "score:");
    assert_eq!(video.scores[0].lines[0].to_string(), "producer:10, score:9");
}

#[tokio::test(start_paused = true)]
async fn test_update_with_same_tracks_keeps_monitors() {
    let mut f = fixture(PeerViewConfig::default());
    let tracks = av_tracks();
    f.view.mount(remote_props(tracks.clone())).unwrap();

    let mut props = remote_props(tracks);
    props.video_preferred_spatial_layer = Some(2);
    assert_eq!(f.view.update(props).unwrap(), BindOutcome::Unchanged);
    assert_eq!(f.engine.opened().len(), 1);
    assert_eq!(f.view.props().video_preferred_spatial_layer, Some(2));
}

#[tokio::test(start_paused = true)]
async fn test_layer_actions_for_remote_multi_layer_peer() {
    let mut f = fixture(PeerViewConfig::default());
    f.view.mount(remote_props(av_tracks())).unwrap();

    assert_eq!(f.view.layer_down(), Some(SpatialLayer::Low));
    assert_eq!(f.view.layer_up(), Some(SpatialLayer::High));
    assert!(f.view.request_key_frame());

    let recorded = f.recorded.lock();
    assert_eq!(recorded.layers, vec![SpatialLayer::Low, SpatialLayer::High]);
    assert_eq!(recorded.key_frames, 1);
}

#[tokio::test(start_paused = true)]
async fn test_actions_not_offered_are_ignored() {
    let mut f = fixture(PeerViewConfig::default());
    let mut props = remote_props(av_tracks());
    props.video_codec = None;
    props.video_multi_layer = false;
    f.view.mount(props).unwrap();

    assert_eq!(f.view.layer_down(), None);
    assert!(!f.view.request_key_frame());
    assert!(!f.view.change_display_name("Mallory"));

    let recorded = f.recorded.lock();
    assert!(recorded.layers.is_empty());
    assert_eq!(recorded.key_frames, 0);
    assert!(recorded.names.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_local_peer_renames_with_length_limit() {
    let mut f = fixture(PeerViewConfig::default());
    let mut props = remote_props(av_tracks());
    props.is_me = true;
    f.view.mount(props).unwrap();

    assert!(f.view.change_display_name("A very long display name indeed"));
    assert_eq!(f.view.layer_up(), None);
    assert_eq!(f.recorded.lock().names, vec!["A very long display ".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn test_spinner_follows_video_score() {
    let mut f = fixture(PeerViewConfig::default());
    let mut props = remote_props(av_tracks());
    props.video_producer_id = Some("vp1".into());
    props.video_consumer_id = None;
    props.video_score = Some(ScoreValue::Many(vec![
        ScoreRecord::Producer {
            ssrc: Ssrc::Numeric(1111),
            score: 10,
        },
        ScoreRecord::Producer {
            ssrc: Ssrc::Numeric(2222),
            score: 2,
        },
    ]));
    f.view.mount(props.clone()).unwrap();

    let snapshot = f.view.snapshot();
    assert!(snapshot.spinner);
    let video = snapshot.video.unwrap();
    assert_eq!(video.scores[0].heading, "streams:");
    assert_eq!(video.scores[0].lines.len(), 2);

    props.video_visible = false;
    f.view.update(props).unwrap();
    let snapshot = f.view.snapshot();
    assert!(!snapshot.spinner);
    assert!(snapshot.video_hidden);
    assert_eq!(snapshot.video.unwrap().resolution, None);
}

#[tokio::test(start_paused = true)]
async fn test_info_panel_starts_from_config() {
    let config = PeerViewConfig {
        show_info: true,
        ..PeerViewConfig::default()
    };
    let mut f = fixture(config);
    f.view.mount(remote_props(av_tracks())).unwrap();

    assert!(f.view.snapshot().show_info);
    assert!(!f.view.toggle_info());
    assert!(!f.view.snapshot().show_info);
    assert!(f.view.toggle_info());
}

#[tokio::test(start_paused = true)]
async fn test_face_overlay_and_unmount() {
    let config = PeerViewConfig::from_json_str(r#"{ "monitor": { "face_detection": true } }"#)
        .unwrap();
    let mut f = fixture(config);
    f.detector.push_face(
        FaceBox::new(100.0, 100.0, 200.0, 200.0),
        VideoResolution::new(1280, 720),
    );

    f.view.mount(remote_props(av_tracks())).unwrap();
    tokio::time::sleep(Duration::from_millis(1)).await;
    assert_eq!(
        f.view.snapshot().face_box,
        Some(FaceBox::new(100.0, 100.0, 200.0, 200.0))
    );

    f.view.unmount();
    assert_eq!(f.view.state(), PeerViewState::empty());
    assert_eq!(f.view.snapshot().volume_class, "level0");

    tokio::time::sleep(Duration::from_millis(2000)).await;
    assert_eq!(f.view.state(), PeerViewState::empty());
}

#[tokio::test(start_paused = true)]
async fn test_key_frame_offered_without_layers() {
    let mut f = fixture(PeerViewConfig::default());
    let mut props = remote_props(av_tracks());
    props.video_multi_layer = false;
    f.view.mount(props).unwrap();

    let video = f.view.snapshot().video.unwrap();
    assert!(!video.layer_controls);
    assert!(video.key_frame_control);
    assert_eq!(video.preferred_spatial_layer, None);

    assert_eq!(f.view.layer_up(), None);
    assert!(f.view.request_key_frame());
    assert_eq!(f.recorded.lock().key_frames, 1);
}
