//! Face detection loop: readiness gating, drawing, clearing and throttling

use std::sync::Arc;
use std::time::Duration;

use peerview_core::{
    DetectorOptions, FaceBox, MediaStream, MediaTrack, MediaTrackPair, PeerViewError,
    VideoResolution,
};
use peerview_monitor::{
    FaceDetectionLoop, FaceLoopConfig, FaceLoopPhase, LifecycleEvents, PlaybackSink, ReadyState,
    ViewStateHub,
};
use peerview_test::{FakeSink, ScriptedFaceDetector};

fn video_sink() -> Arc<FakeSink> {
    let sink = Arc::new(FakeSink::new());
    let pair = MediaTrackPair::new(None, Some(MediaTrack::video(7, "cam")));
    sink.attach(Some(MediaStream::from_pair(&pair)));
    sink.set_decoded_size(320, 240);
    sink.set_display_size(640, 480);
    sink
}

fn face_loop(detector: Arc<ScriptedFaceDetector>, hub: &ViewStateHub) -> FaceDetectionLoop {
    FaceDetectionLoop::new(
        FaceLoopConfig::default(),
        detector,
        hub.clone(),
        LifecycleEvents::default(),
    )
}

#[tokio::test(start_paused = true)]
async fn test_waits_for_frame_readiness() {
    let hub = ViewStateHub::new();
    let detector = Arc::new(ScriptedFaceDetector::new());
    let sink = video_sink();
    sink.set_ready_state(ReadyState::HaveMetadata);

    let mut detection = face_loop(detector.clone(), &hub);
    assert_eq!(detection.phase(), FaceLoopPhase::Idle);
    detection.start(sink.clone());

    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(detector.calls(), 0);
    assert_eq!(detection.phase(), FaceLoopPhase::WaitingReady);

    sink.set_ready_state(ReadyState::HaveCurrentData);
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(detector.calls(), 1);
    assert_eq!(
        detector.last_options(),
        Some(DetectorOptions {
            input_size: 160,
            score_threshold: 0.5
        })
    );
}

#[tokio::test(start_paused = true)]
async fn test_detached_sink_is_never_inspected() {
    let hub = ViewStateHub::new();
    let detector = Arc::new(ScriptedFaceDetector::new());
    let sink = video_sink();
    sink.set_ready_state(ReadyState::HaveEnoughData);
    sink.attach(None);

    let mut detection = face_loop(detector.clone(), &hub);
    detection.start(sink);

    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(detector.calls(), 0);
    assert_eq!(detection.phase(), FaceLoopPhase::WaitingReady);
}

#[tokio::test(start_paused = true)]
async fn test_draws_rescaled_box_then_clears() {
    let hub = ViewStateHub::new();
    let detector = Arc::new(ScriptedFaceDetector::new());
    let sink = video_sink();
    sink.set_ready_state(ReadyState::HaveEnoughData);

    detector.push_face(FaceBox::new(40.0, 30.0, 80.0, 60.0), VideoResolution::new(320, 240));
    detector.push(Ok(None));

    let mut detection = face_loop(detector.clone(), &hub);
    detection.start(sink);

    tokio::time::sleep(Duration::from_millis(1)).await;
    assert_eq!(detector.calls(), 1);
    assert_eq!(
        hub.snapshot().face_box,
        Some(FaceBox::new(80.0, 60.0, 160.0, 120.0))
    );
    assert_eq!(detection.phase(), FaceLoopPhase::Scheduled);

    // Next cycle: refresh tick at 16 ms plus the 100 ms throttle
    tokio::time::sleep(Duration::from_millis(110)).await;
    assert_eq!(detector.calls(), 1);
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(detector.calls(), 2);
    assert_eq!(hub.snapshot().face_box, None);
}

#[tokio::test(start_paused = true)]
async fn test_throttle_bounds_detection_rate() {
    let hub = ViewStateHub::new();
    let detector = Arc::new(ScriptedFaceDetector::with_latency(Duration::from_millis(5)));
    let sink = video_sink();
    sink.set_ready_state(ReadyState::HaveEnoughData);

    let mut detection = face_loop(detector.clone(), &hub);
    detection.start(sink);

    tokio::time::sleep(Duration::from_millis(1000)).await;
    let calls = detector.calls();
    assert!((7..=10).contains(&calls), "calls = {}", calls);
    assert_eq!(detector.max_in_flight(), 1);
    assert_eq!(detection.detections(), calls as u64);
}

#[tokio::test(start_paused = true)]
async fn test_detection_failure_keeps_looping() {
    let hub = ViewStateHub::new();
    let detector = Arc::new(ScriptedFaceDetector::new());
    let sink = video_sink();
    sink.set_ready_state(ReadyState::HaveEnoughData);

    detector.push_face(FaceBox::new(0.0, 0.0, 32.0, 24.0), VideoResolution::new(320, 240));
    detector.push(Err(PeerViewError::DetectionFailed("model not loaded".into())));

    let mut detection = face_loop(detector.clone(), &hub);
    detection.start(sink);

    tokio::time::sleep(Duration::from_millis(150)).await;
    assert_eq!(detector.calls(), 2);
    // The failed cycle leaves the last overlay in place
    assert_eq!(hub.snapshot().face_box, Some(FaceBox::new(0.0, 0.0, 64.0, 48.0)));

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(detector.calls() >= 3);
    assert_eq!(hub.snapshot().face_box, None);
}

#[tokio::test(start_paused = true)]
async fn test_stop_is_terminal() {
    let hub = ViewStateHub::new();
    let detector = Arc::new(ScriptedFaceDetector::with_latency(Duration::from_millis(50)));
    let sink = video_sink();
    sink.set_ready_state(ReadyState::HaveEnoughData);
    detector.push_face(FaceBox::new(1.0, 1.0, 10.0, 10.0), VideoResolution::new(320, 240));
    detector.push_face(FaceBox::new(1.0, 1.0, 10.0, 10.0), VideoResolution::new(320, 240));

    let mut detection = face_loop(detector.clone(), &hub);
    detection.start(sink);

    tokio::time::sleep(Duration::from_millis(60)).await;
    assert!(hub.snapshot().face_box.is_some());

    // Second request is in flight at 164..214 ms; stop in the middle of it
    tokio::time::sleep(Duration::from_millis(120)).await;
    assert_eq!(detection.phase(), FaceLoopPhase::Detecting);
    detection.stop();

    assert_eq!(detection.phase(), FaceLoopPhase::Terminal);
    assert_eq!(hub.snapshot().face_box, None);
    assert!(!detection.is_running());

    let calls = detector.calls();
    tokio::time::sleep(Duration::from_millis(1000)).await;
    assert_eq!(detector.calls(), calls);
    assert_eq!(hub.snapshot().face_box, None);
    assert_eq!(detection.phase(), FaceLoopPhase::Terminal);

    // Stopping again still hides the overlay
    detection.stop();
    assert_eq!(hub.snapshot().face_box, None);
}
