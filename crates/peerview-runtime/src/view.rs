//! Peer view - props in, render snapshot out

use std::fmt;
use std::sync::Arc;

use tokio::sync::watch;

use peerview_core::{FaceBox, MediaTrackPair, PeerId, PeerViewConfig, PeerViewResult, PeerViewState};
use peerview_monitor::{AudioLevelEngine, BindOutcome, FaceDetector, PlaybackSink, TrackBinder};
use peerview_quality::{
    score_section, LayerDirection, PeerControls, ScoreSection, ScoreSide, ScoreValue, SpatialLayer,
};

/// Maximum display name length accepted from the local editor
pub const MAX_DISPLAY_NAME_CHARS: usize = 20;

/// Device the peer joined from
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DeviceInfo {
    /// Platform flag (e.g. "chrome", "firefox", "broadcaster")
    pub flag: String,
    pub name: String,
    pub version: Option<String>,
}

/// Peer identity as shown in the view
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PeerInfo {
    pub id: PeerId,
    pub display_name: String,
    pub device: DeviceInfo,
}

/// Everything the owner of a peer view passes in
#[derive(Clone, Debug, Default)]
pub struct PeerViewProps {
    /// The local participant
    pub is_me: bool,
    pub peer: PeerInfo,
    pub audio_producer_id: Option<String>,
    pub video_producer_id: Option<String>,
    pub audio_consumer_id: Option<String>,
    pub video_consumer_id: Option<String>,
    pub tracks: MediaTrackPair,
    pub video_visible: bool,
    pub video_multi_layer: bool,
    pub video_current_spatial_layer: Option<u8>,
    pub video_preferred_spatial_layer: Option<u8>,
    pub audio_codec: Option<String>,
    pub video_codec: Option<String>,
    pub audio_score: Option<ScoreValue>,
    pub video_score: Option<ScoreValue>,
}

/// Audio or video block of the info panel
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MediaInfo {
    /// Producer and/or consumer ids, in that order
    pub ids: Vec<String>,
    pub codec: Option<String>,
    /// `WxH`, video only
    pub resolution: Option<String>,
    pub current_spatial_layer: Option<u8>,
    pub preferred_spatial_layer: Option<u8>,
    /// Layer controls are offered
    pub layer_controls: bool,
    /// Key frame request is offered
    pub key_frame_control: bool,
    pub scores: Vec<ScoreSection>,
}

/// Render model of one peer view
#[derive(Clone, Debug, PartialEq)]
pub struct PeerViewSnapshot {
    pub is_me: bool,
    pub display_name: String,
    /// `<device name> <version>`
    pub device_label: String,
    pub device_flag: String,
    pub show_info: bool,
    pub audio: Option<MediaInfo>,
    pub video: Option<MediaInfo>,
    pub video_hidden: bool,
    /// Volume bar style class, `level0` .. `level10`
    pub volume_class: String,
    pub face_box: Option<FaceBox>,
    pub spinner: bool,
}

impl fmt::Display for PeerViewSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.display_name, self.device_label)?;
        if self.is_me {
            f.write_str(" (me)")?;
        }
        write!(f, " | {}", self.volume_class)?;
        if let Some(res) = self.video.as_ref().and_then(|v| v.resolution.as_ref()) {
            write!(f, " | {}", res)?;
        }
        if let Some(b) = &self.face_box {
            write!(f, " | face {:.0},{:.0} {:.0}x{:.0}", b.x, b.y, b.w, b.h)?;
        }
        if self.spinner {
            f.write_str(" | loading")?;
        }
        Ok(())
    }
}

/// One participant's view: binder, controls and the latest props
pub struct PeerView {
    config: PeerViewConfig,
    binder: TrackBinder,
    controls: PeerControls,
    props: PeerViewProps,
    show_info: bool,
}

impl PeerView {
    pub fn new(
        config: PeerViewConfig,
        sink: Arc<dyn PlaybackSink>,
        engine: Arc<dyn AudioLevelEngine>,
        detector: Arc<dyn FaceDetector>,
        controls: PeerControls,
    ) -> PeerViewResult<Self> {
        config.validate()?;
        let binder = TrackBinder::new(config.monitor.clone(), sink, engine, detector);
        Ok(PeerView {
            show_info: config.show_info,
            config,
            binder,
            controls,
            props: PeerViewProps::default(),
        })
    }

    /// First props; binds the initial tracks
    pub fn mount(&mut self, props: PeerViewProps) -> PeerViewResult<BindOutcome> {
        tracing::debug!(peer = %props.peer.id, is_me = props.is_me, "peer view mounted");
        self.update(props)
    }

    /// New props; tracks are rebound only if their identity changed
    pub fn update(&mut self, props: PeerViewProps) -> PeerViewResult<BindOutcome> {
        let tracks = props.tracks.clone();
        self.props = props;
        self.binder.bind(tracks)
    }

    /// Teardown; stops every monitor
    pub fn unmount(&mut self) {
        tracing::debug!(peer = %self.props.peer.id, "peer view unmounted");
        self.binder.shutdown();
    }

    /// Flip the info panel; returns the new visibility
    pub fn toggle_info(&mut self) -> bool {
        self.show_info = !self.show_info;
        self.show_info
    }

    fn layer_controls_allowed(&self) -> bool {
        !self.props.is_me && self.props.video_multi_layer
    }

    fn change_layer(&self, direction: LayerDirection) -> Option<SpatialLayer> {
        if !self.layer_controls_allowed() {
            return None;
        }
        Some(
            self.controls
                .change_preferred_layer(self.props.video_preferred_spatial_layer, direction),
        )
    }

    /// `[ down ]` action; `None` when the control is not offered
    pub fn layer_down(&self) -> Option<SpatialLayer> {
        self.change_layer(LayerDirection::Down)
    }

    /// `[ up ]` action; `None` when the control is not offered
    pub fn layer_up(&self) -> Option<SpatialLayer> {
        self.change_layer(LayerDirection::Up)
    }

    /// `[ request keyframe ]` action; returns whether a handler received it
    pub fn request_key_frame(&self) -> bool {
        if !self.key_frame_allowed() {
            return false;
        }
        self.controls.request_key_frame()
    }

    fn key_frame_allowed(&self) -> bool {
        !self.props.is_me && self.props.video_codec.is_some()
    }

    /// Rename the local peer; ignored for remote peers
    pub fn change_display_name(&self, name: &str) -> bool {
        if !self.props.is_me {
            return false;
        }
        let name: String = name.chars().take(MAX_DISPLAY_NAME_CHARS).collect();
        self.controls.change_display_name(&name)
    }

    pub fn state(&self) -> PeerViewState {
        self.binder.state()
    }

    pub fn state_changes(&self) -> watch::Receiver<PeerViewState> {
        self.binder.subscribe_state()
    }

    pub fn binder(&self) -> &TrackBinder {
        &self.binder
    }

    pub fn props(&self) -> &PeerViewProps {
        &self.props
    }

    /// Project props and live state into a render model
    pub fn snapshot(&self) -> PeerViewSnapshot {
        let props = &self.props;
        let state = self.binder.state();

        let device_label = match &props.peer.device.version {
            Some(version) => format!("{} {}", props.peer.device.name, version),
            None => props.peer.device.name.clone(),
        };

        let spinner = props.video_visible
            && props
                .video_score
                .as_ref()
                .and_then(ScoreValue::lowest)
                .is_some_and(|score| score < self.config.spinner_score_threshold);

        PeerViewSnapshot {
            is_me: props.is_me,
            display_name: props.peer.display_name.clone(),
            device_label,
            device_flag: props.peer.device.flag.clone(),
            show_info: self.show_info,
            audio: self.audio_info(),
            video: self.video_info(&state),
            video_hidden: !props.video_visible,
            volume_class: format!("level{}", state.audio_volume),
            face_box: state.face_box,
            spinner,
        }
    }

    fn audio_info(&self) -> Option<MediaInfo> {
        let props = &self.props;
        let ids = media_ids(&props.audio_producer_id, &props.audio_consumer_id);
        if ids.is_empty() {
            return None;
        }
        Some(MediaInfo {
            ids,
            codec: props.audio_codec.clone(),
            scores: score_sections(
                &props.audio_producer_id,
                &props.audio_consumer_id,
                &props.audio_score,
            ),
            ..MediaInfo::default()
        })
    }

    fn video_info(&self, state: &PeerViewState) -> Option<MediaInfo> {
        let props = &self.props;
        let ids = media_ids(&props.video_producer_id, &props.video_consumer_id);
        if ids.is_empty() {
            return None;
        }

        let layer_controls = self.layer_controls_allowed();
        let resolution = if props.video_visible {
            state.video_resolution.map(|r| r.to_string())
        } else {
            None
        };

        Some(MediaInfo {
            ids,
            codec: props.video_codec.clone(),
            resolution,
            current_spatial_layer: props.video_current_spatial_layer.filter(|_| layer_controls),
            preferred_spatial_layer: props.video_preferred_spatial_layer.filter(|_| layer_controls),
            layer_controls,
            key_frame_control: self.key_frame_allowed(),
            scores: score_sections(
                &props.video_producer_id,
                &props.video_consumer_id,
                &props.video_score,
            ),
        })
    }
}

fn media_ids(producer: &Option<String>, consumer: &Option<String>) -> Vec<String> {
    producer.iter().chain(consumer.iter()).cloned().collect()
}

fn score_sections(
    producer: &Option<String>,
    consumer: &Option<String>,
    score: &Option<ScoreValue>,
) -> Vec<ScoreSection> {
    let Some(score) = score else {
        return Vec::new();
    };
    let mut sections = Vec::new();
    if producer.is_some() {
        sections.push(score_section(ScoreSide::Producer, score));
    }
    if consumer.is_some() {
        sections.push(score_section(ScoreSide::Consumer, score));
    }
    sections
}
