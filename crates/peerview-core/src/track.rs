//! Media tracks, track pairs and playback streams
//!
//! Tracks are owned by the external track provider and shared as
//! `Arc<MediaTrack>`. A peer view only keeps non-owning clones of those
//! handles, and binding decisions compare the handles by identity.

use std::sync::Arc;

use crate::TrackId;

/// Media kind of a track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackKind {
    Audio,
    Video,
}

/// A live media track supplied by the track provider
#[derive(Debug, Clone, PartialEq)]
pub struct MediaTrack {
    pub id: TrackId,
    pub kind: TrackKind,
    /// Human readable label (device or source name)
    pub label: String,
}

impl MediaTrack {
    pub fn new(id: TrackId, kind: TrackKind, label: impl Into<String>) -> Self {
        MediaTrack {
            id,
            kind,
            label: label.into(),
        }
    }

    /// Create a shared audio track handle
    pub fn audio(id: u64, label: impl Into<String>) -> Arc<Self> {
        Arc::new(Self::new(TrackId::new(id), TrackKind::Audio, label))
    }

    /// Create a shared video track handle
    pub fn video(id: u64, label: impl Into<String>) -> Arc<Self> {
        Arc::new(Self::new(TrackId::new(id), TrackKind::Video, label))
    }
}

/// The audio/video tracks currently offered for one peer
///
/// Equality is identity based: two pairs bind the same media only if both
/// slots hold the very same track handles (or are both empty).
#[derive(Debug, Clone, Default)]
pub struct MediaTrackPair {
    pub audio: Option<Arc<MediaTrack>>,
    pub video: Option<Arc<MediaTrack>>,
}

impl MediaTrackPair {
    pub fn new(audio: Option<Arc<MediaTrack>>, video: Option<Arc<MediaTrack>>) -> Self {
        MediaTrackPair { audio, video }
    }

    /// Pair with no tracks at all
    pub fn empty() -> Self {
        Self::default()
    }

    /// Whether neither slot holds a track
    pub fn is_empty(&self) -> bool {
        self.audio.is_none() && self.video.is_none()
    }

    /// Identity comparison of both slots
    pub fn same_binding(&self, other: &MediaTrackPair) -> bool {
        same_track(&self.audio, &other.audio) && same_track(&self.video, &other.video)
    }
}

fn same_track(a: &Option<Arc<MediaTrack>>, b: &Option<Arc<MediaTrack>>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => Arc::ptr_eq(a, b),
        (None, None) => true,
        _ => false,
    }
}

/// A playable stream handed to the playback sink and the audio level engine
#[derive(Debug, Clone, Default)]
pub struct MediaStream {
    tracks: Vec<Arc<MediaTrack>>,
}

impl MediaStream {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a stream from whatever tracks the pair holds (audio first)
    pub fn from_pair(pair: &MediaTrackPair) -> Self {
        let mut stream = MediaStream::new();
        if let Some(audio) = &pair.audio {
            stream.add_track(Arc::clone(audio));
        }
        if let Some(video) = &pair.video {
            stream.add_track(Arc::clone(video));
        }
        stream
    }

    pub fn add_track(&mut self, track: Arc<MediaTrack>) {
        self.tracks.push(track);
    }

    pub fn tracks(&self) -> &[Arc<MediaTrack>] {
        &self.tracks
    }

    pub fn audio_tracks(&self) -> impl Iterator<Item = &Arc<MediaTrack>> {
        self.tracks.iter().filter(|t| t.kind == TrackKind::Audio)
    }

    pub fn video_tracks(&self) -> impl Iterator<Item = &Arc<MediaTrack>> {
        self.tracks.iter().filter(|t| t.kind == TrackKind::Video)
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}
