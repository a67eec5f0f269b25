//! View state - the record the monitors write and the renderer reads
//!
//! Each field is owned by exactly one monitor:
//! - `audio_volume` by the audio level analyzer
//! - `video_resolution` by the resolution sampler
//! - `face_box` by the face detection loop

use std::fmt;

use serde::{Deserialize, Serialize};

/// Highest value of the discrete volume metric
pub const MAX_AUDIO_VOLUME: u8 = 10;

/// Decoded video dimensions in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VideoResolution {
    pub width: u32,
    pub height: u32,
}

impl VideoResolution {
    pub fn new(width: u32, height: u32) -> Self {
        VideoResolution { width, height }
    }
}

impl fmt::Display for VideoResolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Face overlay rectangle in on-screen coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FaceBox {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl FaceBox {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        FaceBox { x, y, w, h }
    }

    /// Scale both axes independently
    pub fn scale(&self, sx: f32, sy: f32) -> FaceBox {
        FaceBox {
            x: self.x * sx,
            y: self.y * sy,
            w: self.w * sx,
            h: self.h * sy,
        }
    }

    /// Zero-extent boxes are not drawn
    pub fn is_empty(&self) -> bool {
        self.w <= 0.0 || self.h <= 0.0
    }
}

/// Live view state of one peer
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PeerViewState {
    /// Discrete volume in [0, 10]
    pub audio_volume: u8,
    /// Last sampled decoded resolution, `None` while no video is bound
    pub video_resolution: Option<VideoResolution>,
    /// Face overlay, `None` when hidden
    pub face_box: Option<FaceBox>,
}

impl PeerViewState {
    /// Empty state (monitor construction and teardown)
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::empty()
    }
}
