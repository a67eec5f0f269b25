//! Spatial layer selection
//!
//! The preferred layer lives in the external quality-control layer; this
//! module only computes the next value from the current one.

use std::fmt;

/// Video quality tier of a simulcast/SVC stream
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum SpatialLayer {
    Low = 0,
    Medium = 1,
    High = 2,
}

impl SpatialLayer {
    pub const ALL: [SpatialLayer; 3] = [SpatialLayer::Low, SpatialLayer::Medium, SpatialLayer::High];

    /// Parse from the numeric layer index
    pub fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(SpatialLayer::Low),
            1 => Some(SpatialLayer::Medium),
            2 => Some(SpatialLayer::High),
            _ => None,
        }
    }

    #[inline]
    pub fn index(self) -> u8 {
        self as u8
    }

    /// One step down, wrapping from low to high
    pub fn down(self) -> Self {
        match self {
            SpatialLayer::Low => SpatialLayer::High,
            SpatialLayer::Medium => SpatialLayer::Low,
            SpatialLayer::High => SpatialLayer::Medium,
        }
    }

    /// One step up, wrapping from high to low
    pub fn up(self) -> Self {
        match self {
            SpatialLayer::Low => SpatialLayer::Medium,
            SpatialLayer::Medium => SpatialLayer::High,
            SpatialLayer::High => SpatialLayer::Low,
        }
    }
}

impl fmt::Display for SpatialLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.index())
    }
}

/// Direction of a layer change request
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LayerDirection {
    Up,
    Down,
}

/// Next preferred layer for a user action
///
/// An unknown current layer (missing or out of range) goes to medium when
/// stepping down and to high when stepping up.
pub fn next_spatial_layer(current: Option<u8>, direction: LayerDirection) -> SpatialLayer {
    match (current.and_then(SpatialLayer::from_index), direction) {
        (Some(layer), LayerDirection::Down) => layer.down(),
        (Some(layer), LayerDirection::Up) => layer.up(),
        (None, LayerDirection::Down) => SpatialLayer::Medium,
        (None, LayerDirection::Up) => SpatialLayer::High,
    }
}
