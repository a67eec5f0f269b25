//! Per-peer user actions
//!
//! Every handler is optional; invoking an action without a registered handler
//! is a silent no-op.

use std::fmt;

use crate::{next_spatial_layer, LayerDirection, SpatialLayer};

pub type LayerHandler = Box<dyn Fn(SpatialLayer) + Send + Sync>;
pub type KeyFrameHandler = Box<dyn Fn() + Send + Sync>;
pub type DisplayNameHandler = Box<dyn Fn(&str) + Send + Sync>;

/// Callbacks into the external quality-control and room layers
#[derive(Default)]
pub struct PeerControls {
    on_change_preferred_layer: Option<LayerHandler>,
    on_request_key_frame: Option<KeyFrameHandler>,
    on_change_display_name: Option<DisplayNameHandler>,
}

impl PeerControls {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_change_preferred_layer(
        mut self,
        handler: impl Fn(SpatialLayer) + Send + Sync + 'static,
    ) -> Self {
        self.on_change_preferred_layer = Some(Box::new(handler));
        self
    }

    pub fn on_request_key_frame(mut self, handler: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_request_key_frame = Some(Box::new(handler));
        self
    }

    pub fn on_change_display_name(mut self, handler: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.on_change_display_name = Some(Box::new(handler));
        self
    }

    /// Step the preferred layer and report it; returns the computed layer
    pub fn change_preferred_layer(
        &self,
        current: Option<u8>,
        direction: LayerDirection,
    ) -> SpatialLayer {
        let next = next_spatial_layer(current, direction);
        tracing::debug!(?current, ?direction, next = %next, "preferred spatial layer change");
        if let Some(handler) = &self.on_change_preferred_layer {
            handler(next);
        }
        next
    }

    /// Ask for a key frame; returns whether a handler received it
    pub fn request_key_frame(&self) -> bool {
        match &self.on_request_key_frame {
            Some(handler) => {
                tracing::debug!("key frame requested");
                handler();
                true
            }
            None => false,
        }
    }

    /// Report a new display name; returns whether a handler received it
    pub fn change_display_name(&self, name: &str) -> bool {
        match &self.on_change_display_name {
            Some(handler) => {
                handler(name);
                true
            }
            None => false,
        }
    }
}

impl fmt::Debug for PeerControls {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PeerControls")
            .field("on_change_preferred_layer", &self.on_change_preferred_layer.is_some())
            .field("on_request_key_frame", &self.on_request_key_frame.is_some())
            .field("on_change_display_name", &self.on_change_display_name.is_some())
            .finish()
    }
}
