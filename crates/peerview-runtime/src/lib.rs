//! PeerView Runtime - one conference participant's view
//!
//! Wires the pieces together:
//! 1. Props arrive (mount / update) and go through the track binder
//! 2. Monitors publish audio volume, decoded resolution and face overlay
//! 3. User actions are routed to the peer controls
//! 4. `snapshot()` projects props and live state into a render model

pub mod logging;
pub mod view;

pub use logging::*;
pub use view::*;
