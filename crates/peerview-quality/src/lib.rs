//! PeerView Quality - quality-control helpers invoked from user actions
//!
//! - Spatial layer selection: cyclic up/down over low/medium/high
//! - Score formatting: producer and consumer quality scores as display lines
//! - Peer controls: optional handlers for layer change, key frame request and
//!   display name change

pub mod layer;
pub mod score;
pub mod controls;

pub use layer::*;
pub use score::*;
pub use controls::*;
