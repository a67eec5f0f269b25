//! PeerView Time - scheduling primitives for the monitors
//!
//! - `RefreshClock`: display-refresh ticks and poll periods
//! - `ScheduledTask`: a spawned task that is cancelled on `cancel()` or drop

pub mod clock;
pub mod task;

pub use clock::*;
pub use task::*;
