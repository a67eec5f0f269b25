//! Monitor lifecycle events

use std::fmt;

use tokio::sync::broadcast;

/// The three monitors a binding can run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MonitorKind {
    AudioLevel,
    Resolution,
    FaceDetection,
}

impl fmt::Display for MonitorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MonitorKind::AudioLevel => "audio-level",
            MonitorKind::Resolution => "resolution",
            MonitorKind::FaceDetection => "face-detection",
        };
        f.write_str(name)
    }
}

/// Start/stop notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorEvent {
    Started(MonitorKind),
    Stopped(MonitorKind),
}

impl MonitorEvent {
    pub fn kind(&self) -> MonitorKind {
        match self {
            MonitorEvent::Started(kind) | MonitorEvent::Stopped(kind) => *kind,
        }
    }

    pub fn is_start(&self) -> bool {
        matches!(self, MonitorEvent::Started(_))
    }
}

/// Broadcast channel of lifecycle events, shared by the monitors of one view
#[derive(Clone, Debug)]
pub struct LifecycleEvents {
    tx: broadcast::Sender<MonitorEvent>,
}

impl LifecycleEvents {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        LifecycleEvents { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<MonitorEvent> {
        self.tx.subscribe()
    }

    pub fn emit(&self, event: MonitorEvent) {
        tracing::debug!(monitor = %event.kind(), started = event.is_start(), "monitor lifecycle");
        // No subscribers is fine
        let _ = self.tx.send(event);
    }
}

impl Default for LifecycleEvents {
    fn default() -> Self {
        Self::new(64)
    }
}
