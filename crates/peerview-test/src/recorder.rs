//! Lifecycle event recorder

use tokio::sync::broadcast::{self, error::TryRecvError};

use peerview_monitor::{MonitorEvent, MonitorKind};

/// Collects monitor lifecycle events delivered so far
pub struct LifecycleRecorder {
    rx: broadcast::Receiver<MonitorEvent>,
    seen: Vec<MonitorEvent>,
}

impl LifecycleRecorder {
    pub fn new(rx: broadcast::Receiver<MonitorEvent>) -> Self {
        LifecycleRecorder {
            rx,
            seen: Vec::new(),
        }
    }

    /// Drain pending events and return everything recorded
    pub fn events(&mut self) -> &[MonitorEvent] {
        loop {
            match self.rx.try_recv() {
                Ok(event) => self.seen.push(event),
                Err(TryRecvError::Lagged(_)) => continue,
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
            }
        }
        &self.seen
    }

    /// Drain and forget everything recorded so far
    pub fn clear(&mut self) {
        self.events();
        self.seen.clear();
    }

    pub fn started(&mut self) -> Vec<MonitorKind> {
        self.events()
            .iter()
            .filter(|e| e.is_start())
            .map(|e| e.kind())
            .collect()
    }

    pub fn stopped(&mut self) -> Vec<MonitorKind> {
        self.events()
            .iter()
            .filter(|e| !e.is_start())
            .map(|e| e.kind())
            .collect()
    }
}
