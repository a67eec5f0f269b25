//! Scripted audio level engine

use parking_lot::Mutex;
use tokio::sync::mpsc;

use peerview_core::{MediaStream, PeerViewError, PeerViewResult, TrackId};
use peerview_monitor::{AudioLevelEngine, LevelReceiver, LevelSender};

#[derive(Default)]
struct EngineState {
    sender: Option<LevelSender>,
    opened: Vec<TrackId>,
    refuse: Option<String>,
}

/// Level engine whose readings are pushed by the test
#[derive(Default)]
pub struct ScriptedLevelEngine {
    state: Mutex<EngineState>,
}

impl ScriptedLevelEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a decibel reading to the latest subscription
    ///
    /// Returns false when no subscription is alive.
    pub fn push(&self, db: f64) -> bool {
        let state = self.state.lock();
        match &state.sender {
            Some(tx) => tx.try_send(db).is_ok(),
            None => false,
        }
    }

    /// Whether the latest subscription still has a listener
    pub fn is_subscribed(&self) -> bool {
        self.state
            .lock()
            .sender
            .as_ref()
            .is_some_and(|tx| !tx.is_closed())
    }

    /// Audio track ids of every `open` call
    pub fn opened(&self) -> Vec<TrackId> {
        self.state.lock().opened.clone()
    }

    /// Refuse every following `open`
    pub fn refuse(&self, reason: impl Into<String>) {
        self.state.lock().refuse = Some(reason.into());
    }
}

impl AudioLevelEngine for ScriptedLevelEngine {
    fn open(&self, stream: &MediaStream) -> PeerViewResult<LevelReceiver> {
        let mut state = self.state.lock();
        if let Some(reason) = &state.refuse {
            return Err(PeerViewError::LevelEngine(reason.clone()));
        }
        if let Some(track) = stream.audio_tracks().next() {
            state.opened.push(track.id);
        }
        let (tx, rx) = mpsc::channel(64);
        state.sender = Some(tx);
        Ok(rx)
    }
}
