//! Shared view state and per-monitor write access

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::watch;

use peerview_core::PeerViewState;

/// Owner of the published `PeerViewState`
///
/// Renderers subscribe to the watch channel; monitors write through a
/// `FieldWriter` obtained when they start.
#[derive(Clone, Debug)]
pub struct ViewStateHub {
    tx: Arc<watch::Sender<PeerViewState>>,
}

impl ViewStateHub {
    /// Create a hub holding the empty state
    pub fn new() -> Self {
        let (tx, _) = watch::channel(PeerViewState::empty());
        ViewStateHub { tx: Arc::new(tx) }
    }

    pub fn subscribe(&self) -> watch::Receiver<PeerViewState> {
        self.tx.subscribe()
    }

    /// Copy of the current state
    pub fn snapshot(&self) -> PeerViewState {
        self.tx.borrow().clone()
    }

    /// Open a live writer for a monitor that is starting
    pub fn writer(&self) -> FieldWriter {
        FieldWriter {
            tx: Arc::clone(&self.tx),
            live: Arc::new(Mutex::new(true)),
        }
    }

    /// Unconditional write that always notifies subscribers
    pub fn force(&self, modify: impl FnOnce(&mut PeerViewState)) {
        self.tx.send_modify(modify);
    }
}

impl Default for ViewStateHub {
    fn default() -> Self {
        Self::new()
    }
}

/// Write access of one running monitor
///
/// Clones share the liveness flag. After `retire`, every write attempt from
/// any clone is rejected, so a task that is still winding down can never
/// touch state that belongs to a newer binding.
#[derive(Clone, Debug)]
pub struct FieldWriter {
    tx: Arc<watch::Sender<PeerViewState>>,
    live: Arc<Mutex<bool>>,
}

impl FieldWriter {
    pub fn is_live(&self) -> bool {
        *self.live.lock()
    }

    /// Apply `modify` if still live; it returns whether it changed anything,
    /// and subscribers are only notified on change
    pub fn update(&self, modify: impl FnOnce(&mut PeerViewState) -> bool) -> bool {
        let live = self.live.lock();
        if !*live {
            return false;
        }
        self.tx.send_if_modified(modify)
    }

    /// Run `f` only while live, holding the liveness lock
    pub fn when_live(&self, f: impl FnOnce()) -> bool {
        let live = self.live.lock();
        if *live {
            f();
        }
        *live
    }

    /// Revoke write access and apply the monitor's reset
    ///
    /// Returns true the first time; later calls still re-assert the reset.
    pub fn retire(&self, reset: impl FnOnce(&mut PeerViewState)) -> bool {
        let was_live = {
            let mut live = self.live.lock();
            std::mem::replace(&mut *live, false)
        };
        self.tx.send_modify(reset);
        was_live
    }
}
