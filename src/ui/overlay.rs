use tokio::sync::watch;

use crate::gateway::BusyTracker;

/// Blocking "Processing request..." overlay driven by the busy flag.
pub struct BusyOverlay {
    flag: watch::Receiver<bool>,
}

impl BusyOverlay {
    pub fn new(tracker: &BusyTracker) -> Self {
        Self {
            flag: tracker.subscribe(),
        }
    }

    pub fn is_visible(&self) -> bool {
        *self.flag.borrow()
    }

    /// Wait for the next visibility change. `None` once the tracker is gone.
    pub async fn changed(&mut self) -> Option<bool> {
        self.flag.changed().await.ok()?;
        Some(*self.flag.borrow_and_update())
    }
}
