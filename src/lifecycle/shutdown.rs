//! Shutdown coordination for both units.

use tokio::sync::broadcast;

/// Fan-out stop signal for the HTTP server and the Ingestor.
///
/// Each unit holds its own receiver; a unit whose receiver reports the
/// channel closed stops as well, so dropping the coordinator also ends them.
#[derive(Debug, Clone)]
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    /// Receiver for one unit.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Signal every subscribed unit. Returns how many were notified.
    pub fn trigger(&self) -> usize {
        let notified = self.tx.send(()).unwrap_or(0);
        tracing::info!(units = notified, "Shutdown triggered");
        notified
    }

    /// Units that still hold a receiver.
    pub fn subscribers(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
