//! One-shot readiness signal
//!
//! Starts false, latches true exactly once when the database connection is
//! open and seeded, and never reverts for the life of the process.

use tokio::sync::watch;

/// Owner side of the readiness signal.
#[derive(Debug)]
pub struct Readiness {
    tx: watch::Sender<bool>,
}

impl Readiness {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx }
    }

    /// Latch the signal true. Idempotent.
    pub fn mark_ready(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_ready(&self) -> bool {
        *self.tx.borrow()
    }

    /// Observer handle for collaborators that await readiness.
    pub fn probe(&self) -> ReadinessProbe {
        ReadinessProbe {
            rx: self.tx.subscribe(),
        }
    }
}

impl Default for Readiness {
    fn default() -> Self {
        Self::new()
    }
}

/// Observer side: current-value reads and suspend-until-ready.
#[derive(Debug, Clone)]
pub struct ReadinessProbe {
    rx: watch::Receiver<bool>,
}

impl ReadinessProbe {
    pub fn is_ready(&self) -> bool {
        *self.rx.borrow()
    }

    /// Wait until the signal is true. Returns immediately when it already is.
    pub async fn wait_ready(&mut self) {
        let _ = self.rx.wait_for(|ready| *ready).await;
    }
}
