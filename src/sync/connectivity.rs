//! # Connectivity Monitor
//!
//! Translates platform-level network events into two states, online and
//! offline, and emits a sync trigger once per offline-to-online transition.
//! Steady-state repeats of the same platform event are ignored. There is no
//! connection-quality probing: a platform-reported "online" is trusted at
//! face value, and per-record remote failures are the real arbiter.

use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::mpsc;

/// Discrete events that can move the orchestrator into its running state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncTrigger {
    /// Connectivity transitioned from offline to online
    ConnectivityRestored,
    /// Explicit user-initiated sync request (also used for the startup drain)
    Manual,
}

/// Connectivity state holder and transition deduplicator
#[derive(Debug)]
pub struct ConnectivityMonitor {
    online: AtomicBool,
    triggers: mpsc::UnboundedSender<SyncTrigger>,
}

impl ConnectivityMonitor {
    /// Create a monitor with the platform's reported state at startup
    pub fn new(initially_online: bool, triggers: mpsc::UnboundedSender<SyncTrigger>) -> Self {
        Self {
            online: AtomicBool::new(initially_online),
            triggers,
        }
    }

    /// Current connectivity state
    pub fn is_online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }

    /// Report the platform connectivity state
    ///
    /// Returns `true` if this call was a transition. An offline-to-online
    /// transition emits exactly one [`SyncTrigger::ConnectivityRestored`];
    /// redundant platform events emit nothing.
    pub fn set_online(&self, online: bool) -> bool {
        let previous = self.online.swap(online, Ordering::SeqCst);
        if previous == online {
            return false;
        }

        if online {
            tracing::info!("connectivity restored");
            // Receiver gone means the engine is shut down; nothing to do.
            let _ = self.triggers.send(SyncTrigger::ConnectivityRestored);
        } else {
            tracing::info!("connectivity lost");
        }
        true
    }
}
