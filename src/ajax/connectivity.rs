// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Network connectivity reporting
//!
//! The request layer never probes the network itself; it asks an injected
//! [`Connectivity`] source, so embedders wire in whatever signal their
//! platform has (and tests flip a switch).

use std::time::Duration;

use tokio::sync::watch;
use tokio::time::Instant;

/// Source of the current connectivity state
pub trait Connectivity: Send + Sync {
    /// Whether the runtime currently has network connectivity
    fn is_online(&self) -> bool;

    /// Subscribe to connectivity changes
    fn subscribe(&self) -> watch::Receiver<bool>;
}

/// Connectivity state driven by the embedder
#[derive(Clone)]
pub struct ConnectivityMonitor {
    state: watch::Sender<bool>,
}

impl Default for ConnectivityMonitor {
    fn default() -> Self {
        Self::new(true)
    }
}

impl ConnectivityMonitor {
    /// Create a monitor with the given initial state
    pub fn new(online: bool) -> Self {
        let (state, _) = watch::channel(online);
        Self { state }
    }

    /// Report a connectivity change
    pub fn set_online(&self, online: bool) {
        let previous = self.state.send_replace(online);
        if previous != online {
            tracing::info!(online, "Connectivity changed");
        }
    }
}

impl Connectivity for ConnectivityMonitor {
    fn is_online(&self) -> bool {
        *self.state.borrow()
    }

    fn subscribe(&self) -> watch::Receiver<bool> {
        self.state.subscribe()
    }
}

/// Wait for connectivity to return, bounded by `max_wait`
///
/// Listens for the restored event and polls at `poll` intervals, matching
/// platforms where the change notification is unreliable. Returns true
/// once online, false when the bound expires first.
pub(crate) async fn wait_for_network(
    connectivity: &dyn Connectivity,
    max_wait: Duration,
    poll: Duration,
) -> bool {
    let deadline = Instant::now() + max_wait;
    let mut changes = connectivity.subscribe();
    let mut change_source_alive = true;

    loop {
        if connectivity.is_online() {
            return true;
        }
        let Some(remaining) = deadline.checked_duration_since(Instant::now()) else {
            return false;
        };
        let step = poll.min(remaining);

        if change_source_alive {
            tokio::select! {
                changed = changes.changed() => {
                    if changed.is_err() {
                        // Sender dropped; keep polling only.
                        change_source_alive = false;
                    }
                }
                _ = tokio::time::sleep(step) => {}
            }
        } else {
            tokio::time::sleep(step).await;
        }
    }
}
