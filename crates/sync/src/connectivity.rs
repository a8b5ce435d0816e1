// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Network reachability monitoring.
//!
//! The monitor is fed raw platform signals via [`ConnectivityMonitor::update`]
//! and keeps the last computed [`ConnectivityStatus`] for synchronous reads.
//! Subscribers are notified only when the computed status actually changes,
//! so a burst of identical signals collapses to transition edges — an
//! offline→online flap produces exactly one notification.

use std::sync::{Arc, Mutex, MutexGuard};

/// The kind of network transport currently in use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    Wifi,
    Cellular,
    /// No transport available.
    None,
    Unknown,
}

/// A raw reachability signal from the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetSignal {
    /// Whether the platform reports a network interface as up.
    pub connected: bool,
    /// Whether the wider internet is reachable, if the platform knows.
    pub reachable: Option<bool>,
    pub transport: TransportKind,
}

impl NetSignal {
    /// A signal reporting a usable connection over the given transport.
    pub fn online(transport: TransportKind) -> Self {
        NetSignal {
            connected: true,
            reachable: Some(true),
            transport,
        }
    }

    /// A signal reporting no connection at all.
    pub fn offline() -> Self {
        NetSignal {
            connected: false,
            reachable: Some(false),
            transport: TransportKind::None,
        }
    }
}

/// The last-known connectivity state. Ephemeral, recomputed on every
/// platform signal; never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectivityStatus {
    /// True when a transport is up and reachability is not known to be down.
    pub connected: bool,
    pub reachable: Option<bool>,
    pub transport: TransportKind,
}

impl ConnectivityStatus {
    /// The initial state before any signal has arrived.
    pub fn unknown() -> Self {
        ConnectivityStatus {
            connected: false,
            reachable: None,
            transport: TransportKind::Unknown,
        }
    }

    fn from_signal(signal: NetSignal) -> Self {
        ConnectivityStatus {
            connected: signal.connected && signal.reachable != Some(false),
            reachable: signal.reachable,
            transport: signal.transport,
        }
    }
}

/// Subscriber callback invoked with the new status on every transition.
pub type Callback = Arc<dyn Fn(ConnectivityStatus) + Send + Sync>;

struct MonitorInner {
    status: ConnectivityStatus,
    next_token: u64,
    subscribers: Vec<(u64, Callback)>,
}

/// Observes network reachability and notifies subscribers on transitions.
///
/// Cheap to clone; all clones share the same state.
#[derive(Clone)]
pub struct ConnectivityMonitor {
    inner: Arc<Mutex<MonitorInner>>,
}

impl ConnectivityMonitor {
    /// Creates a monitor in the unknown (disconnected) state.
    pub fn new() -> Self {
        ConnectivityMonitor {
            inner: Arc::new(Mutex::new(MonitorInner {
                status: ConnectivityStatus::unknown(),
                next_token: 0,
                subscribers: Vec::new(),
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, MonitorInner> {
        // A panicking subscriber must not wedge connectivity tracking.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Returns the last-known status without blocking on the network.
    pub fn status(&self) -> ConnectivityStatus {
        self.lock().status
    }

    /// Registers a callback invoked on every status transition.
    ///
    /// The callback must not block; long work should be spawned.
    pub fn subscribe(&self, callback: Callback) -> Subscription {
        let mut inner = self.lock();
        let token = inner.next_token;
        inner.next_token += 1;
        inner.subscribers.push((token, callback));
        Subscription {
            token,
            monitor: self.clone(),
        }
    }

    /// Feeds a platform signal into the monitor.
    ///
    /// Recomputes the status and, if it differs from the previous one,
    /// notifies all subscribers exactly once.
    pub fn update(&self, signal: NetSignal) {
        let (status, callbacks) = {
            let mut inner = self.lock();
            let status = ConnectivityStatus::from_signal(signal);
            if status == inner.status {
                return;
            }
            inner.status = status;
            let callbacks: Vec<Callback> =
                inner.subscribers.iter().map(|(_, cb)| Arc::clone(cb)).collect();
            (status, callbacks)
        };

        // Invoke outside the lock so a callback may read status() freely.
        for callback in callbacks {
            callback(status);
        }
    }

    fn unsubscribe(&self, token: u64) {
        self.lock().subscribers.retain(|(t, _)| *t != token);
    }
}

impl Default for ConnectivityMonitor {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle returned by [`ConnectivityMonitor::subscribe`].
pub struct Subscription {
    token: u64,
    monitor: ConnectivityMonitor,
}

impl Subscription {
    /// Removes the callback from the monitor.
    pub fn unsubscribe(self) {
        self.monitor.unsubscribe(self.token);
    }
}

#[cfg(test)]
#[path = "connectivity_tests.rs"]
mod tests;
