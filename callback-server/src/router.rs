//! Event routing for HTTP callback notifications.
//!
//! The `EventRouter` keeps the set of callback paths that belong to live
//! subscriptions and forwards matching NOTIFY requests to a channel.
//! Registration is synchronous so the single-threaded scheduler can manage
//! paths without entering the server's runtime.

use parking_lot::RwLock;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::trace;

/// An inbound NOTIFY request, unparsed.
///
/// Carries no device-specific context; the consumer matches it to a
/// subscription by its callback path and SID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationPayload {
    /// Request path, e.g. `/avt/3f2a…`
    pub path: String,
    /// The subscription ID from the UPnP SID header
    pub subscription_id: String,
    /// Event sequence number from the SEQ header
    pub seq: Option<u32>,
    /// The raw XML event body
    pub event_xml: String,
}

/// Routes notifications from HTTP callbacks to a channel.
#[derive(Debug, Clone)]
pub struct EventRouter {
    /// Callback paths of active subscriptions
    paths: Arc<RwLock<HashSet<String>>>,
    event_sender: mpsc::UnboundedSender<NotificationPayload>,
}

impl EventRouter {
    /// Create a new event router.
    ///
    /// ```
    /// use tokio::sync::mpsc;
    /// use callback_server::router::{EventRouter, NotificationPayload};
    ///
    /// let (tx, _rx) = mpsc::unbounded_channel::<NotificationPayload>();
    /// let router = EventRouter::new(tx);
    /// router.register("/avt/1");
    /// assert!(router.is_registered("/avt/1"));
    /// ```
    pub fn new(event_sender: mpsc::UnboundedSender<NotificationPayload>) -> Self {
        Self {
            paths: Arc::new(RwLock::new(HashSet::new())),
            event_sender,
        }
    }

    /// Register a callback path for event routing.
    pub fn register(&self, path: impl Into<String>) {
        self.paths.write().insert(normalize(path.into()));
    }

    /// Stop routing a callback path.
    pub fn unregister(&self, path: &str) {
        self.paths.write().remove(&normalize(path.to_string()));
    }

    pub fn is_registered(&self, path: &str) -> bool {
        self.paths.read().contains(&normalize(path.to_string()))
    }

    /// Forward a notification if its path is registered.
    ///
    /// Returns `false` for unknown paths; the server answers those with
    /// `412 Precondition Failed`.
    pub fn route(&self, payload: NotificationPayload) -> bool {
        if !self.is_registered(&payload.path) {
            trace!(path = %payload.path, "no subscription for callback path");
            return false;
        }

        // A dropped receiver means the consumer is shutting down
        let _ = self.event_sender.send(payload);
        true
    }
}

fn normalize(mut path: String) -> String {
    if !path.starts_with('/') {
        path.insert(0, '/');
    }
    while path.len() > 1 && path.ends_with('/') {
        path.pop();
    }
    path
}
