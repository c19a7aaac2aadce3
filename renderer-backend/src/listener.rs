//! GENA event listener for one renderer service
//!
//! Each listener owns a unique callback path on the shared callback
//! server. Notifications are matched by that path, so events that arrive
//! while a subscription is being renewed or replaced are still delivered.

use callback_server::{EventRouter, NotificationPayload};
use renderer_api::{ManagedSubscription, Service, SoapClient};
use renderer_parser::parse_property_set;
use std::sync::mpsc;
use std::time::{Duration, Instant};
use tracing::{debug, info, trace, warn};
use uuid::Uuid;

use crate::message::SessionMessage;

/// Keeps a GENA subscription alive and turns its notifications into messages
pub struct EventListener {
    service: Service,
    event_url: String,
    callback_path: String,
    callback_url: String,
    subscription: Option<ManagedSubscription>,
    soap: SoapClient,
    router: EventRouter,
    sink: mpsc::Sender<SessionMessage>,
    timeout_seconds: u32,
    renewal_threshold: Duration,
    resubscribe_delay: Duration,
    retry_at: Option<Instant>,
}

/// Subscription parameters shared by the listeners of a session
#[derive(Debug, Clone, Copy)]
pub struct ListenerTiming {
    pub timeout_seconds: u32,
    pub renewal_threshold: Duration,
    pub resubscribe_delay: Duration,
}

impl EventListener {
    /// Register a fresh callback path for `service`. Nothing is sent to the
    /// device until the first [`ping`](Self::ping).
    pub fn create(
        event_url: &str,
        callback_base_url: &str,
        service: Service,
        sink: mpsc::Sender<SessionMessage>,
        soap: SoapClient,
        router: EventRouter,
        timing: ListenerTiming,
    ) -> Self {
        let callback_path = format!("/{}/{}", service.namespace_tag(), Uuid::new_v4().simple());
        let callback_url = format!("{}{}", callback_base_url.trim_end_matches('/'), callback_path);
        router.register(callback_path.as_str());
        debug!(%service, %callback_url, "event listener created");

        Self {
            service,
            event_url: event_url.to_string(),
            callback_path,
            callback_url,
            subscription: None,
            soap,
            router,
            sink,
            timeout_seconds: timing.timeout_seconds,
            renewal_threshold: timing.renewal_threshold,
            resubscribe_delay: timing.resubscribe_delay,
            retry_at: None,
        }
    }

    pub fn service(&self) -> Service {
        self.service
    }

    pub fn callback_path(&self) -> &str {
        &self.callback_path
    }

    pub fn callback_url(&self) -> &str {
        &self.callback_url
    }

    pub fn is_subscribed(&self, now: Instant) -> bool {
        self.subscription.as_ref().is_some_and(|s| s.is_active_at(now))
    }

    /// Keep the subscription alive
    ///
    /// Subscribes when there is no live subscription, renews one that is
    /// about to lapse and replaces one whose renewal failed. Failed
    /// subscribes are retried after the resubscribe delay. Returns whether
    /// a request was sent.
    pub fn ping(&mut self, now: Instant) -> bool {
        if let Some(subscription) = self.subscription.as_mut() {
            if !subscription.is_active_at(now) {
                debug!(service = %self.service, "subscription lapsed");
                self.release_subscription();
            } else if subscription.needs_renewal(now) {
                match subscription.renew() {
                    Ok(()) => return true,
                    Err(e) => {
                        warn!(service = %self.service, error = %e, "renewal failed, resubscribing");
                        self.release_subscription();
                    }
                }
            } else {
                return false;
            }
        }

        if self.retry_at.is_some_and(|at| now < at) {
            return false;
        }
        self.subscribe(now);
        true
    }

    fn release_subscription(&mut self) {
        if let Some(mut subscription) = self.subscription.take() {
            if let Err(e) = subscription.unsubscribe() {
                debug!(service = %self.service, error = %e, "unsubscribe failed");
            }
        }
    }

    fn subscribe(&mut self, now: Instant) {
        match ManagedSubscription::create(
            self.soap.clone(),
            &self.event_url,
            &self.callback_url,
            self.timeout_seconds,
        ) {
            Ok(subscription) => {
                info!(service = %self.service, sid = subscription.subscription_id(), "subscribed");
                self.subscription = Some(subscription.with_renewal_threshold(self.renewal_threshold));
                self.retry_at = None;
            }
            Err(e) => {
                warn!(service = %self.service, error = %e, "subscribe failed");
                self.retry_at = Some(now + self.resubscribe_delay);
            }
        }
    }

    /// Consume a notification addressed to this listener
    ///
    /// Returns `false` when the path belongs to someone else. Notifications
    /// carrying the SID of a replaced subscription are consumed and dropped.
    pub fn handle(&self, notification: &NotificationPayload) -> bool {
        if notification.path.trim_end_matches('/') != self.callback_path {
            return false;
        }

        if let Some(subscription) = &self.subscription {
            if subscription.subscription_id() != notification.subscription_id {
                debug!(
                    service = %self.service,
                    sid = %notification.subscription_id,
                    "dropping event for stale subscription"
                );
                return true;
            }
        }

        let values = match parse_property_set(&notification.event_xml) {
            Ok(values) => values,
            Err(e) => {
                warn!(service = %self.service, error = %e, "malformed event body");
                return true;
            }
        };

        trace!(service = %self.service, seq = ?notification.seq, count = values.len(), "event");
        for value in values {
            let message = SessionMessage::Event {
                service: self.service,
                variable: value.name,
                value: value.val,
                channel: value.channel,
            };
            if self.sink.send(message).is_err() {
                trace!("session queue closed");
                break;
            }
        }
        true
    }

    /// Unsubscribe and release the callback path; safe to call repeatedly
    pub fn close(&mut self) {
        self.release_subscription();
        self.router.unregister(&self.callback_path);
    }
}

impl Drop for EventListener {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for EventListener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventListener")
            .field("service", &self.service)
            .field("callback_url", &self.callback_url)
            .field("subscribed", &self.subscription.is_some())
            .finish()
    }
}
