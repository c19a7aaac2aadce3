//! Managed GENA subscription with lifecycle management
//!
//! Wraps the low-level SUBSCRIBE / renew / UNSUBSCRIBE requests with expiry
//! tracking, renewal and cleanup on drop.

use crate::error::{ApiError, Result};
use soap_client::SoapClient;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Renew this long before the subscription lapses
pub const DEFAULT_RENEWAL_THRESHOLD: Duration = Duration::from_secs(300);

/// A managed UPnP event subscription
///
/// # Example
/// ```rust,ignore
/// let mut subscription = ManagedSubscription::create(
///     soap,
///     "http://192.168.1.100:49152/AVTransport/event",
///     "http://192.168.1.50:3400/avt/1",
///     1800,
/// )?;
///
/// if subscription.needs_renewal(Instant::now()) {
///     subscription.renew()?;
/// }
///
/// subscription.unsubscribe()?;
/// ```
#[derive(Debug)]
pub struct ManagedSubscription {
    /// UPnP subscription ID (SID) returned by the device
    sid: String,
    event_url: String,
    expires_at: Instant,
    active: bool,
    timeout_seconds: u32,
    renewal_threshold: Duration,
    soap_client: SoapClient,
}

impl ManagedSubscription {
    /// Subscribe `callback_url` to the event source at `event_url`
    pub fn create(
        soap_client: SoapClient,
        event_url: &str,
        callback_url: &str,
        timeout_seconds: u32,
    ) -> Result<Self> {
        let response = soap_client
            .subscribe(event_url, callback_url, timeout_seconds)
            .map_err(|e| ApiError::SubscriptionError(e.to_string()))?;

        debug!(sid = %response.sid, event_url, "subscription created");

        Ok(Self {
            sid: response.sid,
            event_url: event_url.to_string(),
            expires_at: Instant::now() + Duration::from_secs(u64::from(response.timeout_seconds)),
            active: true,
            timeout_seconds: response.timeout_seconds,
            renewal_threshold: DEFAULT_RENEWAL_THRESHOLD,
            soap_client,
        })
    }

    pub fn with_renewal_threshold(mut self, threshold: Duration) -> Self {
        self.renewal_threshold = threshold;
        self
    }

    /// Get the subscription ID
    pub fn subscription_id(&self) -> &str {
        &self.sid
    }

    pub fn event_url(&self) -> &str {
        &self.event_url
    }

    /// Check if the subscription is still active and not expired
    pub fn is_active_at(&self, now: Instant) -> bool {
        self.active && now < self.expires_at
    }

    pub fn is_active(&self) -> bool {
        self.is_active_at(Instant::now())
    }

    /// Whether the subscription expires within the renewal threshold
    ///
    /// An expired subscription needs renewal too; an unsubscribed one never does.
    pub fn needs_renewal(&self, now: Instant) -> bool {
        self.active && self.expires_at.saturating_duration_since(now) <= self.renewal_threshold
    }

    /// Get when the subscription expires
    pub fn expires_at(&self) -> Instant {
        self.expires_at
    }

    /// Renew the subscription, updating the expiry from the granted timeout
    pub fn renew(&mut self) -> Result<()> {
        if !self.active {
            return Err(ApiError::subscription_expired());
        }

        let granted = self
            .soap_client
            .renew_subscription(&self.event_url, &self.sid, self.timeout_seconds)
            .map_err(|e| ApiError::SubscriptionError(e.to_string()))?;

        self.expires_at = Instant::now() + Duration::from_secs(u64::from(granted));
        self.timeout_seconds = granted;
        debug!(sid = %self.sid, granted, "subscription renewed");
        Ok(())
    }

    /// Unsubscribe and mark the subscription inactive
    ///
    /// The subscription is inactive afterwards regardless of the result.
    pub fn unsubscribe(&mut self) -> Result<()> {
        if !self.active {
            return Ok(());
        }
        self.active = false;

        self.soap_client
            .unsubscribe(&self.event_url, &self.sid)
            .map_err(|e| ApiError::SubscriptionError(e.to_string()))
    }
}

impl Drop for ManagedSubscription {
    fn drop(&mut self) {
        if self.active {
            if let Err(e) = self.unsubscribe() {
                warn!(sid = %self.sid, error = %e, "failed to unsubscribe during drop");
            }
        }
    }
}
