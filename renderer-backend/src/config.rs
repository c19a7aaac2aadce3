//! Configuration for renderer sessions and the scheduler

use std::time::Duration;

use crate::error::{BackendError, Result};

/// Tunables shared by every session of a scheduler
#[derive(Debug, Clone, PartialEq)]
pub struct BackendConfig {
    /// Connect timeout for SOAP and GENA requests
    /// Default: 5 seconds
    pub soap_connect_timeout: Duration,

    /// Read timeout for SOAP and GENA requests
    /// Default: 10 seconds
    pub soap_read_timeout: Duration,

    /// Minimum time between position polls while playing
    /// Default: 1 second
    pub poll_interval: Duration,

    /// Queue the next track once less than this much of the current one remains
    /// Default: 10 seconds
    pub prequeue_threshold: Duration,

    /// Treat a STOPPED transition as a track change once this little remains
    /// Default: 3 seconds
    pub finishing_threshold: Duration,

    /// Use SetNextAVTransportURI when the device supports it
    /// Default: true
    pub gapless: bool,

    /// Timeout requested for GENA subscriptions
    /// Default: 1800 seconds (30 minutes)
    pub subscription_timeout: Duration,

    /// Renew this long before a subscription lapses
    /// Default: 5 minutes
    pub renewal_threshold: Duration,

    /// Wait before retrying a failed SUBSCRIBE
    /// Default: 30 seconds
    pub resubscribe_delay: Duration,

    /// Port range for the callback server
    /// Default: (3400, 3500)
    pub callback_port_range: (u16, u16),

    /// Sleep between idle scheduler rounds
    /// Default: 50 milliseconds
    pub tick_interval: Duration,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            soap_connect_timeout: Duration::from_secs(5),
            soap_read_timeout: Duration::from_secs(10),
            poll_interval: Duration::from_secs(1),
            prequeue_threshold: Duration::from_secs(10),
            finishing_threshold: Duration::from_secs(3),
            gapless: true,
            subscription_timeout: Duration::from_secs(1800),
            renewal_threshold: Duration::from_secs(300),
            resubscribe_delay: Duration::from_secs(30),
            callback_port_range: (3400, 3500),
            tick_interval: Duration::from_millis(50),
        }
    }
}

impl BackendConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Poll twice a second and retry subscriptions sooner
    pub fn fast_polling() -> Self {
        Self {
            poll_interval: Duration::from_millis(500),
            resubscribe_delay: Duration::from_secs(10),
            tick_interval: Duration::from_millis(20),
            ..Default::default()
        }
    }

    /// Never pre-queue the next track, even on capable devices
    pub fn no_gapless() -> Self {
        Self {
            gapless: false,
            ..Default::default()
        }
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_soap_timeouts(mut self, connect: Duration, read: Duration) -> Self {
        self.soap_connect_timeout = connect;
        self.soap_read_timeout = read;
        self
    }

    pub fn with_callback_port_range(mut self, start: u16, end: u16) -> Self {
        self.callback_port_range = (start, end);
        self
    }

    /// Subscription timeout in whole seconds, as sent in the TIMEOUT header
    pub fn subscription_timeout_secs(&self) -> u32 {
        u32::try_from(self.subscription_timeout.as_secs()).unwrap_or(u32::MAX)
    }

    /// Validate the configuration and return any issues
    pub fn validate(&self) -> Result<()> {
        if self.callback_port_range.0 > self.callback_port_range.1 {
            return Err(BackendError::Config(
                "Invalid callback port range: start must not exceed end".to_string(),
            ));
        }

        if self.poll_interval.is_zero() {
            return Err(BackendError::Config(
                "Poll interval must be greater than 0".to_string(),
            ));
        }

        if self.finishing_threshold >= self.prequeue_threshold {
            return Err(BackendError::Config(
                "Finishing threshold must be below the pre-queue threshold".to_string(),
            ));
        }

        if self.subscription_timeout <= self.renewal_threshold {
            return Err(BackendError::Config(
                "Subscription timeout must exceed the renewal threshold".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = BackendConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.prequeue_threshold, Duration::from_secs(10));
        assert_eq!(config.finishing_threshold, Duration::from_secs(3));
        assert_eq!(config.subscription_timeout_secs(), 1800);
    }

    #[test]
    fn test_presets() {
        assert!(BackendConfig::fast_polling().validate().is_ok());
        assert!(BackendConfig::fast_polling().poll_interval < BackendConfig::default().poll_interval);
        assert!(!BackendConfig::no_gapless().gapless);
    }

    #[test]
    fn test_invalid_configs() {
        let config = BackendConfig::default().with_callback_port_range(4000, 3000);
        assert!(matches!(config.validate(), Err(BackendError::Config(_))));

        let config = BackendConfig::default().with_poll_interval(Duration::ZERO);
        assert!(config.validate().is_err());

        let config = BackendConfig {
            finishing_threshold: Duration::from_secs(10),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = BackendConfig {
            subscription_timeout: Duration::from_secs(60),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
