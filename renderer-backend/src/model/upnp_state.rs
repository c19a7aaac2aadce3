//! Raw UPnP variable store

use renderer_api::Service;
use std::collections::HashMap;

/// Last value seen for each `(service, variable)` pair
///
/// Written on every event; entries are overwritten, never removed.
#[derive(Debug, Clone, Default)]
pub struct UpnpState {
    values: HashMap<(Service, String), String>,
}

impl UpnpState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a value, returning whether it differs from the previous one
    pub fn set(&mut self, service: Service, variable: &str, value: &str) -> bool {
        let previous = self
            .values
            .insert((service, variable.to_string()), value.to_string());
        previous.as_deref() != Some(value)
    }

    pub fn get(&self, service: Service, variable: &str) -> Option<&str> {
        self.values
            .get(&(service, variable.to_string()))
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
