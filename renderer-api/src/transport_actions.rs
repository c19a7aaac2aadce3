//! The `CurrentTransportActions` list

use std::collections::BTreeSet;

/// Transport actions the device currently permits, e.g. `Play,Pause,Seek`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransportActions {
    actions: BTreeSet<String>,
}

impl TransportActions {
    pub fn parse(list: &str) -> Self {
        Self {
            actions: list
                .split(',')
                .map(|a| a.trim().to_ascii_lowercase())
                .filter(|a| !a.is_empty())
                .collect(),
        }
    }

    /// Case-insensitive membership test
    pub fn contains(&self, action: &str) -> bool {
        self.actions.contains(&action.to_ascii_lowercase())
    }

    pub fn can_seek(&self) -> bool {
        self.contains("Seek") || self.contains("X_DLNA_SeekTime")
    }

    pub fn can_pause(&self) -> bool {
        self.contains("Pause")
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}
