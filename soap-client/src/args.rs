//! Ordered argument dictionaries for SOAP actions

/// Ordered list of `(name, value)` action arguments.
///
/// UPnP requires in-arguments to be sent in the order the service
/// description declares them, so this is a vector rather than a map.
/// The same type carries the out-arguments of a response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArgList {
    entries: Vec<(String, String)>,
}

impl ArgList {
    /// Create an empty argument list
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style append
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.push(name, value);
        self
    }

    /// Append an argument, replacing an existing one with the same name
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    /// Look up an argument value by name
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<N: Into<String>, V: Into<String>> FromIterator<(N, V)> for ArgList {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        let mut args = ArgList::new();
        for (name, value) in iter {
            args.push(name, value);
        }
        args
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preserves_insertion_order() {
        let args = ArgList::new()
            .with("InstanceID", "0")
            .with("Unit", "REL_TIME")
            .with("Target", "0:01:00");

        let names: Vec<&str> = args.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["InstanceID", "Unit", "Target"]);
    }

    #[test]
    fn test_push_replaces_existing() {
        let mut args = ArgList::new().with("Channel", "Master");
        args.push("Channel", "LF");

        assert_eq!(args.len(), 1);
        assert_eq!(args.get("Channel"), Some("LF"));
        assert_eq!(args.get("Missing"), None);
    }
}
