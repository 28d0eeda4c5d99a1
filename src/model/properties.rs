//! Insertion-ordered `name → value` bag used by plug-ins and data sources.

use serde::{Deserialize, Serialize};

/// Ordered string properties. Re-adding a name replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Properties {
    entries: Vec<(String, String)>,
}

impl Properties {
    pub(crate) fn insert(&mut self, name: String, value: String) {
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    pub(crate) fn remove(&mut self, name: &str) -> Option<String> {
        let index = self.entries.iter().position(|(n, _)| n == name)?;
        Some(self.entries.remove(index).1)
    }

    /// Value for `name`, if present.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Entries in insertion order.
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insertion_order_and_replace() {
        let mut props = Properties::default();
        props.insert("url".into(), "jdbc:a".into());
        props.insert("user".into(), "sa".into());
        props.insert("url".into(), "jdbc:b".into());

        let entries: Vec<_> = props.iter().collect();
        assert_eq!(entries, vec![("url", "jdbc:b"), ("user", "sa")]);
        assert_eq!(props.remove("url").as_deref(), Some("jdbc:b"));
        assert_eq!(props.len(), 1);
    }
}
