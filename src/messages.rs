use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A distinct message text and every place it was found
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// The literal message text, also the deduplication key
    pub id: String,
    /// `path:line:column` entries in discovery order
    pub positions: Vec<String>,
}

/// Envelope written to the JSON catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputJson {
    pub messages: Vec<Message>,
}

/// Insertion-ordered collection of messages keyed by text.
///
/// The first sighting of a text fixes its place in the output; later
/// sightings only append positions.
#[derive(Debug, Default, Clone)]
pub struct MessageSet {
    entries: Vec<Message>,
    index: HashMap<String, usize>,
}

impl MessageSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one call-site of `id` found at `position`
    pub fn record(&mut self, id: String, position: String) {
        match self.index.get(&id) {
            Some(&slot) => self.entries[slot].positions.push(position),
            None => {
                self.index.insert(id.clone(), self.entries.len());
                self.entries.push(Message {
                    id,
                    positions: vec![position],
                });
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<&Message> {
        self.index.get(id).map(|&slot| &self.entries[slot])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of call-sites across all messages
    pub fn call_sites(&self) -> usize {
        self.entries.iter().map(|m| m.positions.len()).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Message> {
        self.entries.iter()
    }

    /// Finish aggregation, yielding messages in first-seen order
    pub fn into_messages(self) -> Vec<Message> {
        self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_seen_order_is_kept() {
        let mut set = MessageSet::new();
        set.record("Zebra".to_string(), "a.html:1:1".to_string());
        set.record("Apple".to_string(), "a.html:2:1".to_string());
        set.record("Mango".to_string(), "b.html:1:1".to_string());

        let ids: Vec<_> = set.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["Zebra", "Apple", "Mango"]);
    }

    #[test]
    fn test_repeats_append_positions() {
        let mut set = MessageSet::new();
        set.record("Save".to_string(), "dup.html:1:15".to_string());
        set.record("Cancel".to_string(), "dup.html:1:30".to_string());
        set.record("Save".to_string(), "dup.html:1:45".to_string());
        set.record("Save".to_string(), "other.html:3:2".to_string());

        assert_eq!(set.len(), 2);
        assert_eq!(set.call_sites(), 4);
        assert_eq!(
            set.get("Save").unwrap().positions,
            vec!["dup.html:1:15", "dup.html:1:45", "other.html:3:2"]
        );

        let messages = set.into_messages();
        assert_eq!(messages[0].id, "Save");
        assert_eq!(messages[1].id, "Cancel");
    }

    #[test]
    fn test_same_position_twice_is_not_collapsed() {
        let mut set = MessageSet::new();
        set.record("Hi".to_string(), "a.html:1:1".to_string());
        set.record("Hi".to_string(), "a.html:1:1".to_string());
        assert_eq!(set.get("Hi").unwrap().positions.len(), 2);
    }

    #[test]
    fn test_empty_set() {
        let set = MessageSet::new();
        assert!(set.is_empty());
        assert!(set.get("missing").is_none());
        assert!(set.into_messages().is_empty());
    }
}
