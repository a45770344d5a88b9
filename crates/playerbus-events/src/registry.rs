use crate::topic::Topic;
use std::collections::HashMap;

#[derive(Debug)]
struct Entry<C> {
    sequence: u64,
    callback: C,
}

/// Topic -> subscribers in registration order.
///
/// Sequence numbers come from one counter shared by every topic, so within a
/// topic they are strictly increasing and a removed number is never handed
/// out again.
#[derive(Debug)]
pub struct Registry<C> {
    topics: HashMap<Topic, Vec<Entry<C>>>,
    next_sequence: u64,
}

impl<C> Default for Registry<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> Registry<C> {
    pub fn new() -> Self {
        Self {
            topics: HashMap::new(),
            next_sequence: 0,
        }
    }

    pub fn insert(&mut self, topic: Topic, callback: C) -> u64 {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        let list = self.topics.entry(topic).or_insert_with(Vec::new);
        list.push(Entry { sequence, callback });
        sequence
    }

    pub fn remove(&mut self, topic: &str, sequence: u64) -> bool {
        let Some(list) = self.topics.get_mut(topic) else {
            return false;
        };
        let Ok(index) = list.binary_search_by_key(&sequence, |e| e.sequence) else {
            return false;
        };
        list.remove(index);
        if list.is_empty() {
            self.topics.remove(topic);
        }
        true
    }

    pub fn len(&self, topic: &str) -> usize {
        self.topics.get(topic).map_or(0, Vec::len)
    }

    pub fn total(&self) -> usize {
        self.topics.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }

    pub fn topics(&self) -> Vec<Topic> {
        let mut names: Vec<Topic> = self.topics.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn clear(&mut self, topic: &str) -> usize {
        self.topics.remove(topic).map_or(0, |list| list.len())
    }
}

impl<C: Clone> Registry<C> {
    pub fn snapshot(&self, topic: &str) -> Vec<(u64, C)> {
        self.topics
            .get(topic)
            .map(|list| {
                list.iter()
                    .map(|e| (e.sequence, e.callback.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }
}
