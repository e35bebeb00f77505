//! Bounded FIFO of recently executed record IDs.

use std::collections::VecDeque;

pub const DEFAULT_HISTORY_LEN: usize = 100;

#[derive(Debug, Clone)]
pub struct RecentIds {
    ids: VecDeque<String>,
    capacity: usize,
}

impl RecentIds {
    pub fn new(capacity: usize) -> Self {
        Self {
            ids: VecDeque::with_capacity(capacity.min(1024)),
            capacity,
        }
    }

    /// Record an ID, evicting the oldest entry when full.
    pub fn push(&mut self, id: impl Into<String>) {
        if self.capacity == 0 {
            return;
        }
        if self.ids.len() == self.capacity {
            self.ids.pop_front();
        }
        self.ids.push_back(id.into());
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|known| known == id)
    }

    /// Oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for RecentIds {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LEN)
    }
}
