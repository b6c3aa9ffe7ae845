//! Capacity-bounded insertion-order record of notes placed in tabs.
//!
//! Pushing past capacity drops the oldest entries; the coordinator then
//! closes every live tab whose note is no longer recorded. Recency is
//! insertion order only: focusing a tab does not move it.

use note_session_config::NoteId;
use std::collections::VecDeque;

#[derive(Debug, Clone)]
pub struct TabSequence {
    ids: VecDeque<NoteId>,
    capacity: usize,
}

impl TabSequence {
    /// Create an empty sequence. A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        Self {
            ids: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn contains(&self, note_id: &NoteId) -> bool {
        self.ids.contains(note_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &NoteId> {
        self.ids.iter()
    }

    pub fn to_vec(&self) -> Vec<NoteId> {
        self.ids.iter().cloned().collect()
    }

    /// Record a placement as the newest entry, returning whatever fell off
    /// the front. A note already present moves to the back.
    pub fn push(&mut self, note_id: NoteId) -> Vec<NoteId> {
        self.remove(&note_id);
        self.ids.push_back(note_id);
        self.trim()
    }

    pub fn remove(&mut self, note_id: &NoteId) -> bool {
        match self.ids.iter().position(|id| id == note_id) {
            Some(idx) => {
                self.ids.remove(idx);
                true
            }
            None => false,
        }
    }

    /// Change the bound, returning entries dropped to fit a smaller one.
    pub fn set_capacity(&mut self, capacity: usize) -> Vec<NoteId> {
        self.capacity = capacity.max(1);
        self.trim()
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    fn trim(&mut self) -> Vec<NoteId> {
        let mut evicted = Vec::new();
        while self.ids.len() > self.capacity {
            if let Some(oldest) = self.ids.pop_front() {
                evicted.push(oldest);
            }
        }
        evicted
    }
}
