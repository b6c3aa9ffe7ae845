//! Per-note cache of decrypted inline secrets.
//!
//! When the user decrypts an encrypted fragment of a note, the editor may
//! cache the plaintext so re-rendering does not prompt again. An entry can be
//! marked "remember for this run"; a cache holding such an entry survives
//! the note's slot closing so reopening the note in the same run does not
//! prompt either. Everything else is dropped with the slot.

use note_session_config::NoteId;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecryptedEntry {
    pub decrypted_text: String,
    pub cipher: String,
    pub key_length: u32,
    /// Keep this entry until the process exits.
    pub remember_for_session: bool,
}

/// Decrypted fragments of one note, keyed by their encrypted text.
#[derive(Debug, Default)]
pub struct DecryptedTextCache {
    entries: HashMap<String, DecryptedEntry>,
}

impl DecryptedTextCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, encrypted_text: impl Into<String>, entry: DecryptedEntry) {
        self.entries.insert(encrypted_text.into(), entry);
    }

    pub fn find(&self, encrypted_text: &str) -> Option<&DecryptedEntry> {
        self.entries.get(encrypted_text)
    }

    /// Replace the plaintext of an existing entry after the user re-encrypts
    /// an edited fragment. Returns `false` if the fragment is unknown.
    pub fn update_decrypted_text(&mut self, encrypted_text: &str, decrypted_text: String) -> bool {
        match self.entries.get_mut(encrypted_text) {
            Some(entry) => {
                entry.decrypted_text = decrypted_text;
                true
            }
            None => false,
        }
    }

    pub fn has_remembered_entries(&self) -> bool {
        self.entries.values().any(|e| e.remember_for_session)
    }

    pub fn retain_remembered(&mut self) {
        self.entries.retain(|_, e| e.remember_for_session);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// All per-note caches owned by the coordinator.
#[derive(Debug, Default)]
pub struct DecryptedTextCacheRegistry {
    caches: HashMap<NoteId, DecryptedTextCache>,
}

impl DecryptedTextCacheRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, note_id: &NoteId) -> Option<&DecryptedTextCache> {
        self.caches.get(note_id)
    }

    pub fn get_or_create(&mut self, note_id: &NoteId) -> &mut DecryptedTextCache {
        self.caches.entry(note_id.clone()).or_default()
    }

    /// Release the cache of a note whose slot closed.
    ///
    /// A cache holding remembered entries is kept (with its other entries
    /// dropped); otherwise it is removed. Returns `true` if it was removed.
    pub fn release(&mut self, note_id: &NoteId) -> bool {
        let Some(cache) = self.caches.get_mut(note_id) else {
            return false;
        };

        if cache.has_remembered_entries() {
            cache.retain_remembered();
            log::debug!(
                "Keeping {} remembered decrypted fragment(s) for note {}",
                cache.len(),
                note_id
            );
            false
        } else {
            self.caches.remove(note_id);
            true
        }
    }

    pub fn clear(&mut self) {
        self.caches.clear();
    }

    pub fn len(&self) -> usize {
        self.caches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.caches.is_empty()
    }
}
