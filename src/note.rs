//! Note records exchanged with the note store.

use chrono::Utc;
use note_session_config::{Account, NoteId};
use serde::{Deserialize, Serialize};

/// Attributes carried alongside note content.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteAttributes {
    /// Application that created the note.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_application: Option<String>,
}

/// A note as materialized by the note store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    /// Server-side identifier, absent until the note is synchronized.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guid: Option<String>,
    /// Notebook (container) the note belongs to.
    pub notebook_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Created/updated timestamps, epoch milliseconds.
    pub created_at: i64,
    pub updated_at: i64,
    /// Never to be sent to a sync server.
    #[serde(default)]
    pub local_only: bool,
    /// Has changes the sync layer has not pushed yet.
    #[serde(default)]
    pub locally_modified: bool,
    #[serde(default)]
    pub attributes: NoteAttributes,
}

impl Note {
    /// Synthesize an empty note for `account` in `notebook_id`.
    ///
    /// Local accounts get local-only notes; synchronized accounts get notes
    /// flagged as locally modified so the sync layer picks them up.
    pub fn new_empty(account: &Account, notebook_id: &str, source_application: &str) -> Self {
        let now = Utc::now().timestamp_millis();
        Self {
            id: NoteId::new(uuid::Uuid::new_v4().to_string()),
            guid: None,
            notebook_id: notebook_id.to_string(),
            title: None,
            content: None,
            created_at: now,
            updated_at: now,
            local_only: account.is_local(),
            locally_modified: !account.is_local(),
            attributes: NoteAttributes {
                source_application: Some(source_application.to_string()),
            },
        }
    }

    /// Title if set, otherwise the first non-empty line of content.
    pub fn title_or_preview(&self) -> String {
        if let Some(title) = self.title.as_deref().map(str::trim)
            && !title.is_empty()
        {
            return title.to_string();
        }

        self.content
            .as_deref()
            .and_then(|c| c.lines().map(str::trim).find(|l| !l.is_empty()))
            .map(|line| line.chars().take(PREVIEW_CHARS).collect())
            .unwrap_or_default()
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now().timestamp_millis();
    }
}

const PREVIEW_CHARS: usize = 64;
