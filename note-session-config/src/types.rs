//! Identifier and value types shared by the config crate and the coordinator.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Opaque, stable note identifier.
///
/// Used as the map key for every per-note registry (slots, caches,
/// debounce timers, saved geometry).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteId(String);

impl NoteId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NoteId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for NoteId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Whether notes of an account live only on this machine or are synchronized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AccountKind {
    #[default]
    Local,
    Synchronized,
}

/// Identity of the account whose notes are being edited.
///
/// Two accounts are the same account when their ids and kinds match; the
/// display name is cosmetic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub kind: AccountKind,
}

impl Account {
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: AccountKind) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
        }
    }

    pub fn local(id: impl Into<String>) -> Self {
        let id = id.into();
        Self::new(id.clone(), id, AccountKind::Local)
    }

    pub fn is_local(&self) -> bool {
        self.kind == AccountKind::Local
    }

    /// Directory-safe form of the account id, used for per-account storage.
    pub fn storage_key(&self) -> String {
        let kind = match self.kind {
            AccountKind::Local => "local",
            AccountKind::Synchronized => "sync",
        };
        let id: String = self
            .id
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        format!("{kind}-{id}")
    }
}

impl PartialEq for Account {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.kind == other.kind
    }
}

impl Eq for Account {}

/// Saved window geometry as produced by the UI host.
///
/// The coordinator never interprets the bytes; a host that cannot apply a
/// blob reports it as malformed and the window keeps its default geometry.
/// Serialized as base64 text so it survives YAML round trips.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GeometryBlob(Vec<u8>);

impl GeometryBlob {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for GeometryBlob {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&BASE64.encode(&self.0))
    }
}

impl<'de> Deserialize<'de> for GeometryBlob {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        BASE64
            .decode(text.trim())
            .map(GeometryBlob)
            .map_err(serde::de::Error::custom)
    }
}
