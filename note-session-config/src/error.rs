//! Typed error variants for the note-session-config crate.

use thiserror::Error;

/// Errors that can occur when loading, saving or validating preferences
/// and account-scoped state.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An I/O error occurred reading or writing a state file.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A state file contained YAML that could not be parsed.
    #[error("YAML parse error in {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml_ng::Error,
    },

    /// A value could not be serialized to YAML.
    #[error("failed to serialize {what}: {source}")]
    Serialize {
        what: &'static str,
        #[source]
        source: serde_yaml_ng::Error,
    },

    /// A field value failed semantic validation.
    #[error("invalid preference: {0}")]
    Validation(String),
}
