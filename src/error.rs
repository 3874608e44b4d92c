use std::path::PathBuf;
use thiserror::Error;

/// Coarse classification of a [`ConfigError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A field kind no source can assign, or a record that cannot be mapped to flags.
    InvalidArgs,
    /// Text or JSON could not be converted to the field's kind.
    Parse,
    /// A well-formed number that does not fit the destination width.
    Overflow,
    /// The command line did not match the registered flags.
    FlagParse,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid arguments: unknown type [{name}]: {kind}")]
    UnsupportedKind { name: String, kind: &'static str },

    #[error("invalid arguments: flag '{flag}' defined by both [{first}] and [{second}]")]
    DuplicateFlag {
        flag: String,
        first: String,
        second: String,
    },

    #[error("failed to parse [{name}]: '{raw}': {reason}")]
    InvalidValue {
        name: String,
        raw: String,
        reason: String,
    },

    #[error("failed to parse [{name}] as json: {source}")]
    InvalidJson {
        name: String,
        raw: String,
        source: serde_json::Error,
    },

    #[error("overflow parsing [{name}]: '{raw}' overflows")]
    Overflow { name: String, raw: String },

    #[error("failed to parse file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse file '{path}': {source}")]
    Document {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("flag parse error: {0}")]
    FlagParse(#[from] clap::Error),
}

impl ConfigError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ConfigError::UnsupportedKind { .. } | ConfigError::DuplicateFlag { .. } => {
                ErrorKind::InvalidArgs
            }
            ConfigError::InvalidValue { .. }
            | ConfigError::InvalidJson { .. }
            | ConfigError::ReadFile { .. }
            | ConfigError::Document { .. } => ErrorKind::Parse,
            ConfigError::Overflow { .. } => ErrorKind::Overflow,
            ConfigError::FlagParse(_) => ErrorKind::FlagParse,
        }
    }

    /// Qualified name of the offending field, when the error is tied to one.
    pub fn name(&self) -> Option<&str> {
        match self {
            ConfigError::UnsupportedKind { name, .. }
            | ConfigError::InvalidValue { name, .. }
            | ConfigError::InvalidJson { name, .. }
            | ConfigError::Overflow { name, .. } => Some(name),
            ConfigError::DuplicateFlag { second, .. } => Some(second),
            _ => None,
        }
    }
}
