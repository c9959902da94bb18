//! Error types for rotolog

use std::io;
use std::path::PathBuf;

/// rotolog error type
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Failed to create log folder {path}: {source}")]
    CreateFolder { path: PathBuf, source: io::Error },

    #[error("Failed to read log folder {path}: {source}")]
    ReadFolder { path: PathBuf, source: io::Error },

    #[error("Failed to open log file {path}: {source}")]
    OpenFile { path: PathBuf, source: io::Error },

    #[error("Failed to stat {path}: {source}")]
    Stat { path: PathBuf, source: io::Error },

    #[error("Failed to write to {path}: {source}")]
    Write { path: PathBuf, source: io::Error },

    #[error("Failed to remove {path}: {source}")]
    Remove { path: PathBuf, source: io::Error },

    #[error("Failed to rename {from} to {to}: {source}")]
    Rename {
        from: PathBuf,
        to: PathBuf,
        source: io::Error,
    },

    #[error("Cannot parse a date from file name {name}: {reason}")]
    ParseDate { name: String, reason: String },

    #[error("No log file is open")]
    NoActiveFile,

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("Config file not found: {0}")]
    ConfigNotFound(PathBuf),

    #[error("IO error: {0}")]
    IoError(#[from] io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("YAML parse error: {0}")]
    YamlError(#[from] serde_yaml::Error),
}

/// Result type alias for rotolog
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn invalid<S: Into<String>>(msg: S) -> Self {
        Error::InvalidConfig(msg.into())
    }

    /// Kind of the underlying I/O failure, if there is one
    pub fn io_kind(&self) -> Option<io::ErrorKind> {
        match self {
            Error::CreateFolder { source, .. }
            | Error::ReadFolder { source, .. }
            | Error::OpenFile { source, .. }
            | Error::Stat { source, .. }
            | Error::Write { source, .. }
            | Error::Remove { source, .. }
            | Error::Rename { source, .. }
            | Error::IoError(source) => Some(source.kind()),
            _ => None,
        }
    }
}

impl From<Error> for io::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::IoError(source) => source,
            other => {
                let kind = other.io_kind().unwrap_or(io::ErrorKind::Other);
                io::Error::new(kind, other)
            }
        }
    }
}
