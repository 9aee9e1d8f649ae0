//! Error types for menudispatch.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The host command table could not be reached.
    #[error("Command table unavailable: {0}")]
    CommandTable(String),

    /// A host-side operation against an acquired command table failed.
    #[error("Host error: {0}")]
    Host(String),

    #[error("Lifecycle error: {0}")]
    Lifecycle(#[from] LifecycleError),

    #[error("Not found: {0}")]
    NotFound(String),
}

/// Contract violations in the register/unregister sequence.
///
/// These indicate a bug in the caller, never bad user input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LifecycleError {
    #[error("command '{0}' was already registered")]
    AlreadyRegistered(String),

    #[error("command '{0}' was not registered")]
    NotRegistered(String),

    #[error("command '{0}' was already unregistered")]
    AlreadyUnregistered(String),

    #[error("command '{0}' was unregistered and can no longer run")]
    Unregistered(String),
}
