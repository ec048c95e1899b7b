use std::io;

use thiserror::Error;

/// A single collector call failed. The store keeps the previous value for
/// that domain; the caller decides whether to log, retry, or ignore.
#[derive(Error, Debug)]
pub enum CollectError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("OS query failed: {0}")]
    OsQuery(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("not supported on this platform: {0}")]
    Unsupported(&'static str),
}

/// A control action (terminate / service control) did not take effect.
/// "Already in the requested state" is success, not an error.
#[derive(Error, Debug)]
pub enum ControlError {
    #[error("service '{0}' not found")]
    ServiceNotFound(String),

    #[error("service control request failed for '{name}': {reason}")]
    ServiceControl { name: String, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Startup failed: one of the collectors could not acquire its resources.
/// Collectors initialized before the failing one have been cleaned up.
#[derive(Error, Debug)]
#[error("failed to initialize {domain} collector: {source}")]
pub struct InitError {
    pub domain: crate::system::Domain,
    #[source]
    pub source: CollectError,
}
