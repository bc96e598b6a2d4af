//! Core error types for switchnag-core.
//!
//! Errors are grouped per concern with thiserror. Only configuration and
//! privilege errors are fatal; network and notification failures are
//! logged by the loops and never roll back cooldown state.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for switchnag-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Network interface toggle errors
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    /// Notification surface errors
    #[error("Notification error: {0}")]
    Notify(#[from] NotifyError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Privilege elevation errors
    #[error("Privilege error: {0}")]
    Privilege(#[from] PrivilegeError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown dot-separated key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

/// Errors raised while toggling the network interface.
#[derive(Error, Debug)]
pub enum NetworkError {
    /// The toggle command ran but reported failure
    #[error("Setting '{interface}' admin={} failed ({status})", admin_word(.enabled))]
    CommandFailed {
        interface: String,
        enabled: bool,
        status: String,
    },

    /// The toggle command could not be started at all
    #[error("Failed to run '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

/// Notification surface errors.
#[derive(Error, Debug)]
pub enum NotifyError {
    /// The platform refused to show the notification
    #[error("Failed to show notification: {0}")]
    ShowFailed(String),
}

/// Privilege elevation errors.
#[derive(Error, Debug)]
pub enum PrivilegeError {
    /// Relaunching with administrator rights failed
    #[error("Failed to relaunch with administrator privileges: {0}")]
    RelaunchFailed(String),
}

/// Validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

fn admin_word(enabled: &bool) -> &'static str {
    if *enabled {
        "enable"
    } else {
        "disable"
    }
}
