//! Error types for DonnyDB
//!
//! Provides a unified error type for all client operations.

use std::time::Duration;

use thiserror::Error;

use crate::network::ConnectionState;

/// Result type alias using DonnyError
pub type Result<T> = std::result::Result<T, DonnyError>;

/// Unified error type for DonnyDB client operations
#[derive(Debug, Error)]
pub enum DonnyError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Connection Errors
    // -------------------------------------------------------------------------
    #[error("Connection error: could not connect to {addr}: {source}")]
    Connection {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Connection closed by peer while reading a response")]
    ConnectionClosed,

    #[error("Timed out after {0:?} waiting for a response")]
    Timeout(Duration),

    // -------------------------------------------------------------------------
    // Protocol Errors
    // -------------------------------------------------------------------------
    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    // -------------------------------------------------------------------------
    // Lifecycle Errors
    // -------------------------------------------------------------------------
    /// Operation invoked outside the `Active` state. This is a caller bug,
    /// not a transient condition: retrying will not help.
    #[error("Connection is {0}; operation requires an active connection")]
    InvalidState(ConnectionState),

    #[error("Connection desynchronized by an earlier failed write or read; close and reconnect")]
    Desynchronized,

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl DonnyError {
    /// True if the error was caused by a read missing its deadline
    pub fn is_timeout(&self) -> bool {
        matches!(self, DonnyError::Timeout(_))
    }
}
