//! Error type definitions for vavoo-iptv
//!
//! Stage failures that invalidate a whole run (fetch, write) propagate as
//! [`AppError`]; [`EntryError`] only ever describes one skipped catalog
//! record and is absorbed by the stage that produced it.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Catalog fetch errors
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    /// Playlist generation errors
    #[error("Playlist error: {0}")]
    Playlist(#[from] PlaylistError),

    /// FTP publish errors
    #[error("Publish error: {0}")]
    Publish(#[from] PublishError),

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// The run was interrupted before it finished
    #[error("Interrupted by user")]
    Interrupted,
}

/// Catalog fetch errors
#[derive(Error, Debug)]
pub enum SourceError {
    /// Connection could not be established or the transfer broke off
    #[error("Network error: {url} - {message}")]
    Network { url: String, message: String },

    /// The request did not finish within the configured timeout
    #[error("Connection timeout: {url}")]
    Timeout { url: String },

    /// Non-2xx HTTP status
    #[error("HTTP error: {status} - {url}")]
    Http { status: u16, url: String },

    /// The body is not JSON or not a JSON array
    #[error("Format error: {message}")]
    Format { message: String },
}

/// A single catalog record that was skipped
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EntryError {
    /// The catalog element is not a JSON object
    #[error("entry {index} is a JSON {kind}, expected an object")]
    NotAnObject { index: usize, kind: &'static str },

    /// A field was empty when the entry reached the renderer
    #[error("entry {index} has an empty {field}")]
    EmptyField { index: usize, field: &'static str },

    /// A field contains a line break or other control character
    #[error("entry {index} has a control character in its {field}")]
    ControlCharacter { index: usize, field: &'static str },
}

/// Playlist generation errors
#[derive(Error, Debug)]
pub enum PlaylistError {
    /// Directory creation or file write failed
    #[error("Filesystem error at {}: {source}", .path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// FTP publish errors
#[derive(Error, Debug)]
pub enum PublishError {
    /// Host name could not be resolved, even after stripping a scheme prefix
    #[error("Could not resolve FTP host {host}: {message}")]
    Resolve { host: String, message: String },

    /// TCP connection could not be established
    #[error("Could not connect to {address}: {message}")]
    Connect { address: String, message: String },

    /// A protocol step did not finish within the configured timeout
    #[error("FTP timeout during {stage}")]
    Timeout { stage: &'static str },

    /// The server answered a command with an unexpected reply
    #[error("FTP server rejected {command}: {code} {message}")]
    Rejected {
        command: String,
        code: u16,
        message: String,
    },

    /// The server sent something that is not a valid FTP reply
    #[error("FTP protocol error: {message}")]
    Protocol { message: String },

    /// The local playlist could not be read
    #[error("Could not read {}: {source}", .path.display())]
    LocalFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Socket I/O failed mid-session
    #[error("FTP I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}

impl SourceError {
    /// Create a network error
    pub fn network<U: Into<String>, M: Into<String>>(url: U, message: M) -> Self {
        Self::Network {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Create a timeout error
    pub fn timeout<U: Into<String>>(url: U) -> Self {
        Self::Timeout { url: url.into() }
    }

    /// Create a format error
    pub fn format<M: Into<String>>(message: M) -> Self {
        Self::Format {
            message: message.into(),
        }
    }

    /// Whether this is one of the network-class failures
    pub fn is_network(&self) -> bool {
        matches!(
            self,
            Self::Network { .. } | Self::Timeout { .. } | Self::Http { .. }
        )
    }

    /// Whether the body could not be parsed as the expected schema
    pub fn is_format(&self) -> bool {
        matches!(self, Self::Format { .. })
    }
}

impl PlaylistError {
    /// Create a filesystem error for the given path
    pub fn filesystem<P: Into<PathBuf>>(path: P, source: std::io::Error) -> Self {
        Self::Filesystem {
            path: path.into(),
            source,
        }
    }
}

impl PublishError {
    /// Create a rejected-command error
    pub fn rejected<C: Into<String>, M: Into<String>>(command: C, code: u16, message: M) -> Self {
        Self::Rejected {
            command: command.into(),
            code,
            message: message.into(),
        }
    }

    /// Create a protocol error
    pub fn protocol<M: Into<String>>(message: M) -> Self {
        Self::Protocol {
            message: message.into(),
        }
    }
}
