//! Centralized error handling for vavoo-iptv
//!
//! Every pipeline stage has its own error enum; [`AppError`] unifies them at
//! the top level so `main` can report one human-readable failure.
//!
//! # Error Categories
//!
//! - **Source Errors**: catalog fetch failures (network, HTTP status, body format)
//! - **Entry Errors**: a single catalog record that cannot be turned into a playlist entry
//! - **Playlist Errors**: directory creation and file writes
//! - **Publish Errors**: any FTP failure while uploading the playlist
//!
//! # Usage
//!
//! ```rust
//! use vavoo_iptv::errors::{AppResult, SourceError};
//!
//! fn example_function() -> AppResult<()> {
//!     Err(SourceError::format("top-level JSON value is not an array").into())
//! }
//! ```

pub mod types;

pub use types::*;

/// Convenience type alias for Results using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Convenience type alias for catalog fetch Results
pub type SourceResult<T> = Result<T, SourceError>;

/// Convenience type alias for playlist generation Results
pub type PlaylistResult<T> = Result<T, PlaylistError>;

/// Convenience type alias for FTP publish Results
pub type PublishResult<T> = Result<T, PublishError>;
