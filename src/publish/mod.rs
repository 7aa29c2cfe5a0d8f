//! Optional FTP upload of the finished playlist
//!
//! A minimal passive-mode client over tokio sockets: login, binary type,
//! best-effort `CWD`, one `STOR`. Every control read and data write is
//! bounded by the configured publish timeout.

pub mod ftp;

pub use ftp::{FtpPublisher, PublishReport, SessionState};
