//! vavoo-iptv: builds an M3U8 playlist from the Vavoo channel catalog
//!
//! The catalog is fetched as JSON, every record is mapped to a cleaned-up
//! display name and a stream address, the playlist is written to disk and,
//! when configured, uploaded to an FTP server.

pub mod config;
pub mod data_mapping;
pub mod errors;
pub mod models;
pub mod pipeline;
pub mod playlist;
pub mod publish;
pub mod sources;
pub mod utils;

pub use errors::{AppError, AppResult};
pub use pipeline::{PipelineReport, PlaylistPipeline};
