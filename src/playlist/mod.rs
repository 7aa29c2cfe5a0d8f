//! M3U8 playlist serialization

pub mod generator;

pub use generator::{remove_stale_temp, GenerationReport, PlaylistGenerator, RenderedPlaylist};
