//! Utility functions for vavoo-iptv
//!
//! - `human_format` for log-friendly sizes and durations
//! - `output_dir` for finding a writable playlist directory

pub mod human_format;
pub mod output_dir;
