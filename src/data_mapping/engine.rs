use serde_json::Value;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::errors::{AppError, AppResult, EntryError};
use crate::models::{NormalizedChannel, Playlist, RawChannel};
use crate::utils::human_format::format_duration;

use super::name_normalizer::NameNormalizer;
use super::url_resolver::UrlResolver;

/// Outcome of mapping a whole catalog
#[derive(Debug, Clone, Default)]
pub struct MappingResult {
    pub playlist: Playlist,
    /// One entry per catalog element that could not be mapped
    pub skipped: Vec<EntryError>,
}

/// Turns raw catalog records into playlist entries
///
/// Every element of the catalog produces exactly one entry, or one
/// [`EntryError`] in [`MappingResult::skipped`].
#[derive(Debug, Clone)]
pub struct DataMappingEngine {
    normalizer: NameNormalizer,
    resolver: UrlResolver,
    default_country: String,
}

impl DataMappingEngine {
    pub fn new(config: &Config) -> AppResult<Self> {
        let normalizer = NameNormalizer::new(&config.normalizer).map_err(|e| {
            AppError::configuration(format!("Invalid normalizer rules: {e}"))
        })?;

        Ok(Self {
            normalizer,
            resolver: UrlResolver::new(&config.resolver),
            default_country: config.playlist.default_country.clone(),
        })
    }

    pub fn map_channel(&self, raw: &RawChannel) -> NormalizedChannel {
        let country = raw
            .country
            .as_deref()
            .filter(|country| !country.trim().is_empty())
            .unwrap_or(&self.default_country)
            .to_string();

        NormalizedChannel {
            display_name: self.normalizer.normalize(raw.name.as_deref()),
            // Raw name on purpose, special cases look at the unnormalized text
            stream_url: self.resolver.resolve(raw.id(), raw.name.as_deref()),
            country,
        }
    }

    pub fn map_catalog(&self, records: &[Value]) -> MappingResult {
        let start = Instant::now();
        let mut result = MappingResult::default();

        for (index, record) in records.iter().enumerate() {
            match RawChannel::from_value(index, record) {
                Ok(raw) => {
                    let channel = self.map_channel(&raw);
                    debug!(
                        "Mapped entry {}: {:?} -> {}",
                        index, raw.name, channel.display_name
                    );
                    result.playlist.channels.push(channel);
                }
                Err(e) => {
                    warn!("Skipping catalog entry: {}", e);
                    result.skipped.push(e);
                }
            }
        }

        info!(
            "Mapped {} catalog entries: mapped={} skipped={} duration={}",
            records.len(),
            result.playlist.len(),
            result.skipped.len(),
            format_duration(start.elapsed().as_millis() as u64)
        );

        result
    }
}
