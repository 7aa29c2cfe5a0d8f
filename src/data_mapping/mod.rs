//! Catalog record to playlist entry mapping
//!
//! - [`name_normalizer`] cleans display names
//! - [`url_resolver`] picks the stream address
//! - [`engine`] applies both to every catalog record

pub mod engine;
pub mod name_normalizer;
pub mod url_resolver;

pub use engine::{DataMappingEngine, MappingResult};
pub use name_normalizer::NameNormalizer;
pub use url_resolver::UrlResolver;
