//! Channel catalog sources
//!
//! [`ChannelCatalog`] is the seam the pipeline fetches through;
//! [`HttpCatalog`] is the production implementation and [`StaticCatalog`]
//! serves a fixed list.
//!
//! # Usage
//!
//! ```rust,no_run
//! use vavoo_iptv::config::CatalogConfig;
//! use vavoo_iptv::sources::{ChannelCatalog, HttpCatalog};
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let catalog = HttpCatalog::new(&CatalogConfig::default())?;
//!     let records = catalog.fetch_channels().await?;
//!     println!("Fetched {} records", records.len());
//!     Ok(())
//! }
//! ```

pub mod catalog;
pub mod traits;

pub use catalog::{parse_catalog, HttpCatalog};
pub use traits::*;
