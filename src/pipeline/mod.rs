//! Fetch, map, write and optionally publish, strictly in that order
//!
//! A fetch failure aborts the run before the output path is touched. A
//! publish failure never invalidates the written playlist; it is reported
//! as `published = Some(false)`.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{error, info, warn};

use crate::config::{Config, OutputConfig};
use crate::data_mapping::DataMappingEngine;
use crate::errors::{AppError, AppResult};
use crate::models::PublishTarget;
use crate::playlist::{remove_stale_temp, GenerationReport, PlaylistGenerator};
use crate::publish::{FtpPublisher, PublishReport};
use crate::sources::{ChannelCatalog, HttpCatalog};
use crate::utils::human_format::format_duration;
use crate::utils::output_dir::discover_output_directory;

/// Summary of one pipeline run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineReport {
    pub playlist: GenerationReport,
    /// Number of elements in the fetched catalog
    pub catalog_size: usize,
    /// Catalog elements that could not be mapped at all
    pub catalog_skipped: usize,
    /// `None` when publishing is not configured
    pub published: Option<bool>,
    pub upload: Option<PublishReport>,
}

pub struct PlaylistPipeline {
    catalog: Box<dyn ChannelCatalog>,
    engine: DataMappingEngine,
    generator: PlaylistGenerator,
    output_path: PathBuf,
    publisher: Option<(FtpPublisher, PublishTarget)>,
}

impl PlaylistPipeline {
    /// Pipeline over an arbitrary catalog, publishing if the config has a target
    pub fn new(
        catalog: Box<dyn ChannelCatalog>,
        config: &Config,
        output_path: PathBuf,
    ) -> AppResult<Self> {
        let publisher = config
            .publish
            .target()?
            .map(|target| (FtpPublisher::new(config.publish.timeout), target));

        Ok(Self {
            catalog,
            engine: DataMappingEngine::new(config)?,
            generator: PlaylistGenerator::new(&config.playlist),
            output_path,
            publisher,
        })
    }

    /// Pipeline over the HTTP catalog, output directory from config or discovery
    pub fn from_config(config: &Config) -> AppResult<Self> {
        let catalog = HttpCatalog::new(&config.catalog)?;
        Self::new(Box::new(catalog), config, resolve_output_path(&config.output))
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    pub fn publishes(&self) -> bool {
        self.publisher.is_some()
    }

    pub async fn run(&self) -> AppResult<PipelineReport> {
        let started = Instant::now();
        info!(
            "Starting playlist pipeline: catalog={} output={}",
            self.catalog.describe(),
            self.output_path.display()
        );
        remove_stale_temp(&self.output_path).await;

        let records = self.catalog.fetch_channels().await?;
        let mapping = self.engine.map_catalog(&records);
        let playlist = self.generator.write(&mapping.playlist, &self.output_path).await?;

        let (published, upload) = match &self.publisher {
            None => (None, None),
            Some((publisher, target)) => match publisher.publish(&playlist.path, target).await {
                Ok(report) => (Some(true), Some(report)),
                Err(e) => {
                    error!("FTP upload failed, playlist kept locally: {}", e);
                    (Some(false), None)
                }
            },
        };

        info!(
            "Pipeline completed: catalog={} written={} skipped={} published={:?} duration={}",
            records.len(),
            playlist.entries_written,
            mapping.skipped.len() + playlist.entries_skipped,
            published,
            format_duration(started.elapsed().as_millis() as u64)
        );

        Ok(PipelineReport {
            catalog_size: records.len(),
            catalog_skipped: mapping.skipped.len(),
            playlist,
            published,
            upload,
        })
    }
}

/// Race a run against an interrupt signal such as `tokio::signal::ctrl_c()`
///
/// If the signal handler cannot be installed the run continues uninterrupted.
pub async fn run_with_interrupt<R, S>(run: R, interrupt: S) -> AppResult<PipelineReport>
where
    R: Future<Output = AppResult<PipelineReport>>,
    S: Future<Output = std::io::Result<()>>,
{
    tokio::pin!(run);
    tokio::select! {
        result = &mut run => result,
        signal = interrupt => match signal {
            Ok(()) => Err(AppError::Interrupted),
            Err(e) => {
                warn!("Could not listen for Ctrl-C, continuing without it: {}", e);
                run.await
            }
        },
    }
}

/// Configured directory or the first writable default, plus the file name
pub fn resolve_output_path(output: &OutputConfig) -> PathBuf {
    let directory = output
        .directory
        .clone()
        .unwrap_or_else(discover_output_directory);
    directory.join(&output.file_name)
}
