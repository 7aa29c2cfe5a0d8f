use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vavoo_iptv::{
    config::Config,
    pipeline::run_with_interrupt,
    PipelineReport, PlaylistPipeline,
};

#[derive(Parser)]
#[command(name = "vavoo-iptv")]
#[command(version)]
#[command(about = "Builds an M3U8 playlist from the Vavoo channel catalog")]
#[command(long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "vavoo-iptv.toml")]
    config: PathBuf,

    /// Write the default configuration to the config path and exit
    #[arg(long)]
    init_config: bool,

    /// Directory the playlist is written to
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Channel catalog URL
    #[arg(long, value_name = "URL")]
    catalog_url: Option<String>,

    /// FTP server to upload the playlist to
    #[arg(long, value_name = "HOST")]
    ftp_host: Option<String>,

    /// FTP control port
    #[arg(long, value_name = "PORT")]
    ftp_port: Option<u16>,

    /// FTP user name
    #[arg(long, value_name = "USER")]
    ftp_user: Option<String>,

    /// FTP password
    #[arg(long, env = "VAVOO_FTP_PASSWORD", hide_env_values = true)]
    ftp_password: Option<String>,

    /// Remote directory, `/` stays in the login directory
    #[arg(long, value_name = "PATH")]
    ftp_remote_path: Option<String>,

    /// Log level
    #[arg(short = 'v', long, default_value = "info")]
    log_level: String,
}

impl Cli {
    fn apply_overrides(&self, config: &mut Config) {
        if let Some(directory) = &self.output_dir {
            config.output.directory = Some(directory.clone());
        }
        if let Some(url) = &self.catalog_url {
            config.catalog.url = url.clone();
        }
        if let Some(host) = &self.ftp_host {
            config.publish.host = Some(host.clone());
        }
        if let Some(port) = self.ftp_port {
            config.publish.port = port;
        }
        if let Some(user) = &self.ftp_user {
            config.publish.username = Some(user.clone());
        }
        if let Some(password) = &self.ftp_password {
            config.publish.password = Some(password.clone());
        }
        if let Some(remote_path) = &self.ftp_remote_path {
            config.publish.remote_path = remote_path.clone();
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_filter = format!("vavoo_iptv={}", cli.log_level);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting vavoo-iptv v{}", env!("CARGO_PKG_VERSION"));

    if cli.init_config {
        Config::write_default_file(&cli.config)?;
        println!("Default configuration written to {}", cli.config.display());
        return Ok(());
    }

    let mut config = Config::load_from_file(&cli.config)?;
    cli.apply_overrides(&mut config);
    config.validate()?;

    let pipeline = PlaylistPipeline::from_config(&config)?;

    let report = run_with_interrupt(pipeline.run(), tokio::signal::ctrl_c()).await;

    match report {
        Ok(report) => {
            print_summary(&report);
            Ok(())
        }
        Err(e) => {
            error!("Pipeline failed: {}", e);
            Err(e.into())
        }
    }
}

fn print_summary(report: &PipelineReport) {
    println!("Playlist: {}", report.playlist.path.display());
    println!(
        "Channels: {} written, {} skipped, {} in catalog",
        report.playlist.entries_written,
        report.catalog_skipped + report.playlist.entries_skipped,
        report.catalog_size
    );
    println!(
        "Size: {} bytes ({:.1} KB)",
        report.playlist.bytes_written,
        report.playlist.bytes_written as f64 / 1024.0
    );
    match (report.published, &report.upload) {
        (Some(true), Some(upload)) => println!(
            "Uploaded: {} to {} ({} bytes)",
            upload.remote_file, upload.remote_dir, upload.bytes_sent
        ),
        (Some(_), _) => println!("Upload failed, playlist kept locally"),
        (None, _) => {}
    }
}
