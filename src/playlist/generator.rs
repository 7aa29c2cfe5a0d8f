use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::config::PlaylistConfig;
use crate::errors::{EntryError, PlaylistError, PlaylistResult};
use crate::models::{NormalizedChannel, Playlist};
use crate::utils::human_format::{format_duration, format_size};

/// Outcome of writing a playlist file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationReport {
    /// Absolute path of the written file
    pub path: PathBuf,
    pub entries_written: usize,
    pub entries_skipped: usize,
    pub bytes_written: u64,
}

/// A fully rendered document, not yet on disk
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedPlaylist {
    pub content: String,
    pub entries_written: usize,
    pub skipped: Vec<EntryError>,
}

/// Serializes a [`Playlist`] into the extended M3U8 dialect VLC and
/// OTT-Navigator understand
#[derive(Debug, Clone)]
pub struct PlaylistGenerator {
    header: String,
    vlc_options: String,
    logo_url: String,
}

impl PlaylistGenerator {
    pub fn new(config: &PlaylistConfig) -> Self {
        let header = format!("#EXTM3U8 x-url-tvg={}\n", config.epg_urls.join(","));
        let vlc_options = format!(
            "#EXTVLCOPT:http-user-agent={}\n#EXTVLCOPT:http-referrer={}\n",
            config.vlc_user_agent, config.vlc_referrer
        );

        Self {
            header,
            vlc_options,
            logo_url: config.logo_url.clone(),
        }
    }

    /// Render the header and one four-line block per entry
    pub fn render(&self, playlist: &Playlist) -> RenderedPlaylist {
        let mut content = String::with_capacity(self.header.len() + playlist.len() * 256);
        content.push_str(&self.header);

        let mut entries_written = 0;
        let mut skipped = Vec::new();

        for (index, channel) in playlist.channels.iter().enumerate() {
            if let Err(e) = check_entry(index, channel) {
                warn!("Skipping playlist entry: {}", e);
                skipped.push(e);
                continue;
            }

            content.push_str(&self.vlc_options);
            content.push_str(&format!(
                "#EXTINF:-1 group-title=\"{}\" tvg-logo=\"{}\" tvg-name=\"{}\", {}\n",
                channel.country, self.logo_url, channel.display_name, channel.display_name
            ));
            content.push_str(&channel.stream_url);
            content.push('\n');
            entries_written += 1;
        }

        RenderedPlaylist {
            content,
            entries_written,
            skipped,
        }
    }

    /// Render and write the playlist to `path`
    ///
    /// The document goes to a sibling `.tmp` file first and is renamed over
    /// `path` once complete, so `path` is either the old file or the new one.
    pub async fn write(&self, playlist: &Playlist, path: &Path) -> PlaylistResult<GenerationReport> {
        let started = Instant::now();
        let rendered = self.render(playlist);

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| PlaylistError::filesystem(parent, e))?;
        }

        let temp_path = temp_path_for(path)?;
        debug!("Writing playlist to temporary file {}", temp_path.display());

        if let Err(e) = tokio::fs::write(&temp_path, rendered.content.as_bytes()).await {
            discard_temp(&temp_path).await;
            return Err(PlaylistError::filesystem(&temp_path, e));
        }
        if let Err(e) = tokio::fs::rename(&temp_path, path).await {
            discard_temp(&temp_path).await;
            return Err(PlaylistError::filesystem(path, e));
        }

        let absolute = tokio::fs::canonicalize(path)
            .await
            .map_err(|e| PlaylistError::filesystem(path, e))?;
        let bytes_written = rendered.content.len() as u64;

        info!(
            "Playlist written: path={} entries={} skipped={} size={} duration={}",
            absolute.display(),
            rendered.entries_written,
            rendered.skipped.len(),
            format_size(bytes_written),
            format_duration(started.elapsed().as_millis() as u64)
        );

        Ok(GenerationReport {
            path: absolute,
            entries_written: rendered.entries_written,
            entries_skipped: rendered.skipped.len(),
            bytes_written,
        })
    }
}

/// Every field must be non-empty and free of control characters, otherwise
/// the entry would not be exactly four lines
fn check_entry(index: usize, channel: &NormalizedChannel) -> Result<(), EntryError> {
    let fields = [
        ("display_name", &channel.display_name),
        ("stream_url", &channel.stream_url),
        ("country", &channel.country),
    ];

    for (field, value) in fields {
        if value.is_empty() {
            return Err(EntryError::EmptyField { index, field });
        }
        if value.chars().any(char::is_control) {
            return Err(EntryError::ControlCharacter { index, field });
        }
    }
    Ok(())
}

/// Remove a `.tmp` sibling left behind by an interrupted run
pub async fn remove_stale_temp(path: &Path) -> bool {
    let Ok(temp_path) = temp_path_for(path) else {
        return false;
    };
    match tokio::fs::remove_file(&temp_path).await {
        Ok(()) => {
            info!("Removed stale temporary file {}", temp_path.display());
            true
        }
        Err(e) => {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!("Could not remove {}: {}", temp_path.display(), e);
            }
            false
        }
    }
}

fn temp_path_for(path: &Path) -> PlaylistResult<PathBuf> {
    let file_name = path.file_name().ok_or_else(|| {
        PlaylistError::filesystem(
            path,
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "path has no file name"),
        )
    })?;

    let mut temp_name = OsString::from(file_name);
    temp_name.push(".tmp");
    Ok(path.with_file_name(temp_name))
}

async fn discard_temp(temp_path: &Path) {
    if let Err(e) = tokio::fs::remove_file(temp_path).await {
        debug!("Could not remove {}: {}", temp_path.display(), e);
    }
}
