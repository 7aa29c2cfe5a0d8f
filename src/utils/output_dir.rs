//! Discovery of a writable output directory
//!
//! Used only when no directory is configured. Candidates are tried in order
//! and the first one that can be created and written to wins.

use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::config::defaults::DEFAULT_OUTPUT_DIR_NAME;

const WRITE_PROBE: &str = ".write_test";

/// Whether we are running inside Termux
pub fn is_termux() -> bool {
    Path::new("/data/data/com.termux").exists()
        || std::env::var("PREFIX")
            .map(|prefix| prefix.starts_with("/data/data/com.termux"))
            .unwrap_or(false)
}

/// Whether we are running on Android, inside or outside Termux
pub fn is_android() -> bool {
    Path::new("/system/build.prop").exists()
        || Path::new("/android_root").exists()
        || std::env::var_os("ANDROID_ROOT").is_some()
}

fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .filter(|home| !home.is_empty())
        .map(PathBuf::from)
}

/// Ordered candidate directories for the playlist
pub fn candidate_directories(home: Option<&Path>, android: bool, cwd: &Path) -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    if android {
        candidates.push(PathBuf::from("/storage/emulated/0/Download").join(DEFAULT_OUTPUT_DIR_NAME));
        candidates.push(PathBuf::from("/sdcard/Download").join(DEFAULT_OUTPUT_DIR_NAME));
        if let Some(home) = home {
            candidates.push(home.join("storage/downloads").join(DEFAULT_OUTPUT_DIR_NAME));
        }
    }

    if let Some(home) = home {
        candidates.push(home.join("Downloads").join(DEFAULT_OUTPUT_DIR_NAME));
        candidates.push(home.join("downloads").join(DEFAULT_OUTPUT_DIR_NAME));
    }

    candidates.push(cwd.join(DEFAULT_OUTPUT_DIR_NAME));
    candidates
}

/// Create the directory and check a file can be written into it
pub fn is_writable(dir: &Path) -> bool {
    if let Err(e) = std::fs::create_dir_all(dir) {
        debug!("Cannot create {}: {}", dir.display(), e);
        return false;
    }

    let probe = dir.join(WRITE_PROBE);
    match std::fs::write(&probe, b"test") {
        Ok(()) => {
            if let Err(e) = std::fs::remove_file(&probe) {
                warn!("Could not remove write probe {}: {}", probe.display(), e);
            }
            true
        }
        Err(e) => {
            debug!("Cannot write to {}: {}", dir.display(), e);
            false
        }
    }
}

/// First writable candidate, falling back to the current directory
pub fn discover_output_directory() -> PathBuf {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let android = is_android() || is_termux();

    for candidate in candidate_directories(home_dir().as_deref(), android, &cwd) {
        if is_writable(&candidate) {
            info!("Using output directory: {}", candidate.display());
            return candidate;
        }
    }

    warn!(
        "No writable output directory found, falling back to {}",
        cwd.display()
    );
    cwd
}
