/// Configuration default values
///
/// This module contains all the default values for configuration options,
/// making them easily changeable in one central location.
// Catalog defaults
pub const DEFAULT_CATALOG_URL: &str = "https://huhu.to/channels";
pub const DEFAULT_CATALOG_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";
pub const DEFAULT_CATALOG_TIMEOUT: &str = "30s";

// Output defaults
pub const DEFAULT_OUTPUT_FILE_NAME: &str = "Vavoo-IPTV.m3u8";
pub const DEFAULT_OUTPUT_DIR_NAME: &str = "Vavoo-IPTV";

// Playlist defaults
pub const DEFAULT_EPG_URLS: &[&str] = &[
    "https://vav00.de/sources/epg/epg_de.xml",
    "https://epgshare01.online/epgshare01/epg_ripper_DE1.xml.gz",
];
pub const DEFAULT_VLC_USER_AGENT: &str = "VAVOO/2.6";
pub const DEFAULT_VLC_REFERRER: &str = "https://vavoo.tv/";
pub const DEFAULT_LOGO_URL: &str = "https://raw.githubusercontent.com/SuperNova-Repo/Vavuu-IPTV/refs/heads/main/VAVOO_%26_OTT-Navigator-icon.jpg";
pub const DEFAULT_COUNTRY: &str = "Unbekannt";

// Name normalizer defaults
pub const DEFAULT_NAME_PLACEHOLDER: &str = "Unbekannter Kanal";
pub const DEFAULT_NAME_EXCEPTIONS: &[&str] = &[
    "BLUETV",
    "SKY BOX",
    "SKY SELECT",
    "123 TV",
    "1.2.3. TV",
    "STERN FILME",
    "GERMANY KONIG FILME",
    "GERMANY BESONDERE",
];
pub const DEFAULT_QUALITY_TOKENS: &[&str] = &["FHD", "HD", "4K"];

// URL resolver defaults
pub const DEFAULT_STREAM_TEMPLATE: &str = "https://huhu.to/play/{id}/index.m3u8";
pub const DEFAULT_PLACEHOLDER_STREAM_URL: &str = "https://example.com/placeholder.m3u8";
pub const DEFAULT_BILD_TV_TOKEN: &str = "BILD TV";
pub const DEFAULT_BILD_TV_STREAM_URL: &str = "https://bild.personalstream.tv/v1/master.m3u8";

// Publish defaults
pub const DEFAULT_FTP_PORT: u16 = 21;
pub const DEFAULT_REMOTE_PATH: &str = "/";
pub const DEFAULT_PUBLISH_TIMEOUT: &str = "30s";
