use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

pub mod defaults;
pub mod duration_serde;

use crate::errors::{AppError, AppResult};
use crate::models::PublishTarget;
use defaults::*;
use duration_serde::parse_default;

/// Prefix for environment overrides, e.g. `VAVOO_PUBLISH__HOST`
pub const ENV_PREFIX: &str = "VAVOO_";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub playlist: PlaylistConfig,
    #[serde(default)]
    pub normalizer: NormalizerConfig,
    #[serde(default)]
    pub resolver: ResolverConfig,
    #[serde(default)]
    pub publish: PublishConfig,
}

/// Where the channel catalog comes from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    #[serde(default = "default_catalog_url")]
    pub url: String,
    /// Browser-like identification sent with the catalog request
    #[serde(default = "default_catalog_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_catalog_timeout", with = "duration_serde::duration")]
    pub timeout: Duration,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Output directory; discovered at startup when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directory: Option<PathBuf>,
    #[serde(default = "default_output_file_name")]
    pub file_name: String,
}

/// Fixed lines and attributes written into every playlist
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistConfig {
    /// EPG sources announced in the header line
    #[serde(default = "default_epg_urls")]
    pub epg_urls: Vec<String>,
    #[serde(default = "default_vlc_user_agent")]
    pub vlc_user_agent: String,
    #[serde(default = "default_vlc_referrer")]
    pub vlc_referrer: String,
    #[serde(default = "default_logo_url")]
    pub logo_url: String,
    /// group-title used when a record has no country
    #[serde(default = "default_country")]
    pub default_country: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizerConfig {
    #[serde(default = "default_name_placeholder")]
    pub placeholder: String,
    /// Names matching one of these (case-insensitive substring) only lose their |E/|H/|D markers
    #[serde(default = "default_name_exceptions")]
    pub exceptions: Vec<String>,
    /// Quality tokens stripped from all other names
    #[serde(default = "default_quality_tokens")]
    pub quality_tokens: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Stream address template, `{id}` is replaced by the channel id
    #[serde(default = "default_stream_template")]
    pub stream_template: String,
    #[serde(default = "default_placeholder_stream_url")]
    pub placeholder_url: String,
    /// Checked against the raw name before the id template is used
    #[serde(default = "default_special_cases")]
    pub special_cases: Vec<SpecialCase>,
}

/// A channel that always resolves to a dedicated stream address
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecialCase {
    /// Case-insensitive substring of the raw channel name
    pub token: String,
    pub stream_url: String,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct PublishConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(default = "default_ftp_port")]
    pub port: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default = "default_remote_path")]
    pub remote_path: String,
    /// Bounds the connect and every control/data exchange
    #[serde(default = "default_publish_timeout", with = "duration_serde::duration")]
    pub timeout: Duration,
}

// Catalog defaults
fn default_catalog_url() -> String {
    DEFAULT_CATALOG_URL.to_string()
}

fn default_catalog_user_agent() -> String {
    DEFAULT_CATALOG_USER_AGENT.to_string()
}

fn default_catalog_timeout() -> Duration {
    parse_default(DEFAULT_CATALOG_TIMEOUT)
}

// Output defaults
fn default_output_file_name() -> String {
    DEFAULT_OUTPUT_FILE_NAME.to_string()
}

// Playlist defaults
fn default_epg_urls() -> Vec<String> {
    DEFAULT_EPG_URLS.iter().map(|s| s.to_string()).collect()
}

fn default_vlc_user_agent() -> String {
    DEFAULT_VLC_USER_AGENT.to_string()
}

fn default_vlc_referrer() -> String {
    DEFAULT_VLC_REFERRER.to_string()
}

fn default_logo_url() -> String {
    DEFAULT_LOGO_URL.to_string()
}

fn default_country() -> String {
    DEFAULT_COUNTRY.to_string()
}

// Normalizer defaults
fn default_name_placeholder() -> String {
    DEFAULT_NAME_PLACEHOLDER.to_string()
}

fn default_name_exceptions() -> Vec<String> {
    DEFAULT_NAME_EXCEPTIONS.iter().map(|s| s.to_string()).collect()
}

fn default_quality_tokens() -> Vec<String> {
    DEFAULT_QUALITY_TOKENS.iter().map(|s| s.to_string()).collect()
}

// Resolver defaults
fn default_stream_template() -> String {
    DEFAULT_STREAM_TEMPLATE.to_string()
}

fn default_placeholder_stream_url() -> String {
    DEFAULT_PLACEHOLDER_STREAM_URL.to_string()
}

fn default_special_cases() -> Vec<SpecialCase> {
    vec![SpecialCase {
        token: DEFAULT_BILD_TV_TOKEN.to_string(),
        stream_url: DEFAULT_BILD_TV_STREAM_URL.to_string(),
    }]
}

// Publish defaults
fn default_ftp_port() -> u16 {
    DEFAULT_FTP_PORT
}

fn default_remote_path() -> String {
    DEFAULT_REMOTE_PATH.to_string()
}

fn default_publish_timeout() -> Duration {
    parse_default(DEFAULT_PUBLISH_TIMEOUT)
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            url: default_catalog_url(),
            user_agent: default_catalog_user_agent(),
            timeout: default_catalog_timeout(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: None,
            file_name: default_output_file_name(),
        }
    }
}

impl Default for PlaylistConfig {
    fn default() -> Self {
        Self {
            epg_urls: default_epg_urls(),
            vlc_user_agent: default_vlc_user_agent(),
            vlc_referrer: default_vlc_referrer(),
            logo_url: default_logo_url(),
            default_country: default_country(),
        }
    }
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            placeholder: default_name_placeholder(),
            exceptions: default_name_exceptions(),
            quality_tokens: default_quality_tokens(),
        }
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            stream_template: default_stream_template(),
            placeholder_url: default_placeholder_stream_url(),
            special_cases: default_special_cases(),
        }
    }
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            host: None,
            port: default_ftp_port(),
            username: None,
            password: None,
            remote_path: default_remote_path(),
            timeout: default_publish_timeout(),
        }
    }
}

impl std::fmt::Debug for PublishConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PublishConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "********"))
            .field("remote_path", &self.remote_path)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl PublishConfig {
    /// Build the publish target, `None` when publishing is not configured at all
    pub fn target(&self) -> AppResult<Option<PublishTarget>> {
        match (&self.host, &self.username, &self.password) {
            (None, None, None) => Ok(None),
            (Some(host), Some(username), Some(password))
                if !host.trim().is_empty() && !username.is_empty() && !password.is_empty() =>
            {
                Ok(Some(PublishTarget {
                    host: host.trim().to_string(),
                    port: self.port,
                    username: username.clone(),
                    secret: password.clone(),
                    remote_path: self.remote_path.clone(),
                }))
            }
            _ => {
                let missing: Vec<&str> = [
                    ("host", self.host.as_deref()),
                    ("username", self.username.as_deref()),
                    ("password", self.password.as_deref()),
                ]
                .into_iter()
                .filter(|(_, value)| value.map_or(true, |v| v.trim().is_empty()))
                .map(|(name, _)| name)
                .collect();
                Err(AppError::configuration(format!(
                    "FTP publishing is partially configured, missing: {}",
                    missing.join(", ")
                )))
            }
        }
    }
}

impl Config {
    /// Load configuration: defaults, then the TOML file (if it exists), then `VAVOO_*` env vars
    pub fn load_from_file<P: AsRef<Path>>(config_file: P) -> AppResult<Self> {
        let config_file = config_file.as_ref();
        let mut figment = Figment::from(Serialized::defaults(Config::default()));

        if config_file.exists() {
            figment = figment.merge(Toml::file(config_file));
            info!("Configuration loaded from: {}", config_file.display());
        } else {
            info!(
                "No config file at {}, using defaults",
                config_file.display()
            );
        }

        let config: Config = figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .map_err(|e| AppError::configuration(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a TOML string on top of the defaults
    pub fn from_toml_str(contents: &str) -> AppResult<Self> {
        let config: Config = Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::string(contents))
            .extract()
            .map_err(|e| AppError::configuration(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Write the default configuration as TOML
    pub fn write_default_file<P: AsRef<Path>>(config_file: P) -> AppResult<()> {
        let config_file = config_file.as_ref();
        let contents = toml::to_string_pretty(&Self::default())
            .map_err(|e| AppError::configuration(e.to_string()))?;
        std::fs::write(config_file, contents).map_err(|e| {
            AppError::configuration(format!(
                "Could not write {}: {}",
                config_file.display(),
                e
            ))
        })?;
        info!("Created default config file: {}", config_file.display());
        Ok(())
    }

    pub fn validate(&self) -> AppResult<()> {
        let catalog_url = url::Url::parse(&self.catalog.url).map_err(|e| {
            AppError::configuration(format!("Invalid catalog URL '{}': {}", self.catalog.url, e))
        })?;
        if !matches!(catalog_url.scheme(), "http" | "https") {
            return Err(AppError::configuration(format!(
                "Catalog URL must use HTTP or HTTPS: {}",
                self.catalog.url
            )));
        }

        if !self.resolver.stream_template.contains("{id}") {
            return Err(AppError::configuration(
                "resolver.stream_template must contain an {id} placeholder",
            ));
        }

        let file_name = self.output.file_name.trim();
        if file_name.is_empty() || file_name.contains(['/', '\\']) {
            return Err(AppError::configuration(format!(
                "output.file_name must be a plain file name: '{}'",
                self.output.file_name
            )));
        }

        if self.publish.port == 0 {
            return Err(AppError::configuration("publish.port must not be 0"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.catalog.url, "https://huhu.to/channels");
        assert_eq!(config.catalog.timeout, Duration::from_secs(30));
        assert_eq!(config.output.file_name, "Vavoo-IPTV.m3u8");
        assert_eq!(config.publish.port, 21);
        assert_eq!(config.normalizer.exceptions.len(), 8);
        assert_eq!(config.resolver.special_cases.len(), 1);
    }

    #[test]
    fn test_partial_toml_keeps_other_defaults() {
        let config = Config::from_toml_str(
            r#"
            [catalog]
            timeout = "5s"

            [publish]
            host = "ftp.example.com"
            port = 2121
            "#,
        )
        .unwrap();

        assert_eq!(config.catalog.timeout, Duration::from_secs(5));
        assert_eq!(config.catalog.url, DEFAULT_CATALOG_URL);
        assert_eq!(config.publish.host.as_deref(), Some("ftp.example.com"));
        assert_eq!(config.publish.port, 2121);
        assert_eq!(config.publish.remote_path, "/");
        assert_eq!(config.playlist.default_country, "Unbekannt");
    }

    #[test]
    fn test_invalid_template_is_rejected() {
        let result = Config::from_toml_str(
            r#"
            [resolver]
            stream_template = "https://huhu.to/play/index.m3u8"
            "#,
        );
        assert!(matches!(result, Err(AppError::Configuration { .. })));
    }

    #[test]
    fn test_non_http_catalog_is_rejected() {
        let result = Config::from_toml_str(
            r#"
            [catalog]
            url = "ftp://huhu.to/channels"
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_publish_target_absent_when_unconfigured() {
        assert!(PublishConfig::default().target().unwrap().is_none());
    }

    #[test]
    fn test_publish_target_complete() {
        let publish = PublishConfig {
            host: Some(" ftp.example.com ".to_string()),
            username: Some("user".to_string()),
            password: Some("secret".to_string()),
            remote_path: "/htdocs".to_string(),
            ..PublishConfig::default()
        };
        let target = publish.target().unwrap().unwrap();
        assert_eq!(target.host, "ftp.example.com");
        assert_eq!(target.port, 21);
        assert_eq!(target.remote_path, "/htdocs");
    }

    #[test]
    fn test_publish_target_partial_is_error() {
        let publish = PublishConfig {
            host: Some("ftp.example.com".to_string()),
            ..PublishConfig::default()
        };
        let err = publish.target().unwrap_err();
        let message = err.to_string();
        assert!(message.contains("username"));
        assert!(message.contains("password"));
        assert!(!message.contains("host,"));
    }

    #[test]
    fn test_debug_masks_password() {
        let publish = PublishConfig {
            password: Some("hunter2".to_string()),
            ..PublishConfig::default()
        };
        assert!(!format!("{publish:?}").contains("hunter2"));
    }

    #[test]
    fn test_write_default_file_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vavoo-iptv.toml");
        Config::write_default_file(&path).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let config = Config::from_toml_str(&contents).unwrap();
        assert_eq!(config.catalog.timeout, Duration::from_secs(30));
        assert_eq!(config.resolver.special_cases, default_special_cases());
    }
}
