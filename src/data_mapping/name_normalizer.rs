//! Channel display name normalization
//!
//! Catalog names carry quality tags (`HD`, `FHD`, `4K`), language/quality
//! markers (`|E`, `|H`, `|D`) and trailing channel numbers. The normalizer
//! turns them into the plain display name shown in the player.
//!
//! Rules are applied in a fixed order:
//!
//! 1. Empty input becomes the placeholder.
//! 2. Names on the exception list only lose their markers.
//! 3. All other names lose quality tokens and markers, then keep only the
//!    leading run of ASCII letter words.
//! 4. An empty result becomes the placeholder.

use regex::Regex;

use crate::config::NormalizerConfig;

/// `|E`, `|H`, `|D` with any surrounding whitespace
const MARKER_PATTERN: &str = r"\s*\|[EHD]\s*";

/// Letter words separated by whitespace, anchored at the start
const LEADING_RUN_PATTERN: &str = r"^[A-Za-z]+(?:\s+[A-Za-z]+)*";

/// Rule-based channel name normalizer
#[derive(Debug, Clone)]
pub struct NameNormalizer {
    placeholder: String,
    /// Upper-cased exception names
    exceptions: Vec<String>,
    quality_regex: Option<Regex>,
    marker_regex: Regex,
    leading_run_regex: Regex,
}

impl NameNormalizer {
    pub fn new(config: &NormalizerConfig) -> Result<Self, regex::Error> {
        let mut tokens: Vec<String> = config
            .quality_tokens
            .iter()
            .map(|token| token.trim())
            .filter(|token| !token.is_empty())
            .map(regex::escape)
            .collect();
        // Longest first so FHD wins over HD
        tokens.sort_by_key(|token| std::cmp::Reverse(token.len()));

        let quality_regex = if tokens.is_empty() {
            None
        } else {
            Some(Regex::new(&format!(r"(?i)\s*\b(?:{})\b\s*", tokens.join("|")))?)
        };

        Ok(Self {
            placeholder: config.placeholder.clone(),
            exceptions: config
                .exceptions
                .iter()
                .filter(|exception| !exception.is_empty())
                .map(|exception| exception.to_uppercase())
                .collect(),
            quality_regex,
            marker_regex: Regex::new(MARKER_PATTERN)?,
            leading_run_regex: Regex::new(LEADING_RUN_PATTERN)?,
        })
    }

    /// Create with the built-in rules
    pub fn with_default_config() -> Result<Self, regex::Error> {
        Self::new(&NormalizerConfig::default())
    }

    /// Map a raw catalog name to its display name, never empty
    pub fn normalize(&self, raw_name: Option<&str>) -> String {
        let name = match raw_name {
            Some(name) if !name.is_empty() => name,
            _ => return self.placeholder.clone(),
        };

        let normalized = if self.is_exception(name) {
            let stripped = self.marker_regex.replace_all(name, " ");
            collapse_whitespace(&stripped)
        } else {
            self.standard_cleanup(name)
        };

        if normalized.is_empty() {
            self.placeholder.clone()
        } else {
            normalized
        }
    }

    /// Whether the name contains one of the exception names, ignoring case
    pub fn is_exception(&self, name: &str) -> bool {
        let upper = name.to_uppercase();
        self.exceptions
            .iter()
            .any(|exception| upper.contains(exception.as_str()))
    }

    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }

    fn standard_cleanup(&self, name: &str) -> String {
        let without_quality = match &self.quality_regex {
            Some(regex) => regex.replace_all(name, " "),
            None => name.into(),
        };
        let without_markers = self.marker_regex.replace_all(&without_quality, " ");

        // Anything after the first character that is neither a letter nor
        // whitespace is dropped, so are names that don't start with a letter
        let leading_run = self
            .leading_run_regex
            .find(without_markers.trim_start())
            .map(|m| m.as_str())
            .unwrap_or_default();

        collapse_whitespace(leading_run)
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<&str>>().join(" ")
}
