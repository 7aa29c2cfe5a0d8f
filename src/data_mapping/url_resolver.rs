//! Stream address resolution for catalog channels

use crate::config::ResolverConfig;

/// Placeholder in the stream template that is replaced by the channel id
pub const ID_PLACEHOLDER: &str = "{id}";

/// Resolves a channel to its playable stream address
///
/// Special cases are matched against the raw catalog name, not the
/// normalized one, because normalization may strip the words they look for.
#[derive(Debug, Clone)]
pub struct UrlResolver {
    stream_template: String,
    placeholder_url: String,
    /// (upper-cased token, stream url)
    special_cases: Vec<(String, String)>,
}

impl UrlResolver {
    pub fn new(config: &ResolverConfig) -> Self {
        Self {
            stream_template: config.stream_template.clone(),
            placeholder_url: config.placeholder_url.clone(),
            special_cases: config
                .special_cases
                .iter()
                .filter(|case| !case.token.is_empty())
                .map(|case| (case.token.to_uppercase(), case.stream_url.clone()))
                .collect(),
        }
    }

    /// First match wins: special case, then id template, then placeholder
    pub fn resolve(&self, id: Option<&str>, raw_name: Option<&str>) -> String {
        let upper_name = raw_name.unwrap_or_default().to_uppercase();

        if let Some((_, stream_url)) = self
            .special_cases
            .iter()
            .find(|(token, _)| upper_name.contains(token.as_str()))
        {
            return stream_url.clone();
        }

        match id {
            Some(id) if !id.is_empty() => self.stream_template.replace(ID_PLACEHOLDER, id),
            _ => self.placeholder_url.clone(),
        }
    }

    pub fn placeholder_url(&self) -> &str {
        &self.placeholder_url
    }
}

impl Default for UrlResolver {
    fn default() -> Self {
        Self::new(&ResolverConfig::default())
    }
}
