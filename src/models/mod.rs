use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::EntryError;

/// A channel record as received from the catalog
///
/// Every field is optional: the catalog omits fields, sends `null`, and has
/// been seen sending numeric ids. Wrong-typed values become `None` instead of
/// failing the record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawChannel {
    pub id: Option<String>,
    pub name: Option<String>,
    pub country: Option<String>,
}

impl RawChannel {
    pub fn new(id: Option<&str>, name: Option<&str>, country: Option<&str>) -> Self {
        Self {
            id: id.map(str::to_string),
            name: name.map(str::to_string),
            country: country.map(str::to_string),
        }
    }

    /// Convert one catalog element, `index` is its position in the catalog
    pub fn from_value(index: usize, value: &Value) -> Result<Self, EntryError> {
        let object = value.as_object().ok_or(EntryError::NotAnObject {
            index,
            kind: json_kind(value),
        })?;

        let id = match object.get("id") {
            Some(Value::String(id)) => Some(id.clone()),
            Some(Value::Number(id)) => Some(id.to_string()),
            _ => None,
        };

        let text = |key: &str| object.get(key).and_then(Value::as_str).map(str::to_string);

        Ok(Self {
            id,
            name: text("name"),
            country: text("country"),
        })
    }

    /// The id, if present and non-empty
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.is_empty())
    }
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// A playlist entry; all three fields are non-empty
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedChannel {
    pub display_name: String,
    pub stream_url: String,
    pub country: String,
}

/// Entries in catalog order, duplicates kept
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Playlist {
    pub channels: Vec<NormalizedChannel>,
}

impl Playlist {
    pub fn new(channels: Vec<NormalizedChannel>) -> Self {
        Self { channels }
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}

/// FTP server the finished playlist is uploaded to
#[derive(Clone, PartialEq, Eq)]
pub struct PublishTarget {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub secret: String,
    /// `/` means stay in the login directory
    pub remote_path: String,
}

impl PublishTarget {
    /// Whether a CWD is needed before the upload
    pub fn needs_cwd(&self) -> bool {
        let path = self.remote_path.trim();
        !path.is_empty() && path != "/"
    }
}

impl std::fmt::Debug for PublishTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PublishTarget")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("secret", &"*".repeat(self.secret.chars().count()))
            .field("remote_path", &self.remote_path)
            .finish()
    }
}
