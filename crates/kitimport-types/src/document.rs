//! Document and kit types exchanged with the host

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{ImportError, ImportResult};
use crate::manifest::EntrySettings;
use crate::settings::{LogoRef, SettingsPayload};

/// Identifier of a document created by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(pub u64);

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a kit (global settings object)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KitId(pub u64);

impl fmt::Display for KitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kits are stored as host documents
impl From<KitId> for DocumentId {
    fn from(id: KitId) -> Self {
        DocumentId(id.0)
    }
}

/// A kit as seen by the importer
#[derive(Debug, Clone, PartialEq)]
pub struct Kit {
    pub id: KitId,
    pub title: String,
    pub settings: SettingsPayload,
}

impl Kit {
    /// The stored logo, or an empty reference when none is set
    pub fn logo(&self) -> LogoRef {
        self.settings.site_logo.clone().unwrap_or_default()
    }
}

/// Basic metadata for a freshly created document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub title: String,
    pub status: String,
    /// Content type the document belongs to
    #[serde(rename = "type")]
    pub content_type: String,
}

/// Persisted document payload as handed to `Document::import`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentPayload {
    /// Serialized content body
    #[serde(default)]
    pub content: Value,
    /// Settings the entry was imported with
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub import_settings: Option<EntrySettings>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DocumentPayload {
    /// Build a payload from decoded JSON; the document must be an object
    pub fn from_value(value: Value) -> ImportResult<Self> {
        if !value.is_object() {
            return Err(ImportError::DocumentImport(
                "document payload is not a JSON object".to_string(),
            ));
        }
        Ok(serde_json::from_value(value)?)
    }

    /// Replace the content body with an empty structure
    pub fn discard_content(&mut self) {
        self.content = Value::Array(Vec::new());
    }
}
