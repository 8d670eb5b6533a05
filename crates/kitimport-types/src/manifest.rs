//! Package manifest types
//!
//! The manifest lists the content documents shipped with a package, grouped by
//! content type. Groups and entries keep the order in which they appear in the
//! manifest document; the import loop walks them in exactly that order.

use std::fmt;

use serde::de::{self, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::blank::{is_blank, is_blank_opt};
use crate::error::{ImportError, ImportResult};

/// Identifier of a content entry inside the package (the key in the manifest)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(pub String);

impl EntryId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Per-entry import settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntrySettings {
    /// Document type handed to the document factory
    #[serde(default)]
    pub doc_type: String,
    /// Title of the created document
    #[serde(default)]
    pub title: String,
    /// Opaque settings blob; when non-blank the persisted content body is discarded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    /// Keys this crate does not interpret
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl EntrySettings {
    pub fn new(doc_type: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            doc_type: doc_type.into(),
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Whether the entry carries settings that supersede its persisted content
    pub fn has_data(&self) -> bool {
        !is_blank_opt(self.data.as_ref())
    }
}

/// One entry of a content group
#[derive(Debug, Clone, PartialEq)]
pub struct ManifestEntry {
    pub id: EntryId,
    pub settings: EntrySettings,
}

/// All entries of a single content type, in manifest order
#[derive(Debug, Clone, PartialEq)]
pub struct ContentGroup {
    pub content_type: String,
    pub entries: Vec<ManifestEntry>,
}

impl ContentGroup {
    pub fn new(content_type: impl Into<String>) -> Self {
        Self {
            content_type: content_type.into(),
            entries: Vec::new(),
        }
    }

    pub fn with_entry(mut self, id: impl Into<String>, settings: EntrySettings) -> Self {
        self.entries.push(ManifestEntry {
            id: EntryId::new(id),
            settings,
        });
        self
    }
}

/// Package manifest
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    /// Platform tag the package was exported from
    #[serde(default)]
    pub platform: String,
    /// Content groups in manifest order
    #[serde(
        default,
        deserialize_with = "deserialize_content",
        serialize_with = "serialize_content"
    )]
    pub content: Vec<ContentGroup>,
    /// Whether the package ships a global settings template
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub has_settings: bool,
    /// Package display name
    #[serde(default)]
    pub name: String,
    /// Keys this crate does not interpret
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Manifest {
    /// Parse a manifest from its JSON text
    pub fn from_json_str(raw: &str) -> ImportResult<Self> {
        serde_json::from_str(raw).map_err(|e| ImportError::InvalidManifest(e.to_string()))
    }

    /// Parse a manifest from an already decoded JSON value
    pub fn from_value(value: Value) -> ImportResult<Self> {
        serde_json::from_value(value).map_err(|e| ImportError::InvalidManifest(e.to_string()))
    }

    /// Total number of entries across all content groups
    pub fn total_entries(&self) -> usize {
        self.content.iter().map(|group| group.entries.len()).sum()
    }

    /// Whether the manifest lists any content group at all
    pub fn has_content(&self) -> bool {
        !self.content.is_empty()
    }

    /// Look up a content group by type name
    pub fn group(&self, content_type: &str) -> Option<&ContentGroup> {
        self.content
            .iter()
            .find(|group| group.content_type == content_type)
    }
}

/// Results of runners that already ran for the same package
///
/// Opaque to this crate; carried so document preparation can resolve
/// references to previously imported objects.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PriorResults(pub Value);

impl PriorResults {
    /// Results recorded by the named runner, if any
    pub fn runner(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn is_empty(&self) -> bool {
        is_blank(&self.0)
    }
}

fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(!is_blank_opt(value.as_ref()))
}

fn deserialize_content<'de, D>(deserializer: D) -> Result<Vec<ContentGroup>, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(ContentVisitor)
}

fn serialize_content<S>(content: &[ContentGroup], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let mut map = serializer.serialize_map(Some(content.len()))?;
    for group in content {
        map.serialize_entry(&group.content_type, &EntriesRef(&group.entries))?;
    }
    map.end()
}

struct EntriesRef<'a>(&'a [ManifestEntry]);

impl Serialize for EntriesRef<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for entry in self.0 {
            map.serialize_entry(entry.id.as_str(), &entry.settings)?;
        }
        map.end()
    }
}

/// Exporters encode an empty mapping as `[]`, so both shapes are accepted
/// as long as the sequence is empty.
fn reject_non_empty_seq<'de, A, V>(mut seq: A, visitor: &V) -> Result<(), A::Error>
where
    A: SeqAccess<'de>,
    V: Visitor<'de>,
{
    match seq.next_element::<de::IgnoredAny>()? {
        None => Ok(()),
        Some(_) => Err(de::Error::invalid_type(de::Unexpected::Seq, visitor)),
    }
}

struct ContentVisitor;

impl<'de> Visitor<'de> for ContentVisitor {
    type Value = Vec<ContentGroup>;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a map of content type to entries")
    }

    fn visit_unit<E>(self) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(Vec::new())
    }

    fn visit_seq<A>(self, seq: A) -> Result<Self::Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        reject_non_empty_seq(seq, &self)?;
        Ok(Vec::new())
    }

    fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut groups: Vec<ContentGroup> = Vec::new();
        while let Some((content_type, entries)) = map.next_entry::<String, GroupEntries>()? {
            groups.push(ContentGroup {
                content_type,
                entries: entries.0,
            });
        }
        Ok(groups)
    }
}

struct GroupEntries(Vec<ManifestEntry>);

impl<'de> Deserialize<'de> for GroupEntries {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(GroupEntriesVisitor)
    }
}

struct GroupEntriesVisitor;

impl<'de> Visitor<'de> for GroupEntriesVisitor {
    type Value = GroupEntries;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a map of entry id to entry settings")
    }

    fn visit_seq<A>(self, seq: A) -> Result<Self::Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        reject_non_empty_seq(seq, &self)?;
        Ok(GroupEntries(Vec::new()))
    }

    fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut entries = Vec::new();
        while let Some((id, settings)) = map.next_entry::<String, EntrySettings>()? {
            entries.push(ManifestEntry {
                id: EntryId(id),
                settings,
            });
        }
        Ok(GroupEntries(entries))
    }
}
