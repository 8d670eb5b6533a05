//! Per-run import results
//!
//! Every processed entry ends up in exactly one of `succeed` or `failed` of its
//! content type. The serialized form matches what callers of the runner
//! expect: `{type: {succeed: {id: doc_id}, failed: {id: false}}}`.

use std::fmt;

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

use crate::document::DocumentId;
use crate::error::ImportError;
use crate::manifest::EntryId;

/// Why an entry could not be imported
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryFailure {
    pub reason: String,
}

impl EntryFailure {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl From<ImportError> for EntryFailure {
    fn from(error: ImportError) -> Self {
        Self::new(error.to_string())
    }
}

impl fmt::Display for EntryFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.reason)
    }
}

/// Outcome of importing a single entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryOutcome {
    Imported(DocumentId),
    Failed(EntryFailure),
}

impl EntryOutcome {
    pub fn is_imported(&self) -> bool {
        matches!(self, EntryOutcome::Imported(_))
    }
}

/// Results for one content type, in processing order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContentTypeResult {
    pub content_type: String,
    pub succeed: Vec<(EntryId, DocumentId)>,
    pub failed: Vec<(EntryId, EntryFailure)>,
}

impl ContentTypeResult {
    pub fn new(content_type: impl Into<String>) -> Self {
        Self {
            content_type: content_type.into(),
            ..Default::default()
        }
    }

    /// Document created for `id`, if the entry succeeded
    pub fn succeeded(&self, id: &str) -> Option<DocumentId> {
        self.succeed
            .iter()
            .find(|(entry, _)| entry.as_str() == id)
            .map(|(_, doc)| *doc)
    }

    /// Failure recorded for `id`, if the entry failed
    pub fn failure(&self, id: &str) -> Option<&EntryFailure> {
        self.failed
            .iter()
            .find(|(entry, _)| entry.as_str() == id)
            .map(|(_, failure)| failure)
    }

    pub fn is_failed(&self, id: &str) -> bool {
        self.failure(id).is_some()
    }
}

impl Serialize for ContentTypeResult {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let len = usize::from(!self.succeed.is_empty()) + usize::from(!self.failed.is_empty());
        let mut map = serializer.serialize_map(Some(len))?;
        if !self.succeed.is_empty() {
            map.serialize_entry("succeed", &Succeeded(&self.succeed))?;
        }
        if !self.failed.is_empty() {
            map.serialize_entry("failed", &Failed(&self.failed))?;
        }
        map.end()
    }
}

struct Succeeded<'a>(&'a [(EntryId, DocumentId)]);

impl Serialize for Succeeded<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (id, doc) in self.0 {
            map.serialize_entry(id.as_str(), doc)?;
        }
        map.end()
    }
}

struct Failed<'a>(&'a [(EntryId, EntryFailure)]);

impl Serialize for Failed<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (id, _) in self.0 {
            map.serialize_entry(id.as_str(), &false)?;
        }
        map.end()
    }
}

/// Results for a whole run, grouped by content type in processing order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportResults {
    groups: Vec<ContentTypeResult>,
}

impl ImportResults {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcome of one entry
    pub fn record(&mut self, content_type: &str, id: EntryId, outcome: EntryOutcome) {
        let group = match self
            .groups
            .iter()
            .position(|g| g.content_type == content_type)
        {
            Some(index) => &mut self.groups[index],
            None => {
                self.groups.push(ContentTypeResult::new(content_type));
                let last = self.groups.len() - 1;
                &mut self.groups[last]
            }
        };

        match outcome {
            EntryOutcome::Imported(doc) => group.succeed.push((id, doc)),
            EntryOutcome::Failed(failure) => group.failed.push((id, failure)),
        }
    }

    pub fn get(&self, content_type: &str) -> Option<&ContentTypeResult> {
        self.groups.iter().find(|g| g.content_type == content_type)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ContentTypeResult> {
        self.groups.iter()
    }

    pub fn succeeded_count(&self) -> usize {
        self.groups.iter().map(|g| g.succeed.len()).sum()
    }

    pub fn failed_count(&self) -> usize {
        self.groups.iter().map(|g| g.failed.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

impl Serialize for ImportResults {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.groups.len()))?;
        for group in &self.groups {
            map.serialize_entry(&group.content_type, group)?;
        }
        map.end()
    }
}
