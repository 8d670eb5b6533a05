//! Host collaborator traits
//!
//! Defines the interfaces the host site must provide. The import pipeline never
//! reaches into host state directly; every read or write goes through one of
//! these traits so runs can be driven against in-memory fakes.

use std::path::Path;

use async_trait::async_trait;
use serde_json::Value;

use crate::{
    document::{DocumentId, DocumentMetadata, DocumentPayload, Kit, KitId},
    error::ImportResult,
    manifest::EntrySettings,
    settings::{LogoRef, SettingsPayload},
};

/// Option key under which hosts persist the active kit id
pub const ACTIVE_OPTION_KEY: &str = "active_kit";

/// Manages kits (global design settings objects)
///
/// Exactly one kit is active at a time.
#[async_trait]
pub trait GlobalSettingsManager: Send + Sync {
    /// Identifier of the active kit, if any
    async fn active_id(&self) -> ImportResult<Option<KitId>>;

    /// Load a kit by id
    async fn get_instance(&self, id: KitId) -> ImportResult<Option<Kit>>;

    /// Create a kit from `settings`, optionally making it the active one
    async fn create_instance(
        &self,
        name: &str,
        settings: SettingsPayload,
        activate: bool,
    ) -> ImportResult<KitId>;

    /// Create a kit with host defaults
    async fn create_default_instance(&self) -> ImportResult<KitId>;

    /// Persist `id` as the active kit under [`ACTIVE_OPTION_KEY`]
    async fn persist_active(&self, id: KitId) -> ImportResult<()>;

    /// The active kit, if one is set and still exists
    async fn active_instance(&self) -> ImportResult<Option<Kit>> {
        match self.active_id().await? {
            Some(id) => self.get_instance(id).await,
            None => Ok(None),
        }
    }
}

/// A document freshly created by a [`DocumentFactory`]
#[async_trait]
pub trait Document: Send {
    /// Populate the document from its persisted payload
    async fn import(&mut self, payload: DocumentPayload) -> ImportResult<()>;

    /// Primary identifier of the document, once it has one
    fn main_id(&self) -> Option<DocumentId>;
}

/// Creates documents of a given type
#[async_trait]
pub trait DocumentFactory: Send + Sync {
    async fn create(
        &self,
        doc_type: &str,
        metadata: DocumentMetadata,
    ) -> ImportResult<Box<dyn Document>>;
}

/// Registry of content types known to the host
pub trait ContentTypeRegistry: Send + Sync {
    fn exists(&self, content_type: &str) -> bool;
}

/// Reads persisted JSON documents from the unpacked package
#[async_trait]
pub trait PayloadStore: Send + Sync {
    async fn read_json(&self, path: &Path) -> ImportResult<Value>;
}

/// Uploads logo assets into the host media library
#[async_trait]
pub trait AssetUploader: Send + Sync {
    /// Returns the uploaded reference; an empty reference means nothing was stored
    async fn upload_logo(&self, logo: &LogoRef) -> ImportResult<LogoRef>;
}

/// Receives progress broadcasts
///
/// Implementations must not block; delivery is best effort.
pub trait ProgressSink: Send + Sync {
    fn emit(&self, percent: u8, message: Option<&str>, channel: &str);
}

/// Key/value store for backup markers
#[async_trait]
pub trait BackupStore: Send + Sync {
    async fn has_backup_of(&self, key: &str) -> ImportResult<bool>;

    async fn set_backup(&self, key: &str, value: &str) -> ImportResult<()>;
}

/// Updates display metadata of host documents
#[async_trait]
pub trait PostMetadataUpdater: Send + Sync {
    async fn update_title(&self, id: DocumentId, title: &str) -> ImportResult<()>;
}

/// Applies entry-level page settings to an imported document
#[async_trait]
pub trait PageSettingsApplier: Send + Sync {
    async fn apply_page_settings(
        &self,
        document: DocumentId,
        settings: &EntrySettings,
    ) -> ImportResult<()>;
}
