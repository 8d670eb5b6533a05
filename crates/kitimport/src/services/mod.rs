//! Import orchestration services

mod entry_importer;
mod orchestrator;
mod settings_builder;

pub use entry_importer::EntryImporter;
pub use orchestrator::{ImportOrchestrator, ImportRunOutcome};
pub use settings_builder::SettingsPayloadBuilder;

use std::path::PathBuf;
use std::sync::Arc;

use kitimport_types::{
    AssetUploader, BackupStore, ContentTypeRegistry, DocumentFactory, GlobalSettingsManager,
    ImportError, PageSettingsApplier, PayloadStore, PostMetadataUpdater, ProgressSink,
};
use thiserror::Error;

use crate::config::ConfigError;

/// Import service errors
///
/// Entry-level problems never surface here; they are recorded in the run
/// results instead.
#[derive(Error, Debug)]
pub enum ImportServiceError {
    #[error("Import error: {0}")]
    Import(#[from] ImportError),

    #[error("Failed to build kit settings from {path}: {source}")]
    SettingsBuild {
        path: PathBuf,
        #[source]
        source: ImportError,
    },

    #[error("Kit activation failed: {0}")]
    KitActivation(String),

    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),
}

/// Result type for import services
pub type ImportServiceResult<T> = Result<T, ImportServiceError>;

/// Host collaborators an import run talks to
#[derive(Clone)]
pub struct ImportServices {
    pub kits: Arc<dyn GlobalSettingsManager>,
    pub documents: Arc<dyn DocumentFactory>,
    pub content_types: Arc<dyn ContentTypeRegistry>,
    pub payloads: Arc<dyn PayloadStore>,
    pub uploader: Arc<dyn AssetUploader>,
    pub progress: Arc<dyn ProgressSink>,
    pub backups: Arc<dyn BackupStore>,
    pub metadata: Arc<dyn PostMetadataUpdater>,
    pub page_settings: Arc<dyn PageSettingsApplier>,
}
