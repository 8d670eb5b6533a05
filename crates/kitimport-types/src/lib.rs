//! Core types and traits for the kit import system
//!
//! This crate provides the foundational abstractions for importing a packaged
//! kit (global design settings plus content documents) into a host site.
//!
//! # Architecture
//!
//! - **Manifest**: ordered description of the package (`Manifest`, `EntrySettings`)
//! - **Settings**: global design settings payloads and user overrides
//! - **Collaborators**: traits the host implements (`DocumentFactory`,
//!   `GlobalSettingsManager`, `PayloadStore`, ...)
//! - **Results**: per content-type success/failure bookkeeping
//! - **Validation**: boundary checks for manifests
//! - **Errors**: unified error handling across the import pipeline
//!
//! # Usage
//!
//! Host integrations depend on this crate and implement the collaborator traits;
//! the `kitimport` crate drives them.

pub mod blank;
pub mod collaborators;
pub mod document;
pub mod error;
pub mod manifest;
pub mod results;
pub mod settings;
pub mod validation;

pub use blank::is_blank;
pub use collaborators::{
    AssetUploader, BackupStore, ContentTypeRegistry, Document, DocumentFactory,
    GlobalSettingsManager, PageSettingsApplier, PayloadStore, PostMetadataUpdater, ProgressSink,
    ACTIVE_OPTION_KEY,
};
pub use document::{DocumentId, DocumentMetadata, DocumentPayload, Kit, KitId};
pub use error::{ImportError, ImportResult};
pub use manifest::{ContentGroup, EntryId, EntrySettings, Manifest, ManifestEntry, PriorResults};
pub use results::{ContentTypeResult, EntryFailure, EntryOutcome, ImportResults};
pub use settings::{ColorEntry, LogoRef, SettingsOverrides, SettingsPayload};
pub use validation::{
    ManifestValidationRule, ValidationLevel, ValidationReport, ValidationResult,
};
