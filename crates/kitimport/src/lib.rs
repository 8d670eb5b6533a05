//! Kit Import Orchestrator
//!
//! This crate drives the import of a packaged kit into a host site: it makes
//! sure a global settings kit is active (optionally replacing it with one built
//! from the package and user overrides) and then imports every content entry
//! through the host's document factory.
//!
//! # Architecture
//!
//! - **Services**: settings payload building, single-entry import and the
//!   top-level orchestrator
//! - **Progress**: percentage tracking and progress sinks
//! - **Store**: filesystem-backed payload reading
//! - **Config**: runner configuration with environment overrides
//! - **Testing**: in-memory host collaborators
//!
//! # Usage
//!
//! The host implements the collaborator traits from `kitimport-types`, bundles
//! them into [`ImportServices`] and calls [`ImportOrchestrator::should_run`]
//! followed by [`ImportOrchestrator::run`].

pub mod config;
pub mod progress;
pub mod services;
pub mod store;
pub mod testing;
pub mod validation;

pub use config::{ConfigError, ImporterConfig};
pub use progress::{ChannelProgressSink, ProgressEvent, ProgressTracker, TracingProgressSink};
pub use services::{
    EntryImporter, ImportOrchestrator, ImportRunOutcome, ImportServiceError, ImportServiceResult,
    ImportServices, SettingsPayloadBuilder,
};
pub use store::FsPayloadStore;
pub use validation::ManifestValidationRules;
