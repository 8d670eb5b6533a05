//! Import orchestrator service
//!
//! Coordinates a content import run: kit preparation first, then every
//! manifest entry in order.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use kitimport_types::{
    DocumentId, EntryOutcome, EntrySettings, ImportError, ImportResults, KitId, LogoRef, Manifest,
    PriorResults, SettingsOverrides, SettingsPayload, ValidationReport,
};
use serde_json::{json, Value};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::{
    EntryImporter, ImportServiceError, ImportServiceResult, ImportServices,
    SettingsPayloadBuilder,
};
use crate::config::ImporterConfig;
use crate::progress::ProgressTracker;
use crate::validation::ManifestValidationRules;

/// Outcome of an import run
#[derive(Debug, Clone)]
pub struct ImportRunOutcome {
    /// Run identifier, for log correlation
    pub run_id: Uuid,
    /// Per content-type results
    pub content: ImportResults,
    /// Kit active when the entries were imported
    pub active_kit_id: KitId,
    /// Kit created from the package settings, if any
    pub created_kit_id: Option<KitId>,
    /// Content types the host does not know, in manifest order
    pub skipped_content_types: Vec<String>,
    pub processed: usize,
    pub total: usize,
    pub started_at: DateTime<Utc>,
    pub duration_seconds: f64,
}

impl ImportRunOutcome {
    /// The runner result as reported to callers: `{"content": {...}}`
    pub fn to_json(&self) -> Value {
        json!({ "content": self.content })
    }
}

/// Kit state once preparation finished
struct PreparedKit {
    active: KitId,
    created: Option<KitId>,
}

/// Import orchestrator coordinating kit preparation and entry import
pub struct ImportOrchestrator {
    config: ImporterConfig,
    package_dir: PathBuf,
    services: ImportServices,
    entry_importer: EntryImporter,
    settings_builder: SettingsPayloadBuilder,
}

impl ImportOrchestrator {
    /// Create an orchestrator for the package unpacked at `package_dir`
    pub fn new(
        config: ImporterConfig,
        package_dir: impl Into<PathBuf>,
        services: ImportServices,
    ) -> Self {
        let entry_importer = EntryImporter::new(
            services.documents.clone(),
            services.payloads.clone(),
            config.publish_status.clone(),
        );
        let settings_builder = SettingsPayloadBuilder::new(services.uploader.clone());

        Self {
            config,
            package_dir: package_dir.into(),
            services,
            entry_importer,
            settings_builder,
        }
    }

    pub fn name(&self) -> &'static str {
        "content"
    }

    pub fn label(&self) -> &'static str {
        "Content"
    }

    /// Channel progress is broadcast on
    pub fn action(&self) -> &str {
        &self.config.progress_channel
    }

    pub fn should_log(&self) -> bool {
        true
    }

    pub fn log_message(&self) -> &'static str {
        "Importing templates (pages, posts etc)"
    }

    /// Whether this runner applies to `manifest`
    pub fn should_run(&self, manifest: &Manifest) -> bool {
        manifest.platform == self.config.expected_platform && manifest.has_content()
    }

    /// Pre-flight checks for `manifest`
    pub fn validate(&self, manifest: &Manifest) -> ValidationReport {
        ManifestValidationRules::validate(&self.config.expected_platform, manifest)
    }

    /// Run the import
    ///
    /// Fails only on invalid configuration or when the kit cannot be prepared;
    /// entry failures are recorded in the returned results. `prior` holds the
    /// results of runners that ran earlier; entry import does not consult it.
    pub async fn run(
        &self,
        manifest: &Manifest,
        overrides: &SettingsOverrides,
        prior: &PriorResults,
    ) -> ImportServiceResult<ImportRunOutcome> {
        self.config.validate()?;

        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        info!(
            "Starting content import {} for package '{}' ({} entries)",
            run_id,
            manifest.name,
            manifest.total_entries()
        );

        let report = self.validate(manifest);
        for failure in report.failures() {
            warn!("Manifest check {}: {}", failure.rule_id, failure.message);
        }
        if !prior.is_empty() {
            debug!("Run {} continues after earlier runners, prior results ignored", run_id);
        }

        let kit = self.prepare_kit(manifest, overrides).await?;

        let total = manifest.total_entries();
        let mut progress = ProgressTracker::new(total);
        let mut results = ImportResults::new();
        let mut skipped_content_types = Vec::new();
        let base_path = self.package_dir.join(&self.config.content_dir);

        for group in &manifest.content {
            if !self.services.content_types.exists(&group.content_type) {
                warn!(
                    "Skipping unknown content type '{}' ({} entries)",
                    group.content_type,
                    group.entries.len()
                );
                skipped_content_types.push(group.content_type.clone());
                continue;
            }

            for entry in &group.entries {
                let outcome = self
                    .entry_importer
                    .import_entry(&entry.id, &group.content_type, &base_path, &entry.settings)
                    .await;

                match &outcome {
                    EntryOutcome::Imported(document) => {
                        debug!(
                            "Imported {}/{} as document {}",
                            group.content_type, entry.id, document
                        );
                        self.apply_page_settings(*document, &entry.settings).await;
                    }
                    EntryOutcome::Failed(failure) => {
                        warn!(
                            "Failed to import {}/{}: {}",
                            group.content_type, entry.id, failure
                        );
                    }
                }
                results.record(&group.content_type, entry.id.clone(), outcome);

                if let Some(percent) = progress.advance() {
                    self.services
                        .progress
                        .emit(percent, None, &self.config.progress_channel);
                }
            }
        }

        let duration_seconds = (Utc::now() - started_at).num_milliseconds() as f64 / 1000.0;
        info!(
            "Content import {} finished: {} succeeded, {} failed, {} content types skipped",
            run_id,
            results.succeeded_count(),
            results.failed_count(),
            skipped_content_types.len()
        );

        Ok(ImportRunOutcome {
            run_id,
            content: results,
            active_kit_id: kit.active,
            created_kit_id: kit.created,
            skipped_content_types,
            processed: progress.processed(),
            total,
            started_at,
            duration_seconds,
        })
    }

    /// Replace the kit when the package ships settings, then make sure one is active
    async fn prepare_kit(
        &self,
        manifest: &Manifest,
        overrides: &SettingsOverrides,
    ) -> ImportServiceResult<PreparedKit> {
        let current = self.services.kits.active_instance().await?;
        let old_logo = current.as_ref().map(|kit| kit.logo()).unwrap_or_default();

        let created = if manifest.has_settings {
            self.backup_active_kit(current.as_ref().map(|kit| kit.id))
                .await?;
            Some(self.replace_kit(manifest, overrides, &old_logo).await?)
        } else {
            None
        };

        let active = self.ensure_active_kit().await?;
        Ok(PreparedKit { active, created })
    }

    /// Remember the kit active before the first import; later runs keep the first value
    async fn backup_active_kit(&self, active: Option<KitId>) -> ImportServiceResult<()> {
        let Some(active) = active else {
            debug!("No active kit to back up");
            return Ok(());
        };

        let key = &self.config.backup_option_key;
        if self.services.backups.has_backup_of(key).await? {
            debug!("Kit backup already recorded under {}", key);
            return Ok(());
        }

        self.services
            .backups
            .set_backup(key, &active.to_string())
            .await?;
        info!("Backed up active kit {} under {}", active, key);
        Ok(())
    }

    async fn replace_kit(
        &self,
        manifest: &Manifest,
        overrides: &SettingsOverrides,
        old_logo: &LogoRef,
    ) -> ImportServiceResult<KitId> {
        let base = self.read_settings_template().await?;
        let settings = self
            .settings_builder
            .build_overridden_settings(base, overrides, old_logo)
            .await;

        let kit_id = self
            .services
            .kits
            .create_instance(&manifest.name, settings, true)
            .await
            .map_err(|e| {
                error!("Failed to create kit for '{}': {}", manifest.name, e);
                ImportServiceError::KitActivation(e.to_string())
            })?;

        let title = self.config.kit_title(&manifest.name);
        if let Err(e) = self
            .services
            .metadata
            .update_title(DocumentId::from(kit_id), &title)
            .await
        {
            warn!("Failed to retitle kit {}: {}", kit_id, e);
        }

        info!("Created and activated kit {} ('{}')", kit_id, title);
        Ok(kit_id)
    }

    async fn read_settings_template(&self) -> ImportServiceResult<SettingsPayload> {
        let path = self.package_dir.join(&self.config.settings_file);
        let build_error = |source: ImportError| ImportServiceError::SettingsBuild {
            path: path.clone(),
            source,
        };

        let raw = self
            .services
            .payloads
            .read_json(&path)
            .await
            .map_err(build_error)?;
        serde_json::from_value(raw).map_err(|e| build_error(e.into()))
    }

    /// Guarantee an active kit exists, creating a default one if needed
    async fn ensure_active_kit(&self) -> ImportServiceResult<KitId> {
        if let Some(kit) = self.services.kits.active_instance().await? {
            return Ok(kit.id);
        }

        let kits = &self.services.kits;
        let kit_id = kits
            .create_default_instance()
            .await
            .map_err(|e| ImportServiceError::KitActivation(e.to_string()))?;
        kits.persist_active(kit_id)
            .await
            .map_err(|e| ImportServiceError::KitActivation(e.to_string()))?;

        info!("No active kit found, created default kit {}", kit_id);
        Ok(kit_id)
    }

    async fn apply_page_settings(&self, document: DocumentId, settings: &EntrySettings) {
        if let Err(e) = self
            .services
            .page_settings
            .apply_page_settings(document, settings)
            .await
        {
            warn!("Failed to apply page settings to {}: {}", document, e);
        }
    }
}
