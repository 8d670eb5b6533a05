//! Kit settings payload builder
//!
//! Applies user color and logo selections to the packaged settings template.

use std::collections::HashMap;
use std::sync::Arc;

use kitimport_types::{AssetUploader, LogoRef, SettingsOverrides, SettingsPayload};
use serde_json::Value;
use tracing::{debug, warn};

/// Builds the settings payload for a replacement kit
pub struct SettingsPayloadBuilder {
    uploader: Arc<dyn AssetUploader>,
}

impl SettingsPayloadBuilder {
    pub fn new(uploader: Arc<dyn AssetUploader>) -> Self {
        Self { uploader }
    }

    /// Apply `overrides` to `base`
    ///
    /// `old_logo` is the logo of the kit active before the import. The only
    /// side effect is a logo upload when the override has no attachment id and
    /// no previous logo exists.
    pub async fn build_overridden_settings(
        &self,
        mut base: SettingsPayload,
        overrides: &SettingsOverrides,
        old_logo: &LogoRef,
    ) -> SettingsPayload {
        Self::apply_color_overrides(&mut base, &overrides.color);

        if let Some(logo) = overrides.logo() {
            base.site_logo = Some(self.resolve_logo(logo, old_logo).await);
        }

        base
    }

    /// Replace palette colors whose id appears in `colors`
    ///
    /// Entry order and every field other than `color` stay as they are. Entries
    /// without an id are never touched.
    pub fn apply_color_overrides(settings: &mut SettingsPayload, colors: &HashMap<String, String>) {
        if colors.is_empty() {
            return;
        }

        for palette in settings.palettes_mut() {
            for entry in palette.iter_mut() {
                if let Some(color) = entry.id.as_ref().and_then(|id| colors.get(id)) {
                    entry.color = Value::String(color.clone());
                }
            }
        }
    }

    async fn resolve_logo(&self, logo: &LogoRef, old_logo: &LogoRef) -> LogoRef {
        if logo.has_id() {
            return logo.clone();
        }

        if old_logo.has_id() {
            debug!("Keeping existing site logo, skipping upload");
            return old_logo.clone();
        }

        match self.uploader.upload_logo(logo).await {
            Ok(uploaded) if uploaded.has_id() => uploaded,
            Ok(_) => {
                warn!("Logo upload returned no attachment, keeping previous logo");
                old_logo.clone()
            }
            Err(e) => {
                warn!("Logo upload failed: {}, keeping previous logo", e);
                old_logo.clone()
            }
        }
    }
}
