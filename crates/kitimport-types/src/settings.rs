//! Global design settings (kit) payloads
//!
//! A kit holds site-wide design tokens. Only the fields the import pipeline
//! rewrites are typed; everything else rides along in `extra` untouched.

use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::blank::{is_blank, is_blank_opt};

/// One palette color
///
/// Entries without an `_id` cannot be targeted by an override and pass
/// through unchanged. `color` is kept as raw JSON so odd values survive.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColorEntry {
    /// Palette-internal identifier, stable across exports
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub color: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ColorEntry {
    pub fn new(id: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            color: Value::String(color.into()),
            extra: Map::new(),
        }
    }
}

/// Reference to an uploaded logo asset
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LogoRef {
    /// Attachment identifier; numeric or textual depending on the host
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl LogoRef {
    pub fn with_id(id: impl Into<Value>) -> Self {
        Self {
            id: Some(id.into()),
            ..Default::default()
        }
    }

    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Default::default()
        }
    }

    /// Whether the reference points at an existing attachment
    pub fn has_id(&self) -> bool {
        !is_blank_opt(self.id.as_ref())
    }
}

/// Kit settings document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SettingsPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_colors: Option<Vec<ColorEntry>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_colors: Option<Vec<ColorEntry>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_logo: Option<LogoRef>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SettingsPayload {
    /// Mutable access to every palette present in the payload
    pub fn palettes_mut(&mut self) -> impl Iterator<Item = &mut Vec<ColorEntry>> {
        self.system_colors
            .iter_mut()
            .chain(self.custom_colors.iter_mut())
    }
}

/// User selections applied on top of the packaged settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SettingsOverrides {
    /// Palette id -> replacement color
    #[serde(default)]
    pub color: HashMap<String, String>,
    /// Present whenever the caller sent a non-empty logo object, even one
    /// whose fields are all blank
    #[serde(
        default,
        deserialize_with = "deserialize_logo_override",
        skip_serializing_if = "Option::is_none"
    )]
    pub logo: Option<LogoRef>,
}

impl SettingsOverrides {
    /// The logo override, if one was supplied
    pub fn logo(&self) -> Option<&LogoRef> {
        self.logo.as_ref()
    }
}

fn deserialize_logo_override<'de, D>(deserializer: D) -> Result<Option<LogoRef>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Value::deserialize(deserializer)?;
    if is_blank(&raw) {
        return Ok(None);
    }
    LogoRef::deserialize(raw)
        .map(Some)
        .map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_settings_payload_keeps_unknown_keys() {
        let raw = json!({
            "system_colors": [{"_id": "primary", "title": "Primary", "color": "#111111"}],
            "site_logo": {"id": 41, "url": "https://cdn.example/logo.png"},
            "body_typography_font_family": "Roboto"
        });

        let payload: SettingsPayload = serde_json::from_value(raw).unwrap();
        let colors = payload.system_colors.as_ref().unwrap();

        assert_eq!(colors[0].id.as_deref(), Some("primary"));
        assert_eq!(colors[0].extra["title"], "Primary");
        assert!(payload.custom_colors.is_none());
        assert!(payload.site_logo.as_ref().unwrap().has_id());
        assert_eq!(payload.extra["body_typography_font_family"], "Roboto");

        let back = serde_json::to_value(&payload).unwrap();
        assert_eq!(back["system_colors"][0]["_id"], "primary");
        assert!(back.get("custom_colors").is_none());
    }

    #[test]
    fn test_palette_entry_without_id_is_kept() {
        let payload: SettingsPayload = serde_json::from_value(json!({
            "system_colors": [{"color": "#111"}, {"_id": "accent", "color": null}]
        }))
        .unwrap();

        let colors = payload.system_colors.as_ref().unwrap();
        assert_eq!(colors[0].id, None);
        assert_eq!(colors[0].color, "#111");
        assert_eq!(colors[1].color, Value::Null);

        let back = serde_json::to_value(&payload).unwrap();
        assert_eq!(back["system_colors"][0], json!({"color": "#111"}));
    }

    #[test]
    fn test_logo_presence() {
        assert!(!LogoRef::default().has_id());
        assert!(!LogoRef::with_url("x").has_id());
        assert!(LogoRef::with_id(7).has_id());
        assert!(!LogoRef::with_id("").has_id());
    }

    #[test]
    fn test_logo_override_with_blank_fields_is_present() {
        let overrides: SettingsOverrides =
            serde_json::from_value(json!({"logo": {"url": ""}})).unwrap();

        let logo = overrides.logo().unwrap();
        assert!(!logo.has_id());
        assert_eq!(logo.url.as_deref(), Some(""));
        assert!(overrides.color.is_empty());
    }

    #[test]
    fn test_empty_logo_override_is_absent() {
        for raw in [json!({}), json!([]), json!(null), json!("")] {
            let overrides: SettingsOverrides =
                serde_json::from_value(json!({ "logo": raw })).unwrap();

            assert!(overrides.logo().is_none());
        }
    }
}
