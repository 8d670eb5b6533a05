//! Manifest validation rules

use std::collections::HashSet;

use kitimport_types::{
    Manifest, ManifestValidationRule, ValidationLevel, ValidationReport, ValidationResult,
};

/// Content runner validation rules
pub struct ManifestValidationRules;

impl ManifestValidationRules {
    /// Get all manifest validation rules for a runner expecting `platform`
    pub fn all_rules(platform: &str) -> Vec<Box<dyn ManifestValidationRule>> {
        vec![
            Box::new(PlatformRule {
                expected: platform.to_string(),
            }),
            Box::new(ContentPresentRule),
            Box::new(UniqueContentTypeRule),
            Box::new(EntryDocTypeRule),
            Box::new(EntryTitleRule),
        ]
    }

    /// Run every rule against `manifest`
    pub fn validate(platform: &str, manifest: &Manifest) -> ValidationReport {
        let mut report = ValidationReport::new();
        for rule in Self::all_rules(platform) {
            report.add_result(rule.validate(manifest));
        }
        report
    }
}

/// The package must come from the platform this runner imports
struct PlatformRule {
    expected: String,
}

impl ManifestValidationRule for PlatformRule {
    fn rule_id(&self) -> &str {
        "manifest.platform"
    }

    fn level(&self) -> ValidationLevel {
        ValidationLevel::Critical
    }

    fn validate(&self, manifest: &Manifest) -> ValidationResult {
        if manifest.platform == self.expected {
            return self.result(true, format!("Platform '{}' is supported", self.expected));
        }

        ValidationResult {
            affected_paths: vec!["platform".to_string()],
            ..self.result(
                false,
                format!(
                    "Package platform '{}' does not match '{}'",
                    manifest.platform, self.expected
                ),
            )
        }
    }
}

/// There must be something to import
struct ContentPresentRule;

impl ManifestValidationRule for ContentPresentRule {
    fn rule_id(&self) -> &str {
        "manifest.content.present"
    }

    fn level(&self) -> ValidationLevel {
        ValidationLevel::Critical
    }

    fn validate(&self, manifest: &Manifest) -> ValidationResult {
        if manifest.has_content() {
            self.result(
                true,
                format!(
                    "{} content types with {} entries",
                    manifest.content.len(),
                    manifest.total_entries()
                ),
            )
        } else {
            ValidationResult {
                affected_paths: vec!["content".to_string()],
                ..self.result(false, "Manifest lists no content".to_string())
            }
        }
    }
}

/// A content type listed twice would be imported twice
struct UniqueContentTypeRule;

impl ManifestValidationRule for UniqueContentTypeRule {
    fn rule_id(&self) -> &str {
        "manifest.content.unique_types"
    }

    fn level(&self) -> ValidationLevel {
        ValidationLevel::Warning
    }

    fn validate(&self, manifest: &Manifest) -> ValidationResult {
        let mut seen = HashSet::new();
        let duplicates: Vec<String> = manifest
            .content
            .iter()
            .filter(|group| !seen.insert(group.content_type.as_str()))
            .map(|group| format!("content.{}", group.content_type))
            .collect();

        if duplicates.is_empty() {
            self.result(true, "Content types are unique".to_string())
        } else {
            ValidationResult {
                affected_paths: duplicates,
                ..self.result(false, "Content types are listed more than once".to_string())
            }
        }
    }
}

/// Every entry needs a document type for the factory
struct EntryDocTypeRule;

impl ManifestValidationRule for EntryDocTypeRule {
    fn rule_id(&self) -> &str {
        "manifest.entry.doc_type"
    }

    fn level(&self) -> ValidationLevel {
        ValidationLevel::Warning
    }

    fn validate(&self, manifest: &Manifest) -> ValidationResult {
        let missing = missing_entries(manifest, |doc_type, _| doc_type.is_empty());

        if missing.is_empty() {
            self.result(true, "All entries declare a document type".to_string())
        } else {
            ValidationResult {
                message: format!(
                    "{} entries have no document type and will fail to import",
                    missing.len()
                ),
                affected_paths: missing,
                ..self.result(false, String::new())
            }
        }
    }
}

/// Untitled documents import fine but are hard to find afterwards
struct EntryTitleRule;

impl ManifestValidationRule for EntryTitleRule {
    fn rule_id(&self) -> &str {
        "manifest.entry.title"
    }

    fn level(&self) -> ValidationLevel {
        ValidationLevel::Info
    }

    fn validate(&self, manifest: &Manifest) -> ValidationResult {
        let missing = missing_entries(manifest, |_, title| title.trim().is_empty());

        if missing.is_empty() {
            self.result(true, "All entries have a title".to_string())
        } else {
            ValidationResult {
                message: format!("{} entries have no title", missing.len()),
                affected_paths: missing,
                ..self.result(false, String::new())
            }
        }
    }
}

fn missing_entries<F>(manifest: &Manifest, is_missing: F) -> Vec<String>
where
    F: Fn(&str, &str) -> bool,
{
    let is_missing = &is_missing;
    manifest
        .content
        .iter()
        .flat_map(move |group| {
            group
                .entries
                .iter()
                .filter(move |entry| is_missing(&entry.settings.doc_type, &entry.settings.title))
                .map(move |entry| format!("content.{}.{}", group.content_type, entry.id))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use kitimport_types::{ContentGroup, EntrySettings};

    fn manifest(content: Vec<ContentGroup>) -> Manifest {
        Manifest {
            platform: "elementor".to_string(),
            content,
            name: "Agency".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_manifest_passes() {
        let m = manifest(vec![
            ContentGroup::new("page").with_entry("1", EntrySettings::new("page", "Home"))
        ]);

        let report = ManifestValidationRules::validate("elementor", &m);

        assert_eq!(report.results.len(), 5);
        assert_eq!(report.failures().count(), 0);
    }

    #[test]
    fn test_wrong_platform_blocks() {
        let mut m = manifest(vec![
            ContentGroup::new("page").with_entry("1", EntrySettings::new("page", "Home"))
        ]);
        m.platform = "gutenberg".to_string();

        let report = ManifestValidationRules::validate("elementor", &m);

        assert!(!report.can_proceed());
        let failure = report.failures().next().unwrap();
        assert_eq!(failure.rule_id, "manifest.platform");
        assert_eq!(failure.affected_paths, vec!["platform".to_string()]);
    }

    #[test]
    fn test_empty_content_blocks() {
        let report = ManifestValidationRules::validate("elementor", &manifest(vec![]));

        assert!(!report.can_proceed());
        assert_eq!(
            report.failures().next().unwrap().rule_id,
            "manifest.content.present"
        );
    }

    #[test]
    fn test_missing_doc_type_and_title_only_warn() {
        let m = manifest(vec![ContentGroup::new("page")
            .with_entry("1", EntrySettings::new("", "Home"))
            .with_entry("2", EntrySettings::new("page", ""))]);

        let report = ManifestValidationRules::validate("elementor", &m);

        assert!(report.can_proceed());
        let affected: Vec<&str> = report
            .failures()
            .flat_map(|r| r.affected_paths.iter().map(String::as_str))
            .collect();
        assert_eq!(affected, vec!["content.page.1", "content.page.2"]);
    }

    #[test]
    fn test_duplicate_content_types_warn() {
        let m = manifest(vec![
            ContentGroup::new("page").with_entry("1", EntrySettings::new("page", "A")),
            ContentGroup::new("page").with_entry("2", EntrySettings::new("page", "B")),
        ]);

        let report = ManifestValidationRules::validate("elementor", &m);

        assert!(report.can_proceed());
        let failure = report.failures().next().unwrap();
        assert_eq!(failure.level, ValidationLevel::Warning);
        assert_eq!(failure.affected_paths, vec!["content.page".to_string()]);
    }
}
