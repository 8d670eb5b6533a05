//! Manifest pre-flight check types

use serde::{Deserialize, Serialize};

use crate::manifest::Manifest;

/// How much a failed check matters
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationLevel {
    Info,
    /// Entries may fail, the run still makes sense
    Warning,
    /// The runner must not start
    Critical,
}

/// Outcome of one check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub rule_id: String,
    pub level: ValidationLevel,
    pub passed: bool,
    pub message: String,
    /// Manifest paths the check complained about, e.g. `content.page.12`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub affected_paths: Vec<String>,
}

/// Every check run against one manifest, in rule order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationReport {
    pub results: Vec<ValidationResult>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_result(&mut self, result: ValidationResult) {
        self.results.push(result);
    }

    /// False when a critical check failed
    pub fn can_proceed(&self) -> bool {
        !self
            .failures()
            .any(|r| r.level == ValidationLevel::Critical)
    }

    /// Results that did not pass
    pub fn failures(&self) -> impl Iterator<Item = &ValidationResult> {
        self.results.iter().filter(|r| !r.passed)
    }
}

/// A single manifest check
pub trait ManifestValidationRule: Send + Sync {
    fn rule_id(&self) -> &str;

    fn level(&self) -> ValidationLevel;

    fn validate(&self, manifest: &Manifest) -> ValidationResult;

    /// Build a result for this rule
    fn result(&self, passed: bool, message: String) -> ValidationResult {
        ValidationResult {
            rule_id: self.rule_id().to_string(),
            level: self.level(),
            passed,
            message,
            affected_paths: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(level: ValidationLevel, passed: bool) -> ValidationResult {
        ValidationResult {
            rule_id: "test.rule".to_string(),
            level,
            passed,
            message: String::new(),
            affected_paths: vec![],
        }
    }

    #[test]
    fn test_failed_warning_still_proceeds() {
        let mut report = ValidationReport::new();
        report.add_result(result(ValidationLevel::Info, true));
        report.add_result(result(ValidationLevel::Warning, false));

        assert!(report.can_proceed());
        assert_eq!(report.failures().count(), 1);
    }

    #[test]
    fn test_critical_failure_blocks() {
        let mut report = ValidationReport::new();
        report.add_result(result(ValidationLevel::Warning, true));
        report.add_result(result(ValidationLevel::Critical, false));

        assert!(!report.can_proceed());
    }

    #[test]
    fn test_passed_critical_check_does_not_block() {
        let mut report = ValidationReport::new();
        report.add_result(result(ValidationLevel::Critical, true));

        assert!(report.can_proceed());
        assert_eq!(report.failures().count(), 0);
    }
}
