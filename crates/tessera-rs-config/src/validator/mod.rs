//! Domain validation of the merged config tree.
//!
//! Each section check reads the tree with lenient typed lookups and reports
//! findings as data: errors make the result invalid, warnings do not. Nothing
//! here fails; a missing section simply produces the findings its defaults
//! imply.

mod rules;

#[cfg(test)]
mod tests;

use crate::{ConfigError, ConfigValue};
use log::{error, warn};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Ordered validation findings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    /// Fatal findings.
    pub errors: Vec<String>,
    /// Non-fatal findings.
    pub warnings: Vec<String>,
}

impl ValidationResult {
    /// Create an empty, valid result.
    pub fn new() -> Self {
        Self::default()
    }

    /// Valid iff no errors were recorded.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Whether there is anything to report.
    pub fn has_issues(&self) -> bool {
        !self.errors.is_empty() || !self.warnings.is_empty()
    }

    /// Record a fatal finding.
    pub fn add_error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    /// Record a non-fatal finding.
    pub fn add_warning(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    /// Append another result's findings after this one's.
    pub fn extend(&mut self, other: ValidationResult) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }

    /// Emit every finding through the logger.
    pub fn log(&self) {
        if !self.is_valid() {
            error!("config validation failed (errors={})", self.errors.len());
            for message in &self.errors {
                error!("  - {message}");
            }
        }
        if !self.warnings.is_empty() {
            warn!("config validation warnings (warnings={})", self.warnings.len());
            for message in &self.warnings {
                warn!("  - {message}");
            }
        }
    }
}

/// Sections that have validation rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationSection {
    Economics,
    Buildings,
    Military,
    Ui,
    System,
}

impl ValidationSection {
    /// All sections in the order `validate_all` runs them.
    pub const ALL: [ValidationSection; 5] = [
        ValidationSection::Economics,
        ValidationSection::Buildings,
        ValidationSection::Military,
        ValidationSection::Ui,
        ValidationSection::System,
    ];

    /// Config section name.
    pub fn as_str(self) -> &'static str {
        match self {
            ValidationSection::Economics => "economics",
            ValidationSection::Buildings => "buildings",
            ValidationSection::Military => "military",
            ValidationSection::Ui => "ui",
            ValidationSection::System => "system",
        }
    }

    /// Run this section's checks against `tree`.
    pub fn validate(self, tree: &ConfigValue) -> ValidationResult {
        match self {
            ValidationSection::Economics => rules::validate_economics(tree),
            ValidationSection::Buildings => rules::validate_buildings(tree),
            ValidationSection::Military => rules::validate_military(tree),
            ValidationSection::Ui => rules::validate_ui(tree),
            ValidationSection::System => rules::validate_system(tree),
        }
    }
}

impl fmt::Display for ValidationSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ValidationSection {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ValidationSection::ALL
            .into_iter()
            .find(|section| section.as_str() == s)
            .ok_or_else(|| ConfigError::UnknownSection(s.to_string()))
    }
}

/// Run every section check and concatenate the findings.
pub fn validate_all(tree: &ConfigValue) -> ValidationResult {
    let mut result = ValidationResult::new();
    for section in ValidationSection::ALL {
        result.extend(section.validate(tree));
    }
    result
}

/// Run the checks for a named section.
pub fn validate_section(
    tree: &ConfigValue,
    section: &str,
) -> Result<ValidationResult, ConfigError> {
    let section: ValidationSection = section.parse()?;
    Ok(section.validate(tree))
}
