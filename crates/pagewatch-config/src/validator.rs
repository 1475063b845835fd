//! Settings validation.

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;

use std::collections::HashSet;
use std::time::Duration;

use pagewatch_protocols::keys;

use crate::error::ConfigError;
use crate::monitor::{MonitorConfig, MIN_INTERVAL_SECS};

/// Validation result.
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }
}

/// A validation error.
#[derive(Debug)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// A validation warning.
#[derive(Debug)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Settings validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Produce a full report for the given settings.
    pub fn validate(config: &MonitorConfig) -> ValidationResult {
        let mut result = ValidationResult::default();

        Self::validate_interval(config, &mut result);
        Self::validate_target(config, &mut result);
        Self::validate_keywords(config, &mut result);
        Self::validate_min_count(config, &mut result);

        result
    }

    /// The scheduling interval, or the reason scheduling is disabled.
    pub fn require_interval(config: &MonitorConfig) -> Result<Duration, ConfigError> {
        match config.interval_seconds {
            None => Err(ConfigError::MissingField(keys::INTERVAL.to_string())),
            Some(secs) if secs < MIN_INTERVAL_SECS => Err(ConfigError::invalid(
                keys::INTERVAL,
                format!("{} is below the minimum of {} seconds", secs, MIN_INTERVAL_SECS),
            )),
            Some(secs) => Ok(Duration::from_secs(secs)),
        }
    }

    /// Check that the settings allow a content evaluation.
    pub fn require_evaluable(config: &MonitorConfig) -> Result<(), ConfigError> {
        if config.target().is_none() {
            return Err(ConfigError::MissingField(keys::TARGET_URL.to_string()));
        }
        if config.active_keywords().is_empty() {
            return Err(ConfigError::MissingField(keys::KEYWORDS.to_string()));
        }
        Ok(())
    }

    /// Check settings entered by a user before they are saved.
    ///
    /// Stricter than [`Self::validate`]: the target must be a full URL.
    pub fn validate_input(config: &MonitorConfig) -> Result<(), ConfigError> {
        if config.active_keywords().is_empty() {
            return Err(ConfigError::invalid(keys::KEYWORDS, "add at least one keyword"));
        }

        Self::require_interval(config).map_err(|_| {
            ConfigError::invalid(
                keys::INTERVAL,
                format!("interval must be at least {} seconds", MIN_INTERVAL_SECS),
            )
        })?;

        match config.target() {
            Some(url) if url.starts_with("http") => Ok(()),
            _ => Err(ConfigError::invalid(keys::TARGET_URL, "enter a valid URL")),
        }
    }

    fn validate_interval(config: &MonitorConfig, result: &mut ValidationResult) {
        if let Err(e) = Self::require_interval(config) {
            result.add_error(ValidationError::new(keys::INTERVAL, e.to_string()));
        }
    }

    fn validate_target(config: &MonitorConfig, result: &mut ValidationResult) {
        match config.target() {
            None => result.add_error(ValidationError::new(
                keys::TARGET_URL,
                "Target URL is empty; no tab can be matched",
            )),
            Some(url) if !url.starts_with("http") => result.add_warning(ValidationWarning::new(
                keys::TARGET_URL,
                format!("'{}' is matched as a substring of tab URLs", url),
            )),
            Some(_) => {}
        }
    }

    fn validate_keywords(config: &MonitorConfig, result: &mut ValidationResult) {
        let active = config.active_keywords();
        if active.is_empty() {
            result.add_error(ValidationError::new(
                keys::KEYWORDS,
                "No keywords configured; matching is disabled",
            ));
            return;
        }

        if active.len() != config.keywords.len() {
            result.add_warning(ValidationWarning::new(keys::KEYWORDS, "Blank keywords are ignored"));
        }

        let mut seen = HashSet::new();
        for keyword in active {
            if !seen.insert(keyword.to_lowercase()) {
                result.add_warning(ValidationWarning::new(
                    keys::KEYWORDS,
                    format!("Keyword '{}' is listed more than once and counts twice", keyword),
                ));
            }
        }
    }

    fn validate_min_count(config: &MonitorConfig, result: &mut ValidationResult) {
        if config.min_match_count == Some(0) {
            result.add_warning(ValidationWarning::new(keys::MIN_COUNT, "A minimum of 0 is treated as 1"));
        }
    }
}
