//! Validation of settings before any resource is created.

use crate::error::{ConfigError, Result, SakuraError};
use tracing::debug;

use super::settings::{ApiSettings, ProvisionSettings};

/// Validator for provisioning settings.
#[derive(Debug, Default)]
pub struct ConfigValidator;

/// Validation result containing all errors found.
#[derive(Debug, Default)]
pub struct ValidationResult {
    /// List of validation errors.
    pub errors: Vec<ValidationError>,
    /// List of warnings (non-fatal issues).
    pub warnings: Vec<String>,
}

/// A single validation error.
#[derive(Debug)]
pub struct ValidationError {
    /// The variable that failed validation.
    pub field: String,
    /// The error message.
    pub message: String,
}

impl ConfigValidator {
    /// Creates a new validator.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Validates API settings.
    ///
    /// # Errors
    ///
    /// Returns the first validation error found.
    pub fn validate_api(&self, api: &ApiSettings) -> Result<ValidationResult> {
        let mut result = ValidationResult::default();
        Self::check_zone(&api.zone, &mut result);
        Self::finish(result)
    }

    /// Validates the disk and server shape.
    ///
    /// # Errors
    ///
    /// Returns the first validation error found.
    pub fn validate_provision(&self, settings: &ProvisionSettings) -> Result<ValidationResult> {
        let mut result = ValidationResult::default();

        if settings.disk.name.is_empty() {
            result.push_error("SAKURA_DISK_NAME", "Disk name cannot be empty");
        }
        if settings.disk.size_gb == 0 {
            result.push_error("SAKURA_DISK_SIZE_GB", "Disk size must be greater than zero");
        }

        let server = &settings.server;
        if server.name.is_empty() {
            result.push_error("SAKURA_SERVER_NAME", "Server name cannot be empty");
        }
        if !is_valid_host_name(&server.host_name) {
            result.push_error(
                "SAKURA_HOST_NAME",
                format!(
                    "Host name '{}' is invalid. Must be alphanumeric with hyphens.",
                    server.host_name
                ),
            );
        }
        if server.cpu == 0 {
            result.push_error("SAKURA_SERVER_CPU", "CPU count must be greater than zero");
        }
        if server.memory_mb == 0 {
            result.push_error("SAKURA_SERVER_MEMORY_MB", "Memory must be greater than zero");
        } else if server.memory_mb % 1024 != 0 {
            result.warnings.push(format!(
                "Memory {} MB is not a whole number of GB; the API may reject the plan",
                server.memory_mb
            ));
        }
        if server.gpu == 0 {
            result.warnings.push(format!(
                "GPU count is zero; GPU model '{}' will be ignored",
                server.gpu_model
            ));
        }

        Self::finish(result)
    }

    fn check_zone(zone: &str, result: &mut ValidationResult) {
        if zone.is_empty() {
            result.push_error("SAKURA_ZONE", "Zone cannot be empty");
        } else if !zone.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()) {
            result.push_error(
                "SAKURA_ZONE",
                format!("Zone '{zone}' is invalid. Expected something like 'is1b'."),
            );
        }
    }

    fn finish(result: ValidationResult) -> Result<ValidationResult> {
        match result.errors.first() {
            None => {
                debug!("Configuration validation passed");
                Ok(result)
            }
            Some(first) => Err(SakuraError::Config(ConfigError::validation(
                first.message.clone(),
                first.field.clone(),
            ))),
        }
    }
}

/// Checks a host name: alphanumeric labels separated by hyphens.
fn is_valid_host_name(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= 63
        && !name.starts_with('-')
        && !name.ends_with('-')
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

impl ValidationResult {
    fn push_error(&mut self, field: &str, message: impl Into<String>) {
        self.errors.push(ValidationError {
            field: field.to_string(),
            message: message.into(),
        });
    }

    /// Returns true if validation passed (no errors).
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ApiCredentials, DiskSettings, ServerAccess, ServerSettings};

    fn settings() -> ProvisionSettings {
        ProvisionSettings {
            disk: DiskSettings::default(),
            server: ServerSettings::default(),
            access: ServerAccess {
                password: String::from("pw"),
                ssh_key_id: 1,
            },
        }
    }

    #[test]
    fn test_defaults_are_valid() {
        let result = ConfigValidator::new()
            .validate_provision(&settings())
            .expect("defaults should validate");
        assert!(result.is_valid());
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_zero_disk_size_rejected() {
        let mut s = settings();
        s.disk.size_gb = 0;
        let err = ConfigValidator::new().validate_provision(&s).unwrap_err();
        assert!(err.to_string().contains("Disk size"));
    }

    #[test]
    fn test_zero_gpu_is_a_warning() {
        let mut s = settings();
        s.server.gpu = 0;
        let result = ConfigValidator::new()
            .validate_provision(&s)
            .expect("zero GPUs is allowed");
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn test_host_names() {
        assert!(is_valid_host_name("bz-ai-1"));
        assert!(!is_valid_host_name(""));
        assert!(!is_valid_host_name("-bad"));
        assert!(!is_valid_host_name("under_score"));
    }

    #[test]
    fn test_zone_validation() {
        let api = crate::config::ApiSettings::new(ApiCredentials::new("t", "s"), "IS 1b");
        assert!(ConfigValidator::new().validate_api(&api).is_err());

        let api = crate::config::ApiSettings::new(ApiCredentials::new("t", "s"), "tk1a");
        assert!(ConfigValidator::new().validate_api(&api).is_ok());
    }
}
