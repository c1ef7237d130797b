//! Config validation: collects every problem in one pass so `check-config`
//! can show them together.

use crate::schema::{AutoInspectConfig, VisionProviderKind};
use thiserror::Error;

/// A config validation error with field path and message.
#[derive(Debug, Error)]
#[error("Config validation error at '{path}': {message}")]
pub struct ConfigValidationError {
    pub path: String,
    pub message: String,
}

/// Errors block startup; warnings are only logged.
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }

    fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }
}

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error", "off"];

/// Validate the config and return a report of all errors and warnings.
pub fn validate(config: &AutoInspectConfig) -> ValidationReport {
    let mut report = ValidationReport::default();
    validate_server(config, &mut report);
    validate_storage(config, &mut report);
    validate_vision(config, &mut report);
    validate_logging(config, &mut report);
    report
}

fn validate_server(config: &AutoInspectConfig, report: &mut ValidationReport) {
    if config.server.port == Some(0) {
        report.error("server.port", "port must be between 1 and 65535");
    }
    if config.server.bind().trim().is_empty() {
        report.error("server.bind", "bind address cannot be empty");
    }
}

fn validate_storage(config: &AutoInspectConfig, report: &mut ValidationReport) {
    if config.storage.database_path().trim().is_empty() {
        report.error("storage.databasePath", "database path cannot be empty");
    }
    if config.storage.blob_root().trim().is_empty() {
        report.error("storage.blobRoot", "blob root cannot be empty");
    }
}

fn validate_vision(config: &AutoInspectConfig, report: &mut ValidationReport) {
    let vision = &config.vision;
    match vision.provider() {
        VisionProviderKind::Openai => {
            if vision.api_key.as_deref().map(str::trim).unwrap_or("").is_empty() {
                report.error(
                    "vision.apiKey",
                    "apiKey is required for the openai provider (e.g. apiKey: ${OPENAI_API_KEY})",
                );
            }
            let url = vision.base_url();
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                report.error(
                    "vision.baseUrl",
                    format!("baseUrl '{url}' must start with http:// or https://"),
                );
            }
        }
        VisionProviderKind::Mock => {
            report.warn(
                "vision.provider",
                "mock provider in use; every photo scores 10 with no findings",
            );
        }
    }
    if vision.max_concurrency == Some(0) {
        report.error("vision.maxConcurrency", "maxConcurrency must be >= 1");
    }
    if vision.max_tokens == Some(0) {
        report.error("vision.maxTokens", "maxTokens must be >= 1");
    }
    if vision.timeout_secs == Some(0) {
        report.error("vision.timeoutSecs", "timeoutSecs must be >= 1");
    }
    let temperature = vision.temperature();
    if !(0.0..=2.0).contains(&temperature) {
        report.warn(
            "vision.temperature",
            format!("temperature {temperature} is outside 0.0..=2.0 and may be rejected"),
        );
    }
}

fn validate_logging(config: &AutoInspectConfig, report: &mut ValidationReport) {
    let level = config.logging.level();
    // Anything with '=' or ',' is treated as a full filter directive.
    if !level.contains('=')
        && !level.contains(',')
        && !LOG_LEVELS.contains(&level.to_lowercase().as_str())
    {
        report.warn(
            "logging.level",
            format!("unknown log level '{level}'; use one of {}", LOG_LEVELS.join(", ")),
        );
    }
}
