//! Config defaults: fills every unset leaf so the effective config can be
//! printed or logged as a whole.

use crate::schema::{AutoInspectConfig, VisionProviderKind};

pub const DEFAULT_BIND: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8080;

pub const DEFAULT_DATABASE_PATH: &str = "data/autoinspect.db";
pub const DEFAULT_BLOB_ROOT: &str = "data/blobs";

pub const DEFAULT_VISION_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_VISION_MODEL: &str = "gpt-4o";
pub const DEFAULT_VISION_MAX_TOKENS: u32 = 1024;
pub const DEFAULT_VISION_TEMPERATURE: f32 = 0.1;

/// Photos analysed concurrently by one inspection run.
pub const DEFAULT_VISION_MAX_CONCURRENCY: usize = 4;

pub const DEFAULT_VISION_TIMEOUT_SECS: u64 = 60;

pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Apply all defaults to a freshly loaded config.
pub fn apply_all_defaults(config: AutoInspectConfig) -> AutoInspectConfig {
    let config = apply_server_defaults(config);
    let config = apply_storage_defaults(config);
    let config = apply_vision_defaults(config);
    apply_logging_defaults(config)
}

fn apply_server_defaults(mut config: AutoInspectConfig) -> AutoInspectConfig {
    let server = &mut config.server;
    server.bind.get_or_insert_with(|| DEFAULT_BIND.to_string());
    server.port.get_or_insert(DEFAULT_PORT);
    config
}

fn apply_storage_defaults(mut config: AutoInspectConfig) -> AutoInspectConfig {
    let storage = &mut config.storage;
    storage
        .database_path
        .get_or_insert_with(|| DEFAULT_DATABASE_PATH.to_string());
    storage
        .blob_root
        .get_or_insert_with(|| DEFAULT_BLOB_ROOT.to_string());
    config
}

/// The API key has no default; an openai provider without one fails validation.
fn apply_vision_defaults(mut config: AutoInspectConfig) -> AutoInspectConfig {
    let vision = &mut config.vision;
    vision.provider.get_or_insert(VisionProviderKind::Openai);
    vision
        .base_url
        .get_or_insert_with(|| DEFAULT_VISION_BASE_URL.to_string());
    vision
        .model
        .get_or_insert_with(|| DEFAULT_VISION_MODEL.to_string());
    vision.max_tokens.get_or_insert(DEFAULT_VISION_MAX_TOKENS);
    vision.temperature.get_or_insert(DEFAULT_VISION_TEMPERATURE);
    vision
        .max_concurrency
        .get_or_insert(DEFAULT_VISION_MAX_CONCURRENCY);
    vision.timeout_secs.get_or_insert(DEFAULT_VISION_TIMEOUT_SECS);
    config
}

fn apply_logging_defaults(mut config: AutoInspectConfig) -> AutoInspectConfig {
    config
        .logging
        .level
        .get_or_insert_with(|| DEFAULT_LOG_LEVEL.to_string());
    config
}
