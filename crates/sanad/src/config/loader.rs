use std::path::Path;

use crate::config::schema::Config;
use crate::error::ConfigError;

const SCHEMA_JSON: &str = include_str!("../../../../schema/config-v1.json");

/// Environment variable naming the config file used by the server.
pub const CONFIG_ENV_VAR: &str = "SANAD_CONFIG";

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    load_config_from_str(&content)
}

pub fn load_config_from_str(content: &str) -> Result<Config, ConfigError> {
    let json_value: serde_json::Value = serde_json::from_str(content)?;

    validate_schema(&json_value)?;

    let config: Config = serde_json::from_value(json_value)?;

    validate_config(&config)?;

    Ok(config)
}

/// Loads the file named by `SANAD_CONFIG`, or the built-in defaults when unset.
pub fn load_config_from_env() -> Result<Config, ConfigError> {
    match std::env::var_os(CONFIG_ENV_VAR) {
        Some(path) if !path.is_empty() => load_config(path),
        _ => Ok(Config::default()),
    }
}

fn validate_schema(json_value: &serde_json::Value) -> Result<(), ConfigError> {
    let schema: serde_json::Value =
        serde_json::from_str(SCHEMA_JSON).map_err(|e| ConfigError::Validation {
            message: format!("Invalid embedded schema JSON: {}", e),
        })?;

    let validator = jsonschema::validator_for(&schema).map_err(|e| ConfigError::Validation {
        message: format!("Failed to compile JSON schema: {}", e),
    })?;

    let error_messages: Vec<String> = validator
        .iter_errors(json_value)
        .map(|e| e.to_string())
        .collect();

    if !error_messages.is_empty() {
        return Err(ConfigError::SchemaValidation {
            errors: error_messages.join("; "),
        });
    }

    Ok(())
}

fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.version != "1.0" {
        return Err(ConfigError::Validation {
            message: format!("Unsupported config version: {}", config.version),
        });
    }

    let render = &config.render;
    if !(render.min_zoom.is_finite() && render.max_zoom.is_finite()) {
        return Err(ConfigError::Validation {
            message: "render zoom bounds must be finite".to_string(),
        });
    }
    if render.min_zoom > render.max_zoom {
        return Err(ConfigError::Validation {
            message: format!(
                "render.min_zoom ({}) exceeds render.max_zoom ({})",
                render.min_zoom, render.max_zoom
            ),
        });
    }

    if config.extraction.chunk_size == 0 || config.extraction.large_file_chunk_size == 0 {
        return Err(ConfigError::Validation {
            message: "extraction chunk sizes must be at least 1".to_string(),
        });
    }

    if config.upload.allowed_extensions.is_empty() {
        return Err(ConfigError::Validation {
            message: "upload.allowed_extensions must not be empty".to_string(),
        });
    }

    if config
        .server
        .bind_address
        .parse::<std::net::SocketAddr>()
        .is_err()
    {
        return Err(ConfigError::Validation {
            message: format!("Invalid server.bind_address: {}", config.server.bind_address),
        });
    }

    Ok(())
}
