use std::path::PathBuf;

use crate::app_config::AppConfig;
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a numeric value cannot be parsed.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a numeric value cannot be parsed.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Credentials are all optional: an unset or blank credential leaves the
/// corresponding engine or strategy out of the pipeline.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let or_default = |var: &str, default: &str| -> String {
        optional(var).unwrap_or_else(|| default.to_string())
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_i64 = |var: &str, default: &str| -> Result<i64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<i64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    Ok(AppConfig {
        firecrawl_api_key: optional("FIRECRAWL_API_KEY"),
        serper_api_key: optional("SERPER_API_KEY"),
        google_api_key: optional("GOOGLE_API_KEY"),
        google_search_engine_id: optional("GOOGLE_SEARCH_ENGINE_ID"),
        bing_api_key: optional("BING_API_KEY"),
        storage_path: PathBuf::from(or_default("COMPSCOUT_STORAGE_PATH", "./storage")),
        log_level: or_default("COMPSCOUT_LOG_LEVEL", "info"),
        request_timeout_secs: parse_u64("COMPSCOUT_REQUEST_TIMEOUT_SECS", "30")?,
        // Left signed: the orchestrator clamps whatever the operator asks for.
        batch_concurrency: parse_i64("COMPSCOUT_BATCH_CONCURRENCY", "1")?,
    })
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
