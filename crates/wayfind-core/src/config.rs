use thiserror::Error;

use crate::app_config::{AppConfig, Environment};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required env var: {0}")]
    MissingEnvVar(String),

    #[error("invalid env var {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read category table {path}: {source}")]
    CategoryFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse category table: {0}")]
    CategoryFileParse(#[source] serde_yaml::Error),

    #[error("config validation failed: {0}")]
    Validation(String),
}

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the
/// process, without touching `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// The parsing/validation logic is decoupled from the real environment so it
/// can be tested with a plain `HashMap` lookup — no `set_var`/`remove_var`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_f64 = |var: &str, default: &str| -> Result<f64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<f64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_bool = |var: &str, default: &str| -> Result<bool, ConfigError> {
        let raw = or_default(var, default);
        match raw.as_str() {
            "true" | "1" | "yes" => Ok(true),
            "false" | "0" | "no" => Ok(false),
            other => Err(ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: format!("expected boolean, got '{other}'"),
            }),
        }
    };

    let env = parse_environment(&or_default("WAYFIND_ENV", "development"));
    let bind_addr = parse_addr("WAYFIND_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("WAYFIND_LOG_LEVEL", "info");
    let categories_path = lookup("WAYFIND_CATEGORIES_PATH").ok().map(PathBuf::from);

    let routing_base_url = or_default("WAYFIND_ROUTING_URL", "https://api.openrouteservice.org");
    let routing_api_key = lookup("WAYFIND_ROUTING_API_KEY").ok();
    let overpass_base_url = or_default(
        "WAYFIND_OVERPASS_URL",
        "https://overpass-api.de/api/interpreter",
    );
    let nominatim_base_url =
        or_default("WAYFIND_NOMINATIM_URL", "https://nominatim.openstreetmap.org");

    let llm_base_url = or_default("WAYFIND_LLM_URL", "http://localhost:11434/v1");
    let llm_api_key = lookup("WAYFIND_LLM_API_KEY").ok();
    let llm_model = or_default("WAYFIND_LLM_MODEL", "llama3.1:8b");
    let llm_enabled = parse_bool("WAYFIND_LLM_ENABLED", "true")?;

    let heavy_timeout_secs = parse_u64("WAYFIND_HEAVY_TIMEOUT_SECS", "30")?;
    let light_timeout_secs = parse_u64("WAYFIND_LIGHT_TIMEOUT_SECS", "5")?;

    let geocode_country = or_default("WAYFIND_GEOCODE_COUNTRY", "us");
    let default_city = or_default("WAYFIND_DEFAULT_CITY", "Houston");
    let default_state = or_default("WAYFIND_DEFAULT_STATE", "TX");
    let fallback_lat = parse_f64("WAYFIND_FALLBACK_LAT", "29.7604")?;
    let fallback_lng = parse_f64("WAYFIND_FALLBACK_LNG", "-95.3698")?;

    let user_agent = or_default("WAYFIND_USER_AGENT", "wayfind/0.1 (place-search)");

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        categories_path,
        routing_base_url,
        routing_api_key,
        overpass_base_url,
        nominatim_base_url,
        llm_base_url,
        llm_api_key,
        llm_model,
        llm_enabled,
        heavy_timeout_secs,
        light_timeout_secs,
        geocode_country,
        default_city,
        default_state,
        fallback_lat,
        fallback_lng,
        user_agent,
    })
}

/// Parse a string into an `Environment` variant.
///
/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::env::VarError;

    use super::*;

    fn lookup_from_map<'a>(
        map: &'a HashMap<&'a str, &'a str>,
    ) -> impl Fn(&str) -> Result<String, VarError> + 'a {
        move |key| {
            map.get(key)
                .map(|v| (*v).to_string())
                .ok_or(VarError::NotPresent)
        }
    }

    #[test]
    fn parse_environment_unknown_defaults_to_development() {
        assert_eq!(parse_environment("unknown"), Environment::Development);
        assert_eq!(parse_environment("production"), Environment::Production);
    }

    #[test]
    fn empty_env_builds_with_defaults() {
        let map: HashMap<&str, &str> = HashMap::new();
        let config = build_app_config(lookup_from_map(&map)).expect("defaults should suffice");
        assert_eq!(config.heavy_timeout_secs, 30);
        assert_eq!(config.light_timeout_secs, 5);
        assert!(config.llm_enabled);
        assert!((config.fallback_lat - 29.7604).abs() < 1e-9);
        assert_eq!(config.geocode_country, "us");
    }

    #[test]
    fn invalid_bind_addr_is_rejected() {
        let mut map: HashMap<&str, &str> = HashMap::new();
        map.insert("WAYFIND_BIND_ADDR", "not-an-addr");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "WAYFIND_BIND_ADDR"),
            "expected InvalidEnvVar(WAYFIND_BIND_ADDR), got: {result:?}"
        );
    }

    #[test]
    fn invalid_bool_is_rejected() {
        let mut map: HashMap<&str, &str> = HashMap::new();
        map.insert("WAYFIND_LLM_ENABLED", "maybe");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "WAYFIND_LLM_ENABLED")
        );
    }

    #[test]
    fn llm_can_be_disabled() {
        let mut map: HashMap<&str, &str> = HashMap::new();
        map.insert("WAYFIND_LLM_ENABLED", "false");
        let config = build_app_config(lookup_from_map(&map)).unwrap();
        assert!(!config.llm_enabled);
    }

    #[test]
    fn fallback_location_is_overridable() {
        let mut map: HashMap<&str, &str> = HashMap::new();
        map.insert("WAYFIND_FALLBACK_LAT", "40.7128");
        map.insert("WAYFIND_FALLBACK_LNG", "-74.0060");
        let config = build_app_config(lookup_from_map(&map)).unwrap();
        assert!((config.fallback_lat - 40.7128).abs() < 1e-9);
        assert!((config.fallback_lng + 74.0060).abs() < 1e-9);
    }
}
