//! Configuration loader
//!
//! Loads client configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If the webhook URL is missing there, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `B24REST_WEBHOOK_URL`: Inbound webhook base URL (required)
//! - `B24REST_BATCH_SIZE`: Commands per batch call
//! - `B24REST_PAGE_SIZE`: Records per list page
//! - `B24REST_MAX_ITERATIONS`: Page ceiling for exhaustive fetches
//! - `B24REST_TIMEOUT_SECS`: HTTP timeout in seconds
//! - `B24REST_MAX_ATTEMPTS`: HTTP attempts per call
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./b24rest.json` or `./b24rest.toml` (current working directory)
//! 2. `./config.json` or `./config.toml` (current working directory)
//! 3. The same names in the parent and grandparent directories

use std::path::{Path, PathBuf};
use std::str::FromStr;

use b24rest_domain::{ClientConfig, RestError, Result};

const CONFIG_FILE_NAMES: [&str; 4] = ["b24rest.json", "b24rest.toml", "config.json", "config.toml"];

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables. If that fails,
/// falls back to loading from a config file. The result is validated.
///
/// # Errors
/// Returns `RestError::Config` if:
/// - Configuration cannot be loaded from either source
/// - File format is invalid
/// - Required fields are missing or limits are zero
pub fn load() -> Result<ClientConfig> {
    let config = match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            config
        }
        Err(e) => {
            tracing::debug!(error = ?e, "Failed to load from environment, trying file");
            load_from_file(None)?
        }
    };

    config.validate()?;
    Ok(config)
}

/// Load configuration from environment variables
///
/// `B24REST_WEBHOOK_URL` is required; every other variable falls back to
/// its default when unset.
///
/// # Errors
/// Returns `RestError::Config` if the webhook URL is missing or a numeric
/// variable does not parse.
pub fn load_from_env() -> Result<ClientConfig> {
    let mut config = ClientConfig::new(env_var("B24REST_WEBHOOK_URL")?);

    if let Some(value) = env_number("B24REST_BATCH_SIZE")? {
        config.batch_size = value;
    }
    if let Some(value) = env_number("B24REST_PAGE_SIZE")? {
        config.page_size = value;
    }
    if let Some(value) = env_number("B24REST_MAX_ITERATIONS")? {
        config.max_iterations = value;
    }
    if let Some(value) = env_number("B24REST_TIMEOUT_SECS")? {
        config.timeout_seconds = value;
    }
    if let Some(value) = env_number("B24REST_MAX_ATTEMPTS")? {
        config.max_attempts = value;
    }

    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `RestError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
pub fn load_from_file(path: Option<PathBuf>) -> Result<ClientConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(RestError::Config(format!("Config file not found: {}", p.display())));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            RestError::Config("No config file found in any of the standard locations".to_string())
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| RestError::Config(format!("Failed to read config file: {e}")))?;

    parse_config(&contents, &config_path)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
fn parse_config(contents: &str, path: &Path) -> Result<ClientConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| RestError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| RestError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(RestError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// Probe the working directory and its two parents for a config file
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    probe_from(&cwd)
}

fn probe_from(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .take(3)
        .flat_map(|dir| CONFIG_FILE_NAMES.iter().map(move |name| dir.join(name)))
        .find(|path| path.exists())
}

/// Get required environment variable
///
/// # Errors
/// Returns `RestError::Config` if the variable is not set or blank.
fn env_var(key: &str) -> Result<String> {
    std::env::var(key)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| RestError::Config(format!("Missing required environment variable: {key}")))
}

/// Parse an optional numeric environment variable
fn env_number<T: FromStr>(key: &str) -> Result<Option<T>>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| RestError::Config(format!("Invalid value for {key}: {e}"))),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Mutex;

    use once_cell::sync::Lazy;
    use tempfile::{NamedTempFile, TempDir};

    use super::*;

    static ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

    const ALL_VARS: [&str; 6] = [
        "B24REST_WEBHOOK_URL",
        "B24REST_BATCH_SIZE",
        "B24REST_PAGE_SIZE",
        "B24REST_MAX_ITERATIONS",
        "B24REST_TIMEOUT_SECS",
        "B24REST_MAX_ATTEMPTS",
    ];

    fn clear_env() {
        for key in ALL_VARS {
            std::env::remove_var(key);
        }
    }

    fn temp_config(contents: &str, extension: &str) -> (NamedTempFile, PathBuf) {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(contents.as_bytes()).unwrap();
        let path = temp_file.path().with_extension(extension);
        std::fs::copy(temp_file.path(), &path).unwrap();
        (temp_file, path)
    }

    #[test]
    fn test_load_from_env_all_vars_set() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        std::env::set_var("B24REST_WEBHOOK_URL", "https://portal.example/rest/1/abc/");
        std::env::set_var("B24REST_BATCH_SIZE", "25");
        std::env::set_var("B24REST_PAGE_SIZE", "10");
        std::env::set_var("B24REST_MAX_ITERATIONS", "500");
        std::env::set_var("B24REST_TIMEOUT_SECS", "5");
        std::env::set_var("B24REST_MAX_ATTEMPTS", "2");

        let result = load_from_env();
        clear_env();

        let config = result.expect("config from env");
        assert_eq!(config.webhook_url, "https://portal.example/rest/1/abc/");
        assert_eq!(config.batch_size, 25);
        assert_eq!(config.page_size, 10);
        assert_eq!(config.max_iterations, 500);
        assert_eq!(config.timeout_seconds, 5);
        assert_eq!(config.max_attempts, 2);
    }

    #[test]
    fn test_load_from_env_defaults_optional_vars() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        std::env::set_var("B24REST_WEBHOOK_URL", "https://portal.example/rest/1/abc/");
        let result = load_from_env();
        clear_env();

        assert_eq!(result.unwrap(), ClientConfig::new("https://portal.example/rest/1/abc/"));
    }

    #[test]
    fn test_load_from_env_missing_webhook() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        let err = load_from_env().unwrap_err();
        assert!(matches!(err, RestError::Config(_)), "Should be a Config error");
    }

    #[test]
    fn test_load_from_env_invalid_number() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        std::env::set_var("B24REST_WEBHOOK_URL", "https://portal.example/rest/1/abc/");
        std::env::set_var("B24REST_BATCH_SIZE", "many");
        let result = load_from_env();
        clear_env();

        match result {
            Err(RestError::Config(msg)) => assert!(msg.contains("B24REST_BATCH_SIZE")),
            other => panic!("expected config error, got {other:?}"),
        }
    }

    #[test]
    fn test_load_from_file_json() {
        let (_temp, path) = temp_config(
            r#"{"webhook_url": "https://portal.example/rest/1/abc/", "page_size": 20}"#,
            "json",
        );

        let config = load_from_file(Some(path.clone())).expect("config from JSON file");
        assert_eq!(config.page_size, 20);
        assert_eq!(config.batch_size, 50);

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_load_from_file_toml() {
        let (_temp, path) = temp_config(
            "webhook_url = \"https://portal.example/rest/1/abc/\"\nmax_attempts = 3\n",
            "toml",
        );

        let config = load_from_file(Some(path.clone())).expect("config from TOML file");
        assert_eq!(config.max_attempts, 3);

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_load_from_file_not_found() {
        let err = load_from_file(Some(PathBuf::from("/nonexistent/b24rest.json"))).unwrap_err();
        assert!(matches!(err, RestError::Config(_)), "Should be a Config error");
    }

    #[test]
    fn test_load_from_file_missing_webhook() {
        let (_temp, path) = temp_config(r#"{"page_size": 20}"#, "json");

        let result = load_from_file(Some(path.clone()));
        assert!(matches!(result, Err(RestError::Config(_))));

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_parse_config_unsupported_format() {
        let result = parse_config("webhook_url: x", &PathBuf::from("b24rest.yaml"));
        assert!(result.is_err(), "Should fail with unsupported format");
    }

    #[test]
    fn test_probe_prefers_named_file_and_walks_up() {
        let root = TempDir::new().unwrap();
        let nested = root.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();
        assert_eq!(probe_from(&nested), None);

        std::fs::write(root.path().join("config.toml"), "").unwrap();
        assert_eq!(probe_from(&nested), Some(root.path().join("config.toml")));

        std::fs::write(nested.join("b24rest.json"), "{}").unwrap();
        assert_eq!(probe_from(&nested), Some(nested.join("b24rest.json")));
    }
}
