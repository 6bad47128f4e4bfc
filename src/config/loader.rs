//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::{HelpdeskConfig, StoreBackend};
use crate::domain::errors::HelpdeskError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into HelpdeskConfig
/// 4. Applies environment variable overrides (HELPDESK_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns an error if the file cannot be read, a referenced environment
/// variable is missing, TOML parsing fails or validation fails.
///
/// # Examples
///
/// ```no_run
/// use helpdesk_export::config::loader::load_config;
///
/// let config = load_config("helpdesk.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<HelpdeskConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(HelpdeskError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        HelpdeskError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let contents = substitute_env_vars(&contents)?;

    let mut config: HelpdeskConfig = toml::from_str(&contents)
        .map_err(|e| HelpdeskError::Configuration(format!("Failed to parse TOML: {}", e)))?;

    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        HelpdeskError::Configuration(format!("Configuration validation failed: {}", e))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are left untouched.
///
/// # Errors
///
/// Returns an error if a referenced environment variable is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| HelpdeskError::Other(format!("Invalid substitution pattern: {e}")))?;
    let mut result = String::new();
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{}}}", var_name);
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(HelpdeskError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

/// Applies environment variable overrides using HELPDESK_* prefix
///
/// Environment variables follow the pattern: HELPDESK_<SECTION>_<KEY>,
/// for example HELPDESK_SERVER_PORT or HELPDESK_STORE_BACKEND.
fn apply_env_overrides(config: &mut HelpdeskConfig) -> Result<()> {
    if let Ok(val) = std::env::var("HELPDESK_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }

    // Server overrides
    if let Ok(val) = std::env::var("HELPDESK_SERVER_HOST") {
        config.server.host = val;
    }
    if let Ok(val) = std::env::var("HELPDESK_SERVER_PORT") {
        if let Ok(port) = val.parse() {
            config.server.port = port;
        }
    }
    if let Ok(val) = std::env::var("HELPDESK_SERVER_PUBLIC_URL") {
        config.server.public_url = val;
    }

    // Export overrides
    if let Ok(val) = std::env::var("HELPDESK_EXPORT_ARTIFACT_DIR") {
        config.export.artifact_dir = val;
    }
    if let Ok(val) = std::env::var("HELPDESK_EXPORT_DATE_FORMAT") {
        config.export.date_format = val;
    }

    // Store overrides
    if let Ok(val) = std::env::var("HELPDESK_STORE_BACKEND") {
        config.store.backend = match val.to_lowercase().as_str() {
            "postgresql" => StoreBackend::PostgreSQL,
            "json" => StoreBackend::Json,
            "memory" => StoreBackend::Memory,
            other => {
                return Err(HelpdeskError::Configuration(format!(
                    "Invalid HELPDESK_STORE_BACKEND '{other}'. Must be one of: postgresql, json, memory"
                )))
            }
        };
    }
    if let Ok(val) = std::env::var("HELPDESK_STORE_JSON_PATH") {
        config.store.json_path = Some(val);
    }
    if let Ok(val) = std::env::var("HELPDESK_STORE_SETTINGS_PATH") {
        config.store.settings_path = Some(val);
    }

    // PostgreSQL overrides (only if PostgreSQL is configured)
    if let Some(ref mut pg_config) = config.postgresql {
        if let Ok(val) = std::env::var("HELPDESK_POSTGRESQL_CONNECTION_STRING") {
            pg_config.connection_string = crate::config::secret_string(val);
        }
        if let Ok(val) = std::env::var("HELPDESK_POSTGRESQL_MAX_CONNECTIONS") {
            if let Ok(max) = val.parse() {
                pg_config.max_connections = max;
            }
        }
        if let Ok(val) = std::env::var("HELPDESK_POSTGRESQL_SSL_MODE") {
            pg_config.ssl_mode = val;
        }
    }

    // Security overrides
    if let Ok(val) = std::env::var("HELPDESK_SECURITY_TOKEN_SECRET") {
        config.security.token_secret = crate::config::secret_string(val);
    }
    if let Ok(val) = std::env::var("HELPDESK_SECURITY_TOKEN_TTL_SECONDS") {
        if let Ok(ttl) = val.parse() {
            config.security.token_ttl_seconds = ttl;
        }
    }
    if let Ok(val) = std::env::var("HELPDESK_SECURITY_DOWNLOAD_TTL_SECONDS") {
        if let Ok(ttl) = val.parse() {
            config.security.download_ttl_seconds = ttl;
        }
    }

    // Logging overrides
    if let Ok(val) = std::env::var("HELPDESK_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = val.parse().unwrap_or(true);
    }
    if let Ok(val) = std::env::var("HELPDESK_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_substitute_env_vars() {
        std::env::set_var("HELPDESK_LOADER_TEST_VAR", "test_value");
        let input = "token_secret = \"${HELPDESK_LOADER_TEST_VAR}\"";
        let result = substitute_env_vars(input).unwrap();
        assert_eq!(result, "token_secret = \"test_value\"\n");
        std::env::remove_var("HELPDESK_LOADER_TEST_VAR");
    }

    #[test]
    fn test_substitute_env_vars_skips_comments() {
        let input = "# token_secret = \"${HELPDESK_NEVER_SET_IN_TESTS}\"";
        let result = substitute_env_vars(input).unwrap();
        assert!(result.contains("${HELPDESK_NEVER_SET_IN_TESTS}"));
    }

    #[test]
    fn test_substitute_env_vars_missing() {
        std::env::remove_var("HELPDESK_MISSING_VAR");
        let input = "token_secret = \"${HELPDESK_MISSING_VAR}\"";
        let result = substitute_env_vars(input);
        assert!(result.is_err());
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config("nonexistent.toml");
        assert!(result.is_err());
    }

    #[test]
    fn test_load_config_valid() {
        let toml_content = r#"
[application]
log_level = "info"

[server]
port = 9090
public_url = "https://helpdesk.example.com"

[store]
backend = "memory"

[security]
token_secret = "0123456789abcdef0123456789abcdef"
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.server.public_url, "https://helpdesk.example.com");
        assert_eq!(config.store.backend, StoreBackend::Memory);
        assert_eq!(config.export.date_format, "%B %-d, %Y");
    }
}
