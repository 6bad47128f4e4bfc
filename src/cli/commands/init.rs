//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file.

use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "helpdesk-export.toml")]
    pub output: String,

    /// Include example values and comments
    #[arg(long)]
    pub with_examples: bool,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        if Path::new(&self.output).exists() && !self.force {
            println!("Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(2);
        }

        let config_content = if self.with_examples {
            Self::generate_config_with_examples()
        } else {
            Self::generate_minimal_config()
        };

        match fs::write(&self.output, config_content) {
            Ok(_) => {
                println!("Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Edit {} with your settings", self.output);
                println!("  2. Set store.backend to 'postgresql', 'json' or 'memory'");
                println!("  3. Create a .env file with HELPDESK_TOKEN_SECRET (32+ characters)");
                println!("     and HELPDESK_PG_URL if using PostgreSQL");
                println!("  4. Validate configuration: helpdesk-export validate-config");
                println!("  5. Start the API: helpdesk-export serve");
                println!();
                Ok(0)
            }
            Err(e) => {
                println!("Failed to write configuration file");
                println!("   Error: {e}");
                Ok(5)
            }
        }
    }

    /// Generate minimal configuration
    fn generate_minimal_config() -> String {
        r#"# helpdesk-export configuration

[application]
log_level = "info"

[server]
host = "127.0.0.1"
port = 8080
public_url = "http://127.0.0.1:8080"

[export]
artifact_dir = "./exports"
date_format = "%B %-d, %Y"

[store]
backend = "postgresql"  # postgresql | json | memory

[postgresql]
connection_string = "${HELPDESK_PG_URL}"
max_connections = 10
ssl_mode = "prefer"

[security]
token_secret = "${HELPDESK_TOKEN_SECRET}"

[logging]
local_enabled = true
local_path = "./logs"
local_rotation = "daily"
"#
        .to_string()
    }

    /// Generate configuration with examples and comments
    fn generate_config_with_examples() -> String {
        r#"# helpdesk-export configuration
#
# Every value below can also be overridden with an environment variable of
# the form HELPDESK_<SECTION>_<KEY>, e.g. HELPDESK_SERVER_PORT=9000.

# ============================================================================
# Application Settings
# ============================================================================
[application]
# Log level (trace, debug, info, warn, error)
log_level = "info"

# ============================================================================
# HTTP Server
# ============================================================================
[server]
# Bind address
host = "127.0.0.1"
port = 8080

# Base URL clients use to reach this service; download links are built from it
public_url = "http://127.0.0.1:8080"

# ============================================================================
# Export Settings
# ============================================================================
[export]
# Directory for partial and finalized CSV artifacts
artifact_dir = "./exports"

# chrono format for date columns, e.g. "March 5, 2024"
date_format = "%B %-d, %Y"

# ============================================================================
# Record Store
# ============================================================================
[store]
# postgresql: read customers and tickets from the kbs_* tables
# json:       read them from a fixture file (re-read on every step)
# memory:     an empty in-process store
backend = "postgresql"

# Required for the json backend
# json_path = "./fixtures/helpdesk.json"

# Where the json backend writes imported settings
# (defaults to <fixture>.settings.json)
# settings_path = "./fixtures/helpdesk.settings.json"

[postgresql]
# Connection string format: postgresql://[user[:password]@][host][:port][/dbname]
connection_string = "${HELPDESK_PG_URL}"

# Connection pool settings
max_connections = 10                # 1-100
connection_timeout_seconds = 30     # Timeout for acquiring a connection
statement_timeout_seconds = 60      # Timeout for each SQL statement

# TLS mode: disable | prefer | require
ssl_mode = "prefer"

# Schema: psql -d helpdesk -f migrations/001_initial_schema.sql

# ============================================================================
# Security
# ============================================================================
[security]
# HMAC key for anti-forgery tokens and download links (32+ characters)
token_secret = "${HELPDESK_TOKEN_SECRET}"

# Token lifetime in seconds
token_ttl_seconds = 86400

# Download link lifetime in seconds
download_ttl_seconds = 3600

# ============================================================================
# Logging
# ============================================================================
[logging]
# JSON log file with rotation, in addition to the console
local_enabled = true
local_path = "./logs"

# Rotation: daily | hourly | never
local_rotation = "daily"
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HelpdeskConfig;
    use tempfile::TempDir;

    #[test]
    fn test_init_args_defaults() {
        let args = InitArgs {
            output: "helpdesk-export.toml".to_string(),
            with_examples: false,
            force: false,
        };

        assert_eq!(args.output, "helpdesk-export.toml");
        assert!(!args.with_examples);
        assert!(!args.force);
    }

    #[test]
    fn test_generated_configs_parse() {
        for content in [
            InitArgs::generate_minimal_config(),
            InitArgs::generate_config_with_examples(),
        ] {
            let config: HelpdeskConfig = toml::from_str(&content).unwrap();
            assert_eq!(config.server.port, 8080);
            assert_eq!(config.export.date_format, "%B %-d, %Y");
        }
    }

    #[tokio::test]
    async fn test_refuses_to_overwrite_without_force() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("helpdesk-export.toml");
        fs::write(&path, "existing").unwrap();

        let mut args = InitArgs {
            output: path.to_string_lossy().into_owned(),
            with_examples: false,
            force: false,
        };
        assert_eq!(args.execute().await.unwrap(), 2);
        assert_eq!(fs::read_to_string(&path).unwrap(), "existing");

        args.force = true;
        assert_eq!(args.execute().await.unwrap(), 0);
        assert!(fs::read_to_string(&path).unwrap().contains("[store]"));
    }
}
