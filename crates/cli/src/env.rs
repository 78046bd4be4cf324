use std::collections::HashMap;
use std::fs;
use std::path::Path;

use connectors::source::{SourceConfig, SourceKind};

use crate::error::CliError;

pub const SOURCE_DB_USERNAME: &str = "SOURCE_DB_USERNAME";
pub const SOURCE_DB_PASSWORD: &str = "SOURCE_DB_PASSWORD";
pub const SOURCE_DB_HOSTNAME: &str = "SOURCE_DB_HOSTNAME";
pub const SOURCE_DB_PORT: &str = "SOURCE_DB_PORT";
pub const SOURCE_DB_INSTANCE: &str = "SOURCE_DB_INSTANCE";
pub const SOURCE_DB_SSLMODE: &str = "SOURCE_DB_SSLMODE";

/// Environment variables from the process, optionally overlaid by a .env file.
#[derive(Debug, Clone)]
pub struct EnvManager {
    vars: HashMap<String, String>,
}

impl EnvManager {
    pub fn new() -> Self {
        Self {
            vars: std::env::vars().collect(),
        }
    }

    /// Load variables from a .env file. File entries win over the process
    /// environment.
    pub fn load_from_file<P: AsRef<Path>>(&mut self, path: P) -> Result<(), CliError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            CliError::Config(format!("Failed to read env file {}: {}", path.display(), e))
        })?;

        self.parse_env_content(&content)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    fn require(&self, key: &str) -> Result<&str, CliError> {
        self.get(key)
            .ok_or_else(|| CliError::Config(format!("Environment variable {key} is not set")))
    }

    /// Source coordinates from the `SOURCE_DB_*` variables.
    pub fn source_config(&self, kind: SourceKind) -> Result<SourceConfig, CliError> {
        let port = self.require(SOURCE_DB_PORT)?;
        let port = port.parse::<u16>().map_err(|_| {
            CliError::Config(format!("{SOURCE_DB_PORT} must be a port number, got '{port}'"))
        })?;

        Ok(SourceConfig {
            kind,
            host: self.require(SOURCE_DB_HOSTNAME)?.to_string(),
            port,
            instance: self.require(SOURCE_DB_INSTANCE)?.to_string(),
            user: self.require(SOURCE_DB_USERNAME)?.to_string(),
            password: self.require(SOURCE_DB_PASSWORD)?.to_string(),
            ssl_mode: self.get(SOURCE_DB_SSLMODE).map(str::to_string),
        })
    }

    fn parse_env_content(&mut self, content: &str) -> Result<(), CliError> {
        for (line_num, line) in content.lines().enumerate() {
            let line = line.trim();

            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let line = line.strip_prefix("export ").unwrap_or(line);
            let Some((key, value)) = line.split_once('=') else {
                return Err(CliError::Config(format!(
                    "Invalid env file: malformed line {} (expected KEY=VALUE)",
                    line_num + 1
                )));
            };

            let key = key.trim();
            if key.is_empty() {
                return Err(CliError::Config(format!(
                    "Invalid env file: empty key at line {}",
                    line_num + 1
                )));
            }

            self.vars.insert(key.to_string(), Self::unquote_value(value));
        }

        Ok(())
    }

    fn unquote_value(value: &str) -> String {
        let value = value.trim();
        for quote in ['"', '\''] {
            if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
                return value[1..value.len() - 1].to_string();
            }
        }
        value.to_string()
    }
}

impl Default for EnvManager {
    fn default() -> Self {
        Self::new()
    }
}
