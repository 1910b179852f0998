//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use crate::config::schema::TransferConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Validation(Vec<ValidationError>),
    /// A `.env` file exists but could not be loaded.
    Env(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Env(message) => write!(f, "Env file error: {}", message),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Parse configuration from TOML text without validating it.
pub fn parse_config(content: &str) -> Result<TransferConfig, ConfigError> {
    toml::from_str(content).map_err(ConfigError::Parse)
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<TransferConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config = parse_config(&content)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Load from `path` when given, otherwise start from defaults.
///
/// Callers that apply overrides afterwards must validate again.
pub fn load_or_default(path: Option<&Path>) -> Result<TransferConfig, ConfigError> {
    match path {
        Some(path) => {
            let config = load_config(path)?;
            tracing::debug!(path = %path.display(), "Configuration file loaded");
            Ok(config)
        }
        None => Ok(TransferConfig::default()),
    }
}

/// Load variables from the env file at `path` into the process environment.
///
/// Returns `Ok(false)` when the file does not exist. Any other failure is an
/// error, so a broken `.env` is not mistaken for an unset key later on.
pub fn load_dotenv(path: &Path) -> Result<bool, ConfigError> {
    match dotenvy::from_path(path) {
        Ok(()) => Ok(true),
        Err(e) if e.not_found() => Ok(false),
        Err(e) => Err(ConfigError::Env(format!(
            "{}: {}",
            path.display(),
            describe_dotenv_error(&e)
        ))),
    }
}

/// dotenvy's parse errors quote the whole line, which may hold the key.
fn describe_dotenv_error(e: &dotenvy::Error) -> String {
    match e {
        dotenvy::Error::LineParse(_, index) => {
            format!("could not parse a line (error at character {})", index)
        }
        dotenvy::Error::Io(e) => e.to_string(),
        dotenvy::Error::EnvVar(e) => e.to_string(),
        _ => "could not be loaded".to_string(),
    }
}
