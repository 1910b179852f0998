//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (attempts >= 1, timeouts > 0)
//! - Check endpoint URLs and the recipient address parse
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: TransferConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::str::FromStr;

use solana_sdk::pubkey::Pubkey;

use crate::config::schema::TransferConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Validate a configuration, collecting every problem found.
pub fn validate_config(config: &TransferConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.key_env_var.trim().is_empty() {
        errors.push(ValidationError::new("key_env_var", "must not be empty"));
    }
    if config.deadline_secs == 0 {
        errors.push(ValidationError::new("deadline_secs", "must be greater than 0"));
    }

    check_rpc_url("network.rpc_url", &config.network.rpc_url, &mut errors);
    for (i, url) in config.network.failover_urls.iter().enumerate() {
        check_rpc_url(&format!("network.failover_urls[{}]", i), url, &mut errors);
    }
    if config.network.rpc_timeout_secs == 0 {
        errors.push(ValidationError::new("network.rpc_timeout_secs", "must be greater than 0"));
    }
    if !config.network.explorer_url_template.contains("{signature}") {
        errors.push(ValidationError::new(
            "network.explorer_url_template",
            "must contain a {signature} placeholder",
        ));
    }

    if config.transfer.lamports == 0 {
        errors.push(ValidationError::new("transfer.lamports", "must be greater than 0"));
    }
    let recipient = config.transfer.recipient.trim();
    if !recipient.is_empty() && Pubkey::from_str(recipient).is_err() {
        errors.push(ValidationError::new(
            "transfer.recipient",
            format!("'{}' is not a valid base58 public key", recipient),
        ));
    }

    if config.retries.max_attempts == 0 {
        errors.push(ValidationError::new("retries.max_attempts", "must be at least 1"));
    }
    if config.retries.base_delay_ms > config.retries.max_delay_ms {
        errors.push(ValidationError::new(
            "retries.base_delay_ms",
            format!(
                "{} exceeds max_delay_ms {}",
                config.retries.base_delay_ms, config.retries.max_delay_ms
            ),
        ));
    }

    if config.confirmation.timeout_secs == 0 {
        errors.push(ValidationError::new("confirmation.timeout_secs", "must be greater than 0"));
    }
    if config.confirmation.poll_interval_ms == 0 {
        errors.push(ValidationError::new(
            "confirmation.poll_interval_ms",
            "must be greater than 0",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_rpc_url(field: &str, value: &str, errors: &mut Vec<ValidationError>) {
    match url::Url::parse(value) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        Ok(url) => errors.push(ValidationError::new(
            field,
            format!("unsupported scheme '{}'", url.scheme()),
        )),
        Err(e) => errors.push(ValidationError::new(field, format!("invalid URL '{}': {}", value, e))),
    }
}
