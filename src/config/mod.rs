//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → CLI overrides (main.rs)
//!     → validation.rs (semantic checks)
//!     → TransferConfig (validated, immutable)
//!     → passed by value into the client, submitter and pipeline
//! ```
//!
//! # Design Decisions
//! - Config is explicit: nothing reads process-wide settings except main.rs
//! - All fields have defaults so a run needs no config file at all
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_dotenv, load_or_default, ConfigError};
pub use schema::{
    Commitment, ConfirmationConfig, NetworkConfig, ObservabilityConfig, RetryConfig,
    TransferConfig, TransferParams,
};
pub use validation::{validate_config, ValidationError};
