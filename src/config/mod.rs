//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → InjectorConfig (validated, immutable)
//!     → shared via Arc to the server and the tracking middleware
//! ```
//!
//! Config is loaded once at startup and never mutated; a change needs a
//! restart.

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, read_config, ConfigError};
pub use schema::{
    InjectorConfig, ListenerConfig, LogFormat, ObservabilityConfig, TimeoutConfig,
    TrackingConfig, UpstreamConfig,
};
pub use validation::{validate_config, ValidationError};
