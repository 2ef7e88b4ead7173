//! Configuration validation.
//!
//! Serde handles the syntax; this checks the values. All errors are
//! reported, not just the first.

use std::net::SocketAddr;
use thiserror::Error;
use url::Url;

use crate::config::schema::InjectorConfig;

/// A single semantic problem in a loaded configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("tracking.site_slug must not be empty")]
    EmptySiteSlug,

    #[error("tracking.integration_script_url must not be empty")]
    EmptyIntegrationUrl,

    #[error("tracking.beacon_base_url {url:?} is not a valid URL: {reason}")]
    InvalidBeaconUrl { url: String, reason: String },

    #[error("tracking.cookie_lifetime_secs must be greater than zero")]
    ZeroCookieLifetime,

    #[error("{field} {value:?} is not a socket address")]
    InvalidAddress { field: &'static str, value: String },

    #[error("timeouts.request_secs must be greater than zero")]
    ZeroRequestTimeout,
}

/// Validate a configuration, collecting every error.
pub fn validate_config(config: &InjectorConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let tracking = &config.tracking;

    if tracking.site_slug.is_empty() {
        errors.push(ValidationError::EmptySiteSlug);
    }
    if tracking.integration_script_url.is_empty() {
        errors.push(ValidationError::EmptyIntegrationUrl);
    }
    if let Err(e) = Url::parse(&tracking.beacon_base_url) {
        errors.push(ValidationError::InvalidBeaconUrl {
            url: tracking.beacon_base_url.clone(),
            reason: e.to_string(),
        });
    }
    if tracking.cookie_lifetime_secs == 0 {
        errors.push(ValidationError::ZeroCookieLifetime);
    }

    for (field, value) in [
        ("listener.bind_address", &config.listener.bind_address),
        ("upstream.address", &config.upstream.address),
    ] {
        if value.parse::<SocketAddr>().is_err() {
            errors.push(ValidationError::InvalidAddress {
                field,
                value: value.clone(),
            });
        }
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroRequestTimeout);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
