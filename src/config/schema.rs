//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from a TOML file.
//! Every field is defaulted so a minimal file (or none at all) works.

use serde::{Deserialize, Serialize};

/// Default base URL of the visitor sync beacon.
pub const DEFAULT_BEACON_BASE_URL: &str = "https://www.talkable.com/public/1x1.gif";

/// Twenty years of 365 days, in seconds.
pub const DEFAULT_COOKIE_LIFETIME_SECS: u64 = 20 * 365 * 24 * 60 * 60;

/// Root configuration for the injector.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct InjectorConfig {
    /// Values interpolated into the injected markup and identity cookie.
    pub tracking: TrackingConfig,

    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Origin server the binary forwards to.
    pub upstream: UpstreamConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Process-wide tracking settings, read-only after startup.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TrackingConfig {
    /// Site identifier pushed into the `_talkableq` init call.
    pub site_slug: String,

    /// External integration library loaded before `</head>`.
    pub integration_script_url: String,

    /// Base URL of the tracking pixel placed after `<body>`.
    pub beacon_base_url: String,

    /// Lifetime of the `UUID` cookie.
    pub cookie_lifetime_secs: u64,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            site_slug: String::new(),
            integration_script_url: String::new(),
            beacon_base_url: DEFAULT_BEACON_BASE_URL.to_string(),
            cookie_lifetime_secs: DEFAULT_COOKIE_LIFETIME_SECS,
        }
    }
}

impl TrackingConfig {
    /// Build a tracking config with the default beacon URL and cookie lifetime.
    pub fn new(site_slug: impl Into<String>, integration_script_url: impl Into<String>) -> Self {
        Self {
            site_slug: site_slug.into(),
            integration_script_url: integration_script_url.into(),
            ..Self::default()
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Upstream origin configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Origin address (e.g., "127.0.0.1:3000").
    pub address: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1:3000".to_string(),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Whole-request timeout in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub log_format: LogFormat,

    /// Expose a Prometheus scrape endpoint.
    pub metrics_enabled: bool,

    /// Address of the scrape endpoint.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_toml_uses_defaults() {
        let config: InjectorConfig = toml::from_str(
            r#"
            [tracking]
            site_slug = "acme"
            integration_script_url = "https://d2jjzw81hqbuqv.cloudfront.net/integration/acme.min.js"
            "#,
        )
        .unwrap();

        assert_eq!(config.tracking.site_slug, "acme");
        assert_eq!(config.tracking.beacon_base_url, DEFAULT_BEACON_BASE_URL);
        assert_eq!(config.tracking.cookie_lifetime_secs, 630_720_000);
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
        assert_eq!(config.observability.log_format, LogFormat::Pretty);
    }

    #[test]
    fn test_log_format_is_lowercase() {
        let config: InjectorConfig = toml::from_str(
            r#"
            [observability]
            log_format = "json"
            "#,
        )
        .unwrap();
        assert_eq!(config.observability.log_format, LogFormat::Json);
    }
}
