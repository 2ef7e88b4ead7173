//! Metrics collection and exposition.
//!
//! # Metrics
//! - `injector_responses_total` (counter): responses by `outcome`
//!   (`passthrough`, `rewritten`, `failed`)
//! - `injector_injections_total` (counter): applied markers by `marker`
//! - `injector_identity_total` (counter): resolved identities by `source`
//!
//! Without an installed recorder every call is a no-op.

use std::net::SocketAddr;

use metrics::counter;
use metrics_exporter_prometheus::PrometheusBuilder;

use crate::identity::IdentitySource;
use crate::rewrite::MarkerKind;

/// What the pipeline did with a response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Passthrough,
    Rewritten,
    Failed,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Passthrough => "passthrough",
            Outcome::Rewritten => "rewritten",
            Outcome::Failed => "failed",
        }
    }
}

/// Install the Prometheus recorder and its HTTP scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_outcome(outcome: Outcome) {
    counter!("injector_responses_total", "outcome" => outcome.as_str()).increment(1);
}

pub fn record_injection(kind: MarkerKind) {
    counter!("injector_injections_total", "marker" => kind.as_str()).increment(1);
}

pub fn record_identity(source: IdentitySource) {
    counter!("injector_identity_total", "source" => source.as_str()).increment(1);
}
