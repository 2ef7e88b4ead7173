//! Response rewriting pipeline.
//!
//! # Data Flow
//! ```text
//! ResponseEnvelope (status, headers, body)
//!     → gate.rs (200 + text/html + not attachment?)
//!         no  → passthrough, body untouched
//!         yes → body.rs (materialize once, release stream)
//!             → engine.rs + markup.rs (beacon after <body>, then script before </head>)
//!             → assemble.rs (Content-Length from final buffer)
//!     → cookie.rs (UUID cookie appended on every response)
//! ```
//!
//! The pipeline is transport agnostic; `http::middleware` adapts it to axum.

pub mod assemble;
pub mod body;
pub mod cookie;
pub mod engine;
pub mod gate;
pub mod markup;

use axum::http::{HeaderMap, StatusCode};
use chrono::{DateTime, Utc};

use crate::config::TrackingConfig;
use crate::identity::VisitorIdentity;
use crate::observability::metrics;

pub use body::{materialize, BodyError, BoxError, FragmentStream, ResponseBody};
pub use engine::{inject, Injection, InjectionMarker, MarkerKind};
pub use gate::{eligible, Ineligible};
pub use markup::MarkupBuilder;

/// Status, headers and body of one response.
#[derive(Debug)]
pub struct ResponseEnvelope {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: ResponseBody,
}

impl ResponseEnvelope {
    pub fn new(status: StatusCode, headers: HeaderMap, body: impl Into<ResponseBody>) -> Self {
        Self {
            status,
            headers,
            body: body.into(),
        }
    }
}

/// The per-request transform. Holds only immutable, process-wide state.
#[derive(Debug, Clone)]
pub struct Pipeline {
    markup: MarkupBuilder,
    cookie_lifetime_secs: u64,
}

impl Pipeline {
    pub fn new(config: &TrackingConfig) -> Result<Self, url::ParseError> {
        Ok(Self {
            markup: MarkupBuilder::new(config)?,
            cookie_lifetime_secs: config.cookie_lifetime_secs,
        })
    }

    pub fn markup(&self) -> &MarkupBuilder {
        &self.markup
    }

    /// Gate check with logging; a rejection counts as a passthrough.
    pub fn admits(&self, status: StatusCode, headers: &HeaderMap) -> bool {
        match gate::check(status, headers) {
            Ok(()) => true,
            Err(reason) => {
                tracing::debug!(%reason, "Response not rewritten");
                metrics::record_outcome(metrics::Outcome::Passthrough);
                false
            }
        }
    }

    /// Materialize, inject and reassemble an envelope the gate admitted.
    pub async fn rewrite(
        &self,
        envelope: ResponseEnvelope,
        identity: &VisitorIdentity,
    ) -> Result<ResponseEnvelope, BodyError> {
        let ResponseEnvelope {
            status,
            headers,
            body,
        } = envelope;

        let document = match materialize(body).await {
            Ok(document) => document,
            Err(e) => {
                metrics::record_outcome(metrics::Outcome::Failed);
                return Err(e);
            }
        };

        let Injection { document, applied } = inject(document, &self.markup.markers(identity));
        for kind in &applied {
            metrics::record_injection(*kind);
        }
        metrics::record_outcome(metrics::Outcome::Rewritten);
        tracing::debug!(
            markers = ?applied,
            length = document.len(),
            "Response rewritten"
        );

        Ok(assemble::assemble(status, headers, document))
    }

    /// Rewrite an admitted envelope and append the identity cookie.
    ///
    /// Shared tail of [`Pipeline::process`] and the axum middleware, which
    /// runs the gate itself so rejected bodies are never wrapped.
    pub async fn rewrite_and_persist(
        &self,
        envelope: ResponseEnvelope,
        identity: &VisitorIdentity,
    ) -> Result<ResponseEnvelope, BodyError> {
        let mut envelope = self.rewrite(envelope, identity).await?;
        self.persist_identity(&mut envelope.headers, identity);
        Ok(envelope)
    }

    /// Append the identity cookie, expiring relative to the current time.
    pub fn persist_identity(&self, headers: &mut HeaderMap, identity: &VisitorIdentity) {
        self.persist_identity_at(headers, identity, Utc::now());
    }

    pub fn persist_identity_at(
        &self,
        headers: &mut HeaderMap,
        identity: &VisitorIdentity,
        now: DateTime<Utc>,
    ) {
        cookie::append_identity_cookie(headers, identity, now, self.cookie_lifetime_secs);
    }

    /// Run the whole transform on one envelope.
    ///
    /// Ineligible envelopes come back with their body untouched. The
    /// identity cookie is appended either way.
    pub async fn process(
        &self,
        envelope: ResponseEnvelope,
        identity: &VisitorIdentity,
    ) -> Result<ResponseEnvelope, BodyError> {
        if self.admits(envelope.status, &envelope.headers) {
            return self.rewrite_and_persist(envelope, identity).await;
        }
        let mut envelope = envelope;
        self.persist_identity(&mut envelope.headers, identity);
        Ok(envelope)
    }
}
