//! Visitor tracking middleware.
//!
//! Resolves the visitor identity, exposes it to the wrapped handler through
//! request extensions, then rewrites eligible HTML responses and appends
//! the identity cookie to every response.

use std::sync::Arc;

use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{Method, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::config::TrackingConfig;
use crate::http::response::{from_envelope, into_envelope};
use crate::identity::{IdentityExtractor, IdentityResolver, UuidResolver};
use crate::observability::metrics;
use crate::rewrite::{assemble, Pipeline};

/// Shared, read-only state of the tracking middleware.
#[derive(Clone)]
pub struct TrackingState {
    inner: Arc<TrackingInner>,
}

struct TrackingInner {
    extractor: IdentityExtractor,
    pipeline: Pipeline,
}

impl TrackingState {
    /// State minting UUID v4 identifiers for new visitors.
    pub fn new(config: &TrackingConfig) -> Result<Self, url::ParseError> {
        Self::with_resolver(config, UuidResolver)
    }

    pub fn with_resolver(
        config: &TrackingConfig,
        resolver: impl IdentityResolver + 'static,
    ) -> Result<Self, url::ParseError> {
        Ok(Self {
            inner: Arc::new(TrackingInner {
                extractor: IdentityExtractor::new(resolver),
                pipeline: Pipeline::new(config)?,
            }),
        })
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.inner.pipeline
    }
}

/// Middleware function, mounted with `axum::middleware::from_fn_with_state`.
pub async fn visitor_tracking_middleware(
    State(state): State<TrackingState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let identity = state
        .inner
        .extractor
        .extract(request.uri().query(), request.headers());
    metrics::record_identity(identity.source());
    tracing::debug!(visitor = %identity, source = identity.source().as_str(), "Visitor resolved");

    let head_request = request.method() == Method::HEAD;
    request.extensions_mut().insert(identity.clone());

    let mut response = next.run(request).await;
    let pipeline = &state.inner.pipeline;

    if !pipeline.admits(response.status(), response.headers()) {
        pipeline.persist_identity(response.headers_mut(), &identity);
        return response;
    }

    // A HEAD body is empty, so the rewritten GET length cannot be computed.
    // The body is swapped for one without an exact size hint so the router
    // does not restore the origin length.
    if head_request {
        assemble::drop_length_framing(response.headers_mut());
        *response.body_mut() =
            Body::from_stream(futures_util::stream::empty::<Result<Bytes, std::io::Error>>());
        metrics::record_outcome(metrics::Outcome::Passthrough);
        pipeline.persist_identity(response.headers_mut(), &identity);
        return response;
    }

    let (parts, envelope) = into_envelope(response);
    match pipeline.rewrite_and_persist(envelope, &identity).await {
        Ok(envelope) => from_envelope(parts, envelope),
        Err(e) => {
            tracing::error!(error = %e, visitor = %identity, "Failed to read response body");
            let mut response =
                (StatusCode::INTERNAL_SERVER_ERROR, "Failed to read response body").into_response();
            pipeline.persist_identity(response.headers_mut(), &identity);
            response
        }
    }
}
