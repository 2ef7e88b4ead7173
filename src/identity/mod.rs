//! Visitor identity subsystem.
//!
//! # Data Flow
//! ```text
//! incoming request
//!     → extractor.rs (query param → cookie → resolver)
//!     → VisitorIdentity (immutable for the request)
//!     → request extensions (read by handlers via the extractor impl)
//!     → rewrite::cookie persists it back on the response
//! ```

pub mod extractor;
pub mod resolver;

use std::fmt;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::StatusCode;

pub use extractor::IdentityExtractor;
pub use resolver::{IdentityResolver, UuidResolver};

/// Name of the query parameter and cookie carrying the identifier.
pub const UUID: &str = "UUID";

/// Where a request's identifier came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdentitySource {
    Query,
    Cookie,
    Generated,
}

impl IdentitySource {
    pub fn as_str(&self) -> &'static str {
        match self {
            IdentitySource::Query => "query",
            IdentitySource::Cookie => "cookie",
            IdentitySource::Generated => "generated",
        }
    }
}

/// Opaque per-browser identifier resolved for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisitorIdentity {
    value: String,
    source: IdentitySource,
}

impl VisitorIdentity {
    pub fn new(value: impl Into<String>, source: IdentitySource) -> Self {
        Self {
            value: value.into(),
            source,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    pub fn source(&self) -> IdentitySource {
        self.source
    }
}

impl fmt::Display for VisitorIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

/// Handlers behind the tracking middleware can take the identity as an argument.
impl<S: Send + Sync> FromRequestParts<S> for VisitorIdentity {
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<VisitorIdentity>()
            .cloned()
            .ok_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}
