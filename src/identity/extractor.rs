//! Visitor identity resolution for an incoming request.
//!
//! Precedence is fixed: `UUID` query parameter, then `UUID` cookie, then the
//! resolver. Client supplied values are accepted as-is once non-empty.

use axum::http::{header, HeaderMap};
use percent_encoding::percent_decode_str;
use url::form_urlencoded;

use crate::identity::resolver::IdentityResolver;
use crate::identity::{IdentitySource, VisitorIdentity, UUID};

/// Resolves the [`VisitorIdentity`] of each request.
pub struct IdentityExtractor {
    resolver: Box<dyn IdentityResolver>,
}

impl IdentityExtractor {
    pub fn new(resolver: impl IdentityResolver + 'static) -> Self {
        Self {
            resolver: Box::new(resolver),
        }
    }

    /// Resolve the identity from the raw query string and request headers.
    pub fn extract(&self, query: Option<&str>, headers: &HeaderMap) -> VisitorIdentity {
        if let Some(value) = query.and_then(query_param) {
            return VisitorIdentity::new(value, IdentitySource::Query);
        }
        if let Some(value) = cookie_value(headers) {
            return VisitorIdentity::new(value, IdentitySource::Cookie);
        }
        VisitorIdentity::new(self.resolver.find_or_generate(), IdentitySource::Generated)
    }
}

/// Last non-empty `UUID` query parameter, decoded.
fn query_param(query: &str) -> Option<String> {
    form_urlencoded::parse(query.as_bytes())
        .filter(|(name, _)| name == UUID)
        .last()
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
}

/// First `UUID` cookie across all `Cookie` headers, percent-decoded.
fn cookie_value(headers: &HeaderMap) -> Option<String> {
    let raw = headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == UUID)
        .map(|(_, value)| value.trim())?;

    let plus_as_space = raw.replace('+', " ");
    let decoded = percent_decode_str(&plus_as_space).decode_utf8_lossy();
    if decoded.is_empty() {
        None
    } else {
        Some(decoded.into_owned())
    }
}
