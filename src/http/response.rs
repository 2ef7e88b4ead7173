//! Conversion between axum responses and [`ResponseEnvelope`]s.
//!
//! Only status, headers and body travel through the envelope; version and
//! extensions stay in the retained [`Parts`].

use axum::body::Body;
use axum::http::response::Parts;
use axum::response::Response;

use crate::rewrite::{FragmentStream, ResponseBody, ResponseEnvelope};

/// Split a response, exposing its body as a fragment stream.
pub fn into_envelope(response: Response) -> (Parts, ResponseEnvelope) {
    let (mut parts, body) = response.into_parts();
    let envelope = ResponseEnvelope {
        status: parts.status,
        headers: std::mem::take(&mut parts.headers),
        body: ResponseBody::Sequenced(FragmentStream::new(body.into_data_stream())),
    };
    (parts, envelope)
}

/// Put an envelope back into the parts it was split from.
pub fn from_envelope(mut parts: Parts, envelope: ResponseEnvelope) -> Response {
    parts.status = envelope.status;
    parts.headers = envelope.headers;
    let body = match envelope.body {
        ResponseBody::Buffered(bytes) => Body::from(bytes),
        ResponseBody::Sequenced(fragments) => Body::from_stream(fragments),
    };
    Response::from_parts(parts, body)
}
