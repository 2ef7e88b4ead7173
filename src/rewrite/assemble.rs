//! Reassembly of a rewritten response.

use axum::body::Bytes;
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};

use crate::rewrite::{ResponseBody, ResponseEnvelope};

/// Rebuild an envelope around a single buffer, fixing up length framing.
///
/// `Content-Length` always matches `body`; `Transfer-Encoding` is dropped
/// since the body is no longer streamed. Other headers are untouched.
pub fn assemble(status: StatusCode, mut headers: HeaderMap, body: Bytes) -> ResponseEnvelope {
    headers.remove(header::TRANSFER_ENCODING);
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(body.len()));

    ResponseEnvelope {
        status,
        headers,
        body: ResponseBody::Buffered(body),
    }
}

/// Drop length framing that no longer describes the body a GET would carry.
pub fn drop_length_framing(headers: &mut HeaderMap) {
    headers.remove(header::CONTENT_LENGTH);
    headers.remove(header::TRANSFER_ENCODING);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_length_recomputed() {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_LENGTH, HeaderValue::from_static("4"));
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/html"));
        headers.insert(header::TRANSFER_ENCODING, HeaderValue::from_static("chunked"));

        let envelope = assemble(StatusCode::OK, headers, Bytes::from_static(b"longer body"));

        assert_eq!(envelope.headers[header::CONTENT_LENGTH], "11");
        assert_eq!(envelope.headers[header::CONTENT_TYPE], "text/html");
        assert!(envelope.headers.get(header::TRANSFER_ENCODING).is_none());
        assert!(matches!(envelope.body, ResponseBody::Buffered(ref b) if b == "longer body"));
    }

    #[test]
    fn test_drop_length_framing_keeps_other_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_LENGTH, HeaderValue::from_static("41"));
        headers.insert(header::TRANSFER_ENCODING, HeaderValue::from_static("chunked"));
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/html"));

        drop_length_framing(&mut headers);

        assert!(headers.get(header::CONTENT_LENGTH).is_none());
        assert!(headers.get(header::TRANSFER_ENCODING).is_none());
        assert_eq!(headers[header::CONTENT_TYPE], "text/html");
    }

    #[test]
    fn test_content_length_added_when_missing() {
        let envelope = assemble(StatusCode::OK, HeaderMap::new(), Bytes::new());
        assert_eq!(envelope.headers[header::CONTENT_LENGTH], "0");
    }
}
