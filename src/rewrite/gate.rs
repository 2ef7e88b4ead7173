//! Rewrite eligibility.
//!
//! A response is rewritten only when all of these hold:
//! - status is exactly `200 OK`
//! - `Content-Type` contains `text/html` (case-sensitive substring, no MIME parsing)
//! - `Content-Disposition` is absent or does not contain `attachment`
//!
//! Anything else passes through without its body being touched.

use std::fmt;

use axum::http::{header, HeaderMap, HeaderName, StatusCode};

/// Why a response was left alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ineligible {
    Status(StatusCode),
    NotHtml,
    Attachment,
}

impl fmt::Display for Ineligible {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ineligible::Status(status) => write!(f, "status {}", status.as_u16()),
            Ineligible::NotHtml => f.write_str("content type is not text/html"),
            Ineligible::Attachment => f.write_str("served as attachment"),
        }
    }
}

/// Decide whether a response may be rewritten, naming the first failed check.
pub fn check(status: StatusCode, headers: &HeaderMap) -> Result<(), Ineligible> {
    if status != StatusCode::OK {
        return Err(Ineligible::Status(status));
    }
    if !header_contains(headers, &header::CONTENT_TYPE, "text/html") {
        return Err(Ineligible::NotHtml);
    }
    if header_contains(headers, &header::CONTENT_DISPOSITION, "attachment") {
        return Err(Ineligible::Attachment);
    }
    Ok(())
}

/// Pure predicate form of [`check`].
pub fn eligible(status: StatusCode, headers: &HeaderMap) -> bool {
    check(status, headers).is_ok()
}

fn header_contains(headers: &HeaderMap, name: &HeaderName, needle: &str) -> bool {
    headers
        .get(name)
        .map(|value| String::from_utf8_lossy(value.as_bytes()))
        .is_some_and(|value| value.contains(needle))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(HeaderName, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(name.clone(), HeaderValue::from_static(value));
        }
        map
    }

    #[test]
    fn test_html_ok_is_eligible() {
        let h = headers(&[(header::CONTENT_TYPE, "text/html; charset=utf-8")]);
        assert!(eligible(StatusCode::OK, &h));
    }

    #[test]
    fn test_json_is_not_eligible() {
        let h = headers(&[(header::CONTENT_TYPE, "application/json")]);
        assert_eq!(check(StatusCode::OK, &h), Err(Ineligible::NotHtml));
    }

    #[test]
    fn test_attachment_is_not_eligible() {
        let h = headers(&[
            (header::CONTENT_TYPE, "text/html"),
            (header::CONTENT_DISPOSITION, "attachment; filename=x"),
        ]);
        assert_eq!(check(StatusCode::OK, &h), Err(Ineligible::Attachment));
    }

    #[test]
    fn test_inline_disposition_is_eligible() {
        let h = headers(&[
            (header::CONTENT_TYPE, "text/html"),
            (header::CONTENT_DISPOSITION, "inline"),
        ]);
        assert!(eligible(StatusCode::OK, &h));
    }

    #[test]
    fn test_non_200_is_not_eligible() {
        let h = headers(&[(header::CONTENT_TYPE, "text/html")]);
        for status in [
            StatusCode::FOUND,
            StatusCode::NOT_MODIFIED,
            StatusCode::CREATED,
            StatusCode::NOT_FOUND,
            StatusCode::INTERNAL_SERVER_ERROR,
        ] {
            assert_eq!(check(status, &h), Err(Ineligible::Status(status)));
        }
    }

    #[test]
    fn test_missing_content_type() {
        assert!(!eligible(StatusCode::OK, &HeaderMap::new()));
    }

    #[test]
    fn test_content_type_match_is_case_sensitive() {
        let h = headers(&[(header::CONTENT_TYPE, "TEXT/HTML")]);
        assert!(!eligible(StatusCode::OK, &h));
    }
}
