//! Persistence of the visitor identity in a `UUID` cookie.

use axum::http::{header, HeaderMap, HeaderValue};
use chrono::{DateTime, TimeDelta, Utc};
use url::form_urlencoded;

use crate::identity::{VisitorIdentity, UUID};

/// `Set-Cookie` value for `identity` expiring at `expires`.
///
/// The identifier is form-url-encoded so that any client supplied value
/// yields a valid header.
pub fn identity_cookie(identity: &VisitorIdentity, expires: DateTime<Utc>) -> String {
    let value: String = form_urlencoded::byte_serialize(identity.as_str().as_bytes()).collect();
    format!(
        "{UUID}={value}; path=/; expires={}",
        expires.format("%a, %d %b %Y %H:%M:%S GMT")
    )
}

/// Expiration `lifetime_secs` after `now`, saturating at the latest representable time.
pub fn expiration(now: DateTime<Utc>, lifetime_secs: u64) -> DateTime<Utc> {
    i64::try_from(lifetime_secs)
        .ok()
        .and_then(TimeDelta::try_seconds)
        .and_then(|lifetime| now.checked_add_signed(lifetime))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Append (never replace) the identity cookie to `headers`.
pub fn append_identity_cookie(
    headers: &mut HeaderMap,
    identity: &VisitorIdentity,
    now: DateTime<Utc>,
    lifetime_secs: u64,
) {
    let cookie = identity_cookie(identity, expiration(now, lifetime_secs));
    match HeaderValue::from_str(&cookie) {
        Ok(value) => {
            headers.append(header::SET_COOKIE, value);
        }
        Err(e) => {
            tracing::warn!(error = %e, "Skipping unrepresentable identity cookie");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::DEFAULT_COOKIE_LIFETIME_SECS;
    use crate::identity::IdentitySource;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 14, 12, 30, 0).unwrap()
    }

    #[test]
    fn test_twenty_year_expiration() {
        let expires = expiration(now(), DEFAULT_COOKIE_LIFETIME_SECS);
        assert_eq!((expires - now()).num_seconds(), 630_720_000);
        // 20 * 365 days lands five leap days short of the calendar date.
        assert_eq!(expires, Utc.with_ymd_and_hms(2046, 10, 9, 12, 30, 0).unwrap());
    }

    #[test]
    fn test_cookie_format() {
        let identity = VisitorIdentity::new("abc-123", IdentitySource::Generated);
        let cookie = identity_cookie(&identity, expiration(now(), DEFAULT_COOKIE_LIFETIME_SECS));
        assert_eq!(cookie, "UUID=abc-123; path=/; expires=Tue, 09 Oct 2046 12:30:00 GMT");
    }

    #[test]
    fn test_value_is_encoded() {
        let identity = VisitorIdentity::new("a b;c\r\n", IdentitySource::Query);
        let cookie = identity_cookie(&identity, now());
        assert!(cookie.starts_with("UUID=a+b%3Bc%0D%0A; path=/;"));
    }

    #[test]
    fn test_appends_without_replacing() {
        let mut headers = HeaderMap::new();
        headers.insert(header::SET_COOKIE, HeaderValue::from_static("session=1"));

        let identity = VisitorIdentity::new("v", IdentitySource::Cookie);
        append_identity_cookie(&mut headers, &identity, now(), 60);

        let cookies: Vec<_> = headers
            .get_all(header::SET_COOKIE)
            .iter()
            .map(|v| v.to_str().unwrap().to_string())
            .collect();
        assert_eq!(cookies.len(), 2);
        assert_eq!(cookies[0], "session=1");
        assert_eq!(cookies[1], "UUID=v; path=/; expires=Wed, 14 Oct 2026 12:31:00 GMT");
    }

    #[test]
    fn test_huge_lifetime_saturates() {
        assert_eq!(expiration(now(), u64::MAX), DateTime::<Utc>::MAX_UTC);
    }
}
