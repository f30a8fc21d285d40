//! Client-side cookie jar
//!
//! The backend keeps the session in cookies: the JWT itself
//! (`access_token_cookie`) plus two liveness markers that the client may read.
//! `SessionCookies` is shared between reqwest (as its cookie provider) and the
//! client, which inspects it to decide whether a session is alive.

use parking_lot::RwLock;
use reqwest::cookie::CookieStore;
use reqwest::header::HeaderValue;
use std::collections::BTreeMap;

pub const USER_SESSION_COOKIE: &str = "user_session";
pub const SESSION_PERSISTENT_COOKIE: &str = "session_persistent";
pub const ACCESS_TOKEN_COOKIE: &str = "access_token_cookie";

/// Marker cookies and the value each must carry to count as alive
const LIVENESS_MARKERS: [(&str, &str); 2] = [
    (USER_SESSION_COOKIE, "active"),
    (SESSION_PERSISTENT_COOKIE, "true"),
];

/// Split a `Cookie` header into `(name, value)` pairs.
///
/// Pairs without `=` or with an empty name are skipped.
pub fn parse_cookie_header(header: &str) -> Vec<(&str, &str)> {
    header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .map(|(name, value)| (name.trim(), value.trim()))
        .filter(|(name, _)| !name.is_empty())
        .collect()
}

/// True iff the header carries `user_session=active` or `session_persistent=true`
pub fn has_liveness_marker(header: &str) -> bool {
    parse_cookie_header(header).iter().any(|(name, value)| {
        LIVENESS_MARKERS
            .iter()
            .any(|(marker, expected)| name == marker && value == expected)
    })
}

/// Value of the named cookie in a `Cookie` header
pub fn cookie_value(header: &str, name: &str) -> Option<String> {
    parse_cookie_header(header)
        .into_iter()
        .find(|(n, _)| *n == name)
        .map(|(_, v)| v.to_string())
}

/// Cookie jar for a single backend.
///
/// Domain and path attributes are ignored: the client only ever talks to one
/// origin and the backend scopes every cookie to `/`.
#[derive(Debug, Default)]
pub struct SessionCookies {
    cookies: RwLock<BTreeMap<String, String>>,
}

impl SessionCookies {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, name: impl Into<String>, value: impl Into<String>) {
        self.cookies.write().insert(name.into(), value.into());
    }

    pub fn remove(&self, name: &str) {
        self.cookies.write().remove(name);
    }

    pub fn get(&self, name: &str) -> Option<String> {
        self.cookies.read().get(name).cloned()
    }

    pub fn clear(&self) {
        self.cookies.write().clear();
    }

    pub fn is_empty(&self) -> bool {
        self.cookies.read().is_empty()
    }

    /// Apply one `Set-Cookie` header.
    ///
    /// An empty value or `Max-Age` <= 0 deletes the cookie, which is how the
    /// backend clears the session on logout.
    pub fn apply_set_cookie(&self, header: &str) {
        let mut parts = header.split(';');
        let Some((name, value)) = parts.next().and_then(|pair| pair.split_once('=')) else {
            return;
        };
        let name = name.trim();
        let value = value.trim().trim_matches('"');
        if name.is_empty() {
            return;
        }

        let expired = parts.any(|attr| {
            attr.trim()
                .split_once('=')
                .filter(|(key, _)| key.trim().eq_ignore_ascii_case("max-age"))
                .and_then(|(_, age)| age.trim().parse::<i64>().ok())
                .is_some_and(|age| age <= 0)
        });

        if expired || value.is_empty() {
            self.remove(name);
        } else {
            self.set(name, value);
        }
    }

    /// `name=value; name=value`, or `None` when the jar is empty
    pub fn header_value(&self) -> Option<String> {
        let cookies = self.cookies.read();
        if cookies.is_empty() {
            return None;
        }
        Some(
            cookies
                .iter()
                .map(|(name, value)| format!("{name}={value}"))
                .collect::<Vec<_>>()
                .join("; "),
        )
    }
}

impl CookieStore for SessionCookies {
    fn set_cookies(&self, cookie_headers: &mut dyn Iterator<Item = &HeaderValue>, _url: &url::Url) {
        for header in cookie_headers {
            if let Ok(header) = header.to_str() {
                self.apply_set_cookie(header);
            }
        }
    }

    fn cookies(&self, _url: &url::Url) -> Option<HeaderValue> {
        self.header_value()
            .and_then(|header| HeaderValue::from_str(&header).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_liveness_user_session_active() {
        assert!(has_liveness_marker("user_session=active"));
        assert!(has_liveness_marker("theme=dark; user_session=active"));
        assert!(has_liveness_marker(" user_session = active ;"));
    }

    #[test]
    fn test_liveness_session_persistent_true() {
        assert!(has_liveness_marker("session_persistent=true"));
        assert!(has_liveness_marker("a=b; session_persistent=true; c=d"));
    }

    #[test]
    fn test_liveness_wrong_values() {
        assert!(!has_liveness_marker("user_session=inactive"));
        assert!(!has_liveness_marker("session_persistent=false"));
        assert!(!has_liveness_marker("user_session=true"));
        assert!(!has_liveness_marker("session_persistent=active"));
        assert!(!has_liveness_marker("user_session=active=x"));
    }

    #[test]
    fn test_liveness_malformed_or_empty() {
        assert!(!has_liveness_marker(""));
        assert!(!has_liveness_marker(";;;"));
        assert!(!has_liveness_marker("user_session"));
        assert!(!has_liveness_marker("user_session="));
        assert!(!has_liveness_marker("=active"));
        assert!(!has_liveness_marker("access_token_cookie=abc"));
    }

    #[test]
    fn test_cookie_value() {
        let header = "user_session=active; access_token_cookie=eyJ.abc";
        assert_eq!(
            cookie_value(header, ACCESS_TOKEN_COOKIE).as_deref(),
            Some("eyJ.abc")
        );
        assert_eq!(cookie_value(header, "missing"), None);
    }

    #[test]
    fn test_set_cookie_stores_first_pair_only() {
        let jar = SessionCookies::new();
        jar.apply_set_cookie("user_session=active; Path=/; Max-Age=2592000; SameSite=Lax");
        assert_eq!(jar.get(USER_SESSION_COOKIE).as_deref(), Some("active"));
        assert_eq!(jar.get("Path"), None);
    }

    #[test]
    fn test_set_cookie_deletion() {
        let jar = SessionCookies::new();
        jar.set(USER_SESSION_COOKIE, "active");
        jar.set(ACCESS_TOKEN_COOKIE, "T1");

        jar.apply_set_cookie(
            "user_session=; Expires=Thu, 01 Jan 1970 00:00:00 GMT; Max-Age=0; Path=/",
        );
        assert_eq!(jar.get(USER_SESSION_COOKIE), None);

        jar.apply_set_cookie("access_token_cookie=T2; max-age=-1");
        assert_eq!(jar.get(ACCESS_TOKEN_COOKIE), None);
    }

    #[test]
    fn test_set_cookie_ignores_garbage() {
        let jar = SessionCookies::new();
        jar.apply_set_cookie("no-equals-sign");
        jar.apply_set_cookie("=value");
        assert!(jar.is_empty());
    }

    #[test]
    fn test_header_value_roundtrip_through_liveness() {
        let jar = SessionCookies::new();
        assert_eq!(jar.header_value(), None);

        jar.set(SESSION_PERSISTENT_COOKIE, "true");
        let header = jar.header_value().unwrap();
        assert!(has_liveness_marker(&header));

        jar.clear();
        assert_eq!(jar.header_value(), None);
    }

    #[test]
    fn test_cookie_store_impl() {
        let jar = SessionCookies::new();
        let url = url::Url::parse("http://localhost:5000/login").unwrap();
        let headers = [
            HeaderValue::from_static("access_token_cookie=T1; HttpOnly; Path=/"),
            HeaderValue::from_static("user_session=active; Path=/"),
        ];
        jar.set_cookies(&mut headers.iter(), &url);

        let sent = jar.cookies(&url).unwrap();
        assert_eq!(
            sent.to_str().unwrap(),
            "access_token_cookie=T1; user_session=active"
        );
    }
}
