/// Session cookie plumbing.
///
/// Tokens travel both in response bodies and as HttpOnly cookies; on the way
/// in, a bearer `Authorization` header takes precedence over the cookie.
use axum::http::{
    header::{InvalidHeaderValue, AUTHORIZATION, COOKIE},
    HeaderMap, HeaderValue,
};

pub const ACCESS_COOKIE_NAME: &str = "access_token";
pub const REFRESH_COOKIE_NAME: &str = "refresh_token";

/// Build an `HttpOnly; SameSite=Strict` cookie for a token.
pub fn auth_cookie(
    name: &str,
    value: &str,
    max_age_secs: i64,
    secure: bool,
) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie =
        format!("{name}={value}; Path=/; HttpOnly; SameSite=Strict; Max-Age={max_age_secs}");
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

/// Expire a cookie immediately.
pub fn clear_cookie(name: &str, secure: bool) -> Result<HeaderValue, InvalidHeaderValue> {
    auth_cookie(name, "", 0, secure)
}

/// Read a single cookie value from the request headers.
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    let header = headers.get(COOKIE)?;
    let value = header.to_str().ok()?;
    for pair in value.split(';') {
        let trimmed = pair.trim();
        let mut parts = trimmed.splitn(2, '=');
        let key = parts.next()?.trim();
        let val = parts.next()?.trim();
        if key == name && !val.is_empty() {
            return Some(val.to_string());
        }
    }
    None
}

/// Pick up the access token: `Authorization: Bearer` first, cookie second.
pub fn extract_access_token(headers: &HeaderMap) -> Option<String> {
    if let Some(token) = extract_bearer_token(headers) {
        return Some(token);
    }
    read_cookie(headers, ACCESS_COOKIE_NAME)
}

fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let trimmed = value.trim();
    let token = trimmed
        .strip_prefix("Bearer ")
        .or_else(|| trimmed.strip_prefix("bearer "))?
        .trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cookie_format_includes_flags() {
        let cookie = auth_cookie("access_token", "abc", 900, false).unwrap();
        assert_eq!(
            cookie.to_str().unwrap(),
            "access_token=abc; Path=/; HttpOnly; SameSite=Strict; Max-Age=900"
        );

        let secure = auth_cookie("access_token", "abc", 900, true).unwrap();
        assert!(secure.to_str().unwrap().ends_with("; Secure"));
    }

    #[test]
    fn read_cookie_picks_the_named_pair() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("theme=dark; access_token=abc; refresh_token=def"),
        );

        assert_eq!(read_cookie(&headers, "access_token").as_deref(), Some("abc"));
        assert_eq!(read_cookie(&headers, "refresh_token").as_deref(), Some("def"));
        assert_eq!(read_cookie(&headers, "missing"), None);
    }

    #[test]
    fn bearer_header_takes_precedence_over_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer from-header"));
        headers.insert(
            COOKIE,
            HeaderValue::from_static("access_token=from-cookie"),
        );

        assert_eq!(
            extract_access_token(&headers).as_deref(),
            Some("from-header")
        );
    }

    #[test]
    fn falls_back_to_cookie_without_header() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("access_token=from-cookie"),
        );

        assert_eq!(
            extract_access_token(&headers).as_deref(),
            Some("from-cookie")
        );
        assert_eq!(extract_access_token(&HeaderMap::new()), None);
    }
}
