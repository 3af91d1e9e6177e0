//! Cross-site request guard.
//!
//! The session is process-wide, not tied to a cookie. State-changing requests
//! must come from the console's own origin.

use axum::{
    extract::Request,
    http::{HeaderMap, Method, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use url::Url;

use crate::error::AppError;

const SEC_FETCH_SITE: &str = "sec-fetch-site";

pub async fn same_origin(request: Request, next: Next) -> Response {
    if is_cross_site(request.method(), request.headers()) {
        tracing::warn!(
            name: "request.cross_site_rejected",
            method = %request.method(),
            path = %request.uri().path(),
            origin = ?request.headers().get(header::ORIGIN),
            "Rejected cross-site request"
        );
        return AppError::toast(StatusCode::FORBIDDEN, "Cross-site requests are not allowed.")
            .into_response();
    }
    next.run(request).await
}

/// True for a state-changing request that did not come from this origin.
///
/// Browsers that send `Sec-Fetch-Site` are trusted on it. Otherwise an
/// `Origin` header must name the same host as `Host`. Requests with neither
/// header (curl, tests) pass.
pub fn is_cross_site(method: &Method, headers: &HeaderMap) -> bool {
    if matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS) {
        return false;
    }
    let fetch_site = headers.get(SEC_FETCH_SITE).and_then(|v| v.to_str().ok());
    if fetch_site == Some("cross-site") {
        return true;
    }
    let Some(origin) = headers.get(header::ORIGIN) else {
        return false;
    };
    let host = headers.get(header::HOST).and_then(|v| v.to_str().ok());
    match (origin.to_str().ok().and_then(authority), host) {
        (Some(origin), Some(host)) => !origin.eq_ignore_ascii_case(host),
        _ => true,
    }
}

/// `host[:port]` of an origin such as `https://console.local:8443`.
fn authority(origin: &str) -> Option<String> {
    let url = Url::parse(origin).ok()?;
    let host = url.host_str()?;
    Some(match url.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_static(value));
        }
        map
    }

    #[test]
    fn reads_are_never_blocked() {
        let h = headers(&[("origin", "https://evil.example"), (SEC_FETCH_SITE, "cross-site")]);
        assert!(!is_cross_site(&Method::GET, &h));
    }

    #[test]
    fn fetch_metadata_decides_first() {
        assert!(is_cross_site(
            &Method::POST,
            &headers(&[(SEC_FETCH_SITE, "cross-site")])
        ));
        assert!(!is_cross_site(
            &Method::POST,
            &headers(&[(SEC_FETCH_SITE, "same-origin")])
        ));
    }

    #[test]
    fn origin_must_match_host() {
        let same = headers(&[("origin", "http://console.local:3000"), ("host", "console.local:3000")]);
        assert!(!is_cross_site(&Method::POST, &same));

        let other = headers(&[("origin", "https://evil.example"), ("host", "console.local:3000")]);
        assert!(is_cross_site(&Method::POST, &other));

        let opaque = headers(&[("origin", "null"), ("host", "console.local:3000")]);
        assert!(is_cross_site(&Method::POST, &opaque));
    }

    #[test]
    fn requests_without_browser_headers_pass() {
        assert!(!is_cross_site(&Method::POST, &HeaderMap::new()));
    }
}
