//! Security headers for every admin response.
//!
//! Stricter than the storefront: no inline scripts at all, and the panel
//! may never be framed.

use axum::{
    extract::{Request, State},
    http::{
        HeaderName, HeaderValue,
        header::{
            CACHE_CONTROL, CONTENT_SECURITY_POLICY, REFERRER_POLICY, X_CONTENT_TYPE_OPTIONS,
            X_FRAME_OPTIONS,
        },
    },
    middleware::Next,
    response::Response,
};

use crate::state::AppState;

/// Origin (`scheme://host[:port]`) of a URL, if it has one.
fn origin_of(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    let origin = parsed.origin();
    origin.is_tuple().then(|| origin.ascii_serialization())
}

/// Build the Content-Security-Policy value. Product images are served from
/// the backend storage origin.
#[must_use]
pub fn content_security_policy(image_origin: Option<&str>) -> String {
    let img_src = image_origin.map_or_else(
        || "img-src 'self' data:".to_string(),
        |o| format!("img-src 'self' data: {o}"),
    );

    [
        "default-src 'none'",
        "script-src 'self'",
        "style-src 'self'",
        "font-src 'self'",
        &img_src,
        "connect-src 'self'",
        "object-src 'none'",
        "base-uri 'self'",
        "form-action 'self'",
        "frame-ancestors 'none'",
    ]
    .join("; ")
}

/// Add security headers to all responses.
pub async fn security_headers_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let image_origin = origin_of(&state.config().backend.url);

    let mut response = next.run(request).await;
    let headers = response.headers_mut();

    headers.insert(X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    headers.insert(X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
    headers.insert(REFERRER_POLICY, HeaderValue::from_static("no-referrer"));

    if let Ok(value) = HeaderValue::from_str(&content_security_policy(image_origin.as_deref())) {
        headers.insert(CONTENT_SECURITY_POLICY, value);
    }

    headers.insert(
        HeaderName::from_static("permissions-policy"),
        HeaderValue::from_static(
            "camera=(), geolocation=(), microphone=(), payment=(), usb=(), interest-cohort=()",
        ),
    );

    if !headers.contains_key(CACHE_CONTROL) {
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-store, max-age=0"));
    }

    headers.insert(
        HeaderName::from_static("cross-origin-opener-policy"),
        HeaderValue::from_static("same-origin"),
    );
    headers.insert(
        HeaderName::from_static("x-robots-tag"),
        HeaderValue::from_static("noindex, nofollow"),
    );

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_forbids_inline_scripts() {
        let csp = content_security_policy(Some("https://project.backend.test"));
        assert!(csp.contains("script-src 'self';"));
        assert!(!csp.contains("nonce"));
        assert!(csp.contains("img-src 'self' data: https://project.backend.test"));
    }

    #[test]
    fn test_origin_of() {
        assert_eq!(
            origin_of("https://project.backend.test/storage").as_deref(),
            Some("https://project.backend.test")
        );
        assert!(origin_of("nope").is_none());
    }
}
