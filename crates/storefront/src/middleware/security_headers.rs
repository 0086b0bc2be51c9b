//! Security headers for every storefront response.
//!
//! Locked down by default. The CSP allows product and blog images from the
//! backend storage origin and inline scripts carrying the request nonce.

use axum::{
    extract::{Request, State},
    http::{
        HeaderName, HeaderValue,
        header::{
            CONTENT_SECURITY_POLICY, REFERRER_POLICY, X_CONTENT_TYPE_OPTIONS, X_FRAME_OPTIONS,
        },
    },
    middleware::Next,
    response::Response,
};

use super::csp::CspNonce;
use crate::state::AppState;

/// Origin (`scheme://host[:port]`) of a URL, if it has one.
#[must_use]
pub fn origin_of(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    let origin = parsed.origin();
    origin.is_tuple().then(|| origin.ascii_serialization())
}

/// Build the Content-Security-Policy value.
#[must_use]
pub fn content_security_policy(nonce: Option<&str>, image_origin: Option<&str>) -> String {
    let script_src = nonce.filter(|n| !n.is_empty()).map_or_else(
        || "script-src 'self'".to_string(),
        |n| format!("script-src 'self' 'nonce-{n}'"),
    );
    let img_src = image_origin.map_or_else(
        || "img-src 'self' data:".to_string(),
        |o| format!("img-src 'self' data: {o}"),
    );

    [
        "default-src 'none'",
        &script_src,
        "style-src 'self'",
        "font-src 'self'",
        &img_src,
        "connect-src 'self'",
        "frame-src 'none'",
        "object-src 'none'",
        "base-uri 'self'",
        "form-action 'self'",
        "frame-ancestors 'none'",
    ]
    .join("; ")
}

/// Add security headers to all responses.
///
/// `Referrer-Policy` is `same-origin` so the language switch can send the
/// visitor back to the page they came from.
pub async fn security_headers_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let nonce = request
        .extensions()
        .get::<CspNonce>()
        .map(|n| n.value().to_string());
    let image_origin = origin_of(&state.config().backend.url);

    let mut response = next.run(request).await;
    let headers = response.headers_mut();

    headers.insert(X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    headers.insert(X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
    headers.insert(REFERRER_POLICY, HeaderValue::from_static("same-origin"));

    let csp = content_security_policy(nonce.as_deref(), image_origin.as_deref());
    if let Ok(value) = HeaderValue::from_str(&csp) {
        headers.insert(CONTENT_SECURITY_POLICY, value);
    }

    headers.insert(
        HeaderName::from_static("permissions-policy"),
        HeaderValue::from_static(
            "camera=(), \
             geolocation=(), \
             microphone=(), \
             payment=(), \
             usb=(), \
             interest-cohort=()",
        ),
    );

    // Static assets set their own cache headers
    if !headers.contains_key(axum::http::header::CACHE_CONTROL) {
        headers.insert(
            axum::http::header::CACHE_CONTROL,
            HeaderValue::from_static("no-store, max-age=0"),
        );
    }

    headers.insert(
        HeaderName::from_static("cross-origin-opener-policy"),
        HeaderValue::from_static("same-origin"),
    );

    // Storage images do not send CORP headers
    headers.insert(
        HeaderName::from_static("cross-origin-embedder-policy"),
        HeaderValue::from_static("credentialless"),
    );

    headers.insert(
        HeaderName::from_static("x-dns-prefetch-control"),
        HeaderValue::from_static("off"),
    );

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origin_of_strips_path() {
        assert_eq!(
            origin_of("https://abc.backend.example/storage/v1").as_deref(),
            Some("https://abc.backend.example")
        );
        assert_eq!(
            origin_of("http://localhost:54321").as_deref(),
            Some("http://localhost:54321")
        );
        assert!(origin_of("not a url").is_none());
    }

    #[test]
    fn test_policy_includes_nonce_and_image_origin() {
        let csp = content_security_policy(Some("abc123"), Some("https://cdn.example"));
        assert!(csp.contains("script-src 'self' 'nonce-abc123'"));
        assert!(csp.contains("img-src 'self' data: https://cdn.example"));
        assert!(csp.starts_with("default-src 'none'"));
    }

    #[test]
    fn test_policy_without_nonce() {
        let csp = content_security_policy(Some(""), None);
        assert!(csp.contains("script-src 'self';"));
        assert!(csp.contains("img-src 'self' data:;"));
    }
}
