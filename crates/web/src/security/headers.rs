//! Security Headers Middleware
//!
//! Adds hardening headers to every response. Article pages carry third-party
//! ad snippets, so HTML responses get a policy that admits external scripts
//! and frames over HTTPS; everything else stays locked down.

use axum::{
    body::Body,
    http::{header::CONTENT_TYPE, HeaderMap, HeaderValue, Request, Response},
    middleware::Next,
};

/// CSP for rendered pages: ad networks load scripts, frames and images
const PAGE_CSP: &str = "default-src 'self'; \
     script-src 'self' 'unsafe-inline' https:; \
     frame-src https:; \
     img-src 'self' data: https:; \
     style-src 'self' 'unsafe-inline'; \
     frame-ancestors 'none'; \
     base-uri 'self'; \
     upgrade-insecure-requests";

/// CSP for JSON and other non-page responses
const API_CSP: &str = "default-src 'none'; \
     frame-ancestors 'none'; \
     base-uri 'none'; \
     form-action 'none'; \
     upgrade-insecure-requests";

/// Middleware that adds security headers to all responses
pub async fn security_headers_middleware(request: Request<Body>, next: Next) -> Response<Body> {
    let mut response = next.run(request).await;
    let is_html = is_html(response.headers());
    let headers = response.headers_mut();

    // X-Frame-Options: Prevent clickjacking attacks
    headers.insert("X-Frame-Options", HeaderValue::from_static("DENY"));

    // X-Content-Type-Options: Prevent MIME type sniffing
    headers.insert(
        "X-Content-Type-Options",
        HeaderValue::from_static("nosniff"),
    );

    // Referrer-Policy: Control referrer information leakage
    headers.insert(
        "Referrer-Policy",
        HeaderValue::from_static("strict-origin-when-cross-origin"),
    );

    // Permissions-Policy: Disable unused browser features
    headers.insert(
        "Permissions-Policy",
        HeaderValue::from_static("camera=(), microphone=(), geolocation=()"),
    );

    headers.insert(
        "Strict-Transport-Security",
        HeaderValue::from_static("max-age=63072000; includeSubDomains; preload"),
    );

    headers.insert(
        "Content-Security-Policy",
        HeaderValue::from_static(if is_html { PAGE_CSP } else { API_CSP }),
    );

    // Tenant-specific responses must not be shared across hosts by caches
    if !headers.contains_key("Cache-Control") {
        headers.insert(
            "Cache-Control",
            HeaderValue::from_static("private, no-cache"),
        );
    }

    response
}

fn is_html(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.starts_with("text/html"))
        .unwrap_or(false)
}
