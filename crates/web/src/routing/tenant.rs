//! Tenant interception middleware and extractor

use std::convert::Infallible;

use axum::{
    async_trait,
    body::Body,
    extract::{FromRef, FromRequestParts, State},
    http::{
        header::{HOST, SET_COOKIE},
        request::Parts,
        HeaderMap, HeaderValue, Request, Uri,
    },
    middleware::Next,
    response::Response,
};
use pressroom_shared::TenantId;

use crate::state::AppState;

/// Header set by proxies and load balancers; preferred over `Host`
pub const FORWARDED_HOST: &str = "x-forwarded-host";

/// Host the client addressed, as sent by the proxy or in the request itself
pub fn request_host(headers: &HeaderMap, uri: &Uri) -> Option<String> {
    headers
        .get(FORWARDED_HOST)
        .or_else(|| headers.get(HOST))
        .and_then(|h| h.to_str().ok())
        .map(|s| s.split(',').next().unwrap_or(s).trim().to_string())
        .filter(|s| !s.is_empty())
        .or_else(|| uri.authority().map(|a| a.as_str().to_string()))
}

/// `Set-Cookie` value carrying the tenant to client-side code
///
/// Readable by scripts (no HttpOnly), site-wide, session lifetime.
pub fn tenant_cookie(
    name: &str,
    tenant: &TenantId,
) -> Result<HeaderValue, axum::http::header::InvalidHeaderValue> {
    HeaderValue::from_str(&format!("{}={}; Path=/; SameSite=Lax", name, tenant))
}

/// Resolve the tenant for every request ahead of route handling
pub async fn tenant_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let host = request_host(request.headers(), request.uri());
    let tenant = state.resolver.resolve(host.as_deref());

    request.extensions_mut().insert(tenant.clone());
    let mut response = next.run(request).await;

    match tenant_cookie(&state.config.tenant_cookie_name, &tenant) {
        Ok(cookie) => {
            response.headers_mut().append(SET_COOKIE, cookie);
        }
        Err(e) => {
            tracing::warn!(tenant = %tenant, error = %e, "Tenant id is not a valid cookie value");
        }
    }

    response
}

/// Active tenant for the current request
///
/// Uses the tenant resolved by `tenant_middleware`; routers mounted without
/// the middleware resolve it here with the same resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentTenant(pub TenantId);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentTenant
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(tenant) = parts.extensions.get::<TenantId>() {
            return Ok(CurrentTenant(tenant.clone()));
        }

        let state = AppState::from_ref(state);
        let host = request_host(&parts.headers, &parts.uri);
        Ok(CurrentTenant(state.resolver.resolve(host.as_deref())))
    }
}
