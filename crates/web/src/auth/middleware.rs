//! Session middleware for dashboard routes

use axum::{
    body::Body,
    extract::{OriginalUri, State},
    http::{
        header::{AUTHORIZATION, COOKIE},
        HeaderMap, Request,
    },
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use pressroom_shared::TenantId;
use serde::Serialize;
use time::OffsetDateTime;

use super::session::{SessionClaims, SessionError};
use crate::{error::ApiError, state::AppState};

/// Cookie carrying the session token for browser requests
pub const SESSION_COOKIE: &str = "session";

/// Authenticated dashboard user, inserted by the session middleware
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub user_id: String,
    pub role: Option<String>,
    pub tenant: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,
}

/// Gate for dashboard pages: anonymous visitors are sent to the login page
pub async fn require_session(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    match authenticate(&state, &request) {
        Ok(user) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(e) => {
            // Nested routers see a stripped path; redirect back to what the client asked for
            let target = request
                .extensions()
                .get::<OriginalUri>()
                .map(|uri| uri.0.clone())
                .unwrap_or_else(|| request.uri().clone());
            let next_path = target
                .path_and_query()
                .map(|pq| pq.as_str())
                .unwrap_or("/");

            tracing::debug!(path = next_path, reason = %e, "Redirecting to login");
            Redirect::to(&login_location(next_path)).into_response()
        }
    }
}

/// Gate for dashboard API calls: anonymous callers get a 401 body
pub async fn require_api_session(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let user = authenticate(&state, &request).map_err(|e| {
        tracing::debug!(reason = %e, "Rejected API session");
        ApiError::Unauthorized
    })?;

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

fn authenticate(state: &AppState, request: &Request<Body>) -> Result<SessionUser, SessionError> {
    let token = session_token(request.headers()).ok_or(SessionError::Missing)?;
    let claims = state.sessions.validate(&token)?;

    // A session is bound to the tenant it was issued for
    if let (Some(claimed), Some(current)) =
        (claims.tenant.as_deref(), request.extensions().get::<TenantId>())
    {
        if claimed != current.as_str() {
            tracing::warn!(
                user_id = %claims.sub,
                session_tenant = claimed,
                tenant = %current,
                "Session presented on another tenant"
            );
            return Err(SessionError::Invalid);
        }
    }

    session_user(claims)
}

fn session_user(claims: SessionClaims) -> Result<SessionUser, SessionError> {
    let expires_at = OffsetDateTime::from_unix_timestamp(claims.exp)
        .map_err(|e| SessionError::Validation(e.to_string()))?;

    Ok(SessionUser {
        user_id: claims.sub,
        role: claims.role,
        tenant: claims.tenant,
        expires_at,
    })
}

/// Bearer token first, then the session cookie
fn session_token(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty());

    if let Some(token) = bearer {
        return Some(token.to_string());
    }

    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|h| h.to_str().ok())
        .flat_map(|h| h.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == SESSION_COOKIE && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

fn login_location(next_path: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(next_path.as_bytes()).collect();
    format!("/login?next={}", encoded)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::auth::session::{claims_for_tests, sign_for_tests};
    use crate::state::test_support::{test_state, TEST_SECRET};
    use axum::{
        http::{header::LOCATION, HeaderValue, StatusCode},
        middleware,
        routing::get,
        Extension, Router,
    };
    use tower::ServiceExt;

    async fn whoami(Extension(user): Extension<SessionUser>) -> String {
        user.user_id
    }

    fn app() -> Router {
        let state = test_state("http://backend.test");
        let pages = Router::new()
            .route("/settings", get(whoami))
            .route_layer(middleware::from_fn_with_state(state.clone(), require_session));
        let api = Router::new()
            .route("/me", get(whoami))
            .route_layer(middleware::from_fn_with_state(state.clone(), require_api_session));

        Router::new()
            .nest("/dashboard", pages)
            .nest("/api", api)
            .with_state(state)
    }

    #[test]
    fn test_session_token_sources() {
        let mut headers = HeaderMap::new();
        assert_eq!(session_token(&headers), None);

        headers.insert(COOKIE, HeaderValue::from_static("theme=dark; session=abc.def"));
        assert_eq!(session_token(&headers).as_deref(), Some("abc.def"));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer xyz"));
        assert_eq!(session_token(&headers).as_deref(), Some("xyz"));
    }

    #[test]
    fn test_login_location_encodes_path() {
        assert_eq!(
            login_location("/dashboard/posts?page=2"),
            "/login?next=%2Fdashboard%2Fposts%3Fpage%3D2"
        );
    }

    #[tokio::test]
    async fn test_anonymous_page_redirects_with_original_path() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/dashboard/settings")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get(LOCATION).unwrap(),
            "/login?next=%2Fdashboard%2Fsettings"
        );
    }

    #[tokio::test]
    async fn test_anonymous_api_is_unauthorized() {
        let response = app()
            .oneshot(Request::builder().uri("/api/me").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_valid_cookie_session_passes() {
        let token = sign_for_tests(TEST_SECRET, &claims_for_tests("user-42", 3600));
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/dashboard/settings")
                    .header("cookie", format!("session={}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&bytes[..], b"user-42");
    }

    #[tokio::test]
    async fn test_expired_bearer_is_rejected() {
        let token = sign_for_tests(TEST_SECRET, &claims_for_tests("user-42", -3600));
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/api/me")
                    .header("authorization", format!("Bearer {}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_session_for_other_tenant_is_rejected() {
        let state = test_state("http://backend.test");
        let app = Router::new()
            .route("/me", get(whoami))
            .route_layer(middleware::from_fn_with_state(state.clone(), require_api_session))
            .layer(middleware::from_fn_with_state(
                state.clone(),
                crate::routing::tenant_middleware,
            ))
            .with_state(state);

        // claims_for_tests issues sessions for "acme"
        let token = sign_for_tests(TEST_SECRET, &claims_for_tests("user-42", 3600));
        let request = |host: &str| {
            Request::builder()
                .uri("/me")
                .header("host", host)
                .header("authorization", format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap()
        };

        let own = app.clone().oneshot(request("acme.example.com")).await.unwrap();
        assert_eq!(own.status(), StatusCode::OK);

        let other = app.oneshot(request("beta.example.com")).await.unwrap();
        assert_eq!(other.status(), StatusCode::UNAUTHORIZED);
    }
}
