//! HTTP routes

pub mod ads;
pub mod dashboard;
pub mod health;
pub mod posts;
pub mod tenant;


use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{compression::CompressionLayer, trace::TraceLayer};

use crate::{
    auth::{require_api_session, require_session},
    routing::tenant_middleware,
    security::security_headers_middleware,
    state::AppState,
};

/// Create all routes
pub fn create_router(state: AppState) -> Router {
    // Health check routes (at root level for infrastructure monitoring)
    let health_routes = Router::new()
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness));

    // Public pages
    let page_routes = Router::new().route("/posts/:slug", get(posts::show_post));

    // Dashboard pages (anonymous visitors are redirected to /login)
    let dashboard_routes = Router::new()
        .route("/dashboard", get(dashboard::overview))
        .route("/dashboard/*section", get(dashboard::overview))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_session,
        ));

    // Public API routes - under /api/v1
    let public_api_routes = Router::new()
        .route("/tenant", get(tenant::current_tenant))
        .route("/inline-ads/distribute", post(ads::distribute));

    // Session-gated API routes
    let protected_api_routes = Router::new()
        .route("/dashboard/session", get(dashboard::session))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_api_session,
        ));

    let api_v1_routes = public_api_routes.merge(protected_api_routes);

    Router::new()
        .merge(health_routes)
        .merge(page_routes)
        .merge(dashboard_routes)
        .nest("/api/v1", api_v1_routes)
        .layer(DefaultBodyLimit::max(2 * 1024 * 1024)) // 2MB; article drafts only
        .layer(middleware::from_fn(security_headers_middleware))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            tenant_middleware,
        ))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
