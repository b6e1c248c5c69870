//! Authenticated dashboard endpoints

use axum::{Extension, Json};
use pressroom_shared::TenantId;
use serde::Serialize;

use crate::{auth::SessionUser, routing::CurrentTenant};

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub tenant: TenantId,
    pub user: SessionUser,
}

/// GET /dashboard and everything below it
pub async fn overview(
    CurrentTenant(tenant): CurrentTenant,
    Extension(user): Extension<SessionUser>,
) -> Json<DashboardResponse> {
    Json(DashboardResponse { tenant, user })
}

/// GET /api/v1/dashboard/session
pub async fn session(Extension(user): Extension<SessionUser>) -> Json<SessionUser> {
    Json(user)
}
