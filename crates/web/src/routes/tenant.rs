//! Tenant introspection

use axum::{
    http::{HeaderMap, Uri},
    Json,
};
use pressroom_shared::TenantId;
use serde::Serialize;

use crate::routing::{request_host, CurrentTenant};

#[derive(Debug, Serialize)]
pub struct TenantResponse {
    pub tenant: TenantId,
    pub host: Option<String>,
}

/// GET /api/v1/tenant
pub async fn current_tenant(
    CurrentTenant(tenant): CurrentTenant,
    headers: HeaderMap,
    uri: Uri,
) -> Json<TenantResponse> {
    Json(TenantResponse {
        tenant,
        host: request_host(&headers, &uri),
    })
}
