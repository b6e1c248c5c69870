//! Inline ad preview endpoint
//!
//! Lets the dashboard preview how a set of directives lands in a draft
//! without publishing anything.

use axum::Json;
use pressroom_shared::{
    parse_directives_strict, validate_directives, AdManager, Placement, RawAdDirective, TenantId,
};
use serde::{Deserialize, Serialize};

use crate::{error::ApiResult, routing::CurrentTenant};

#[derive(Debug, Deserialize)]
pub struct DistributeRequest {
    pub content: String,
    #[serde(default)]
    pub directives: Vec<RawAdDirective>,
    /// Reject the whole request on the first malformed directive
    #[serde(default)]
    pub strict: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributeResponse {
    pub tenant: TenantId,
    pub html: String,
    pub placements: Vec<Placement>,
    pub scripts: Vec<String>,
    /// Directives dropped as malformed
    pub rejected: usize,
}

/// POST /api/v1/inline-ads/distribute
pub async fn distribute(
    CurrentTenant(tenant): CurrentTenant,
    Json(req): Json<DistributeRequest>,
) -> ApiResult<Json<DistributeResponse>> {
    let received = req.directives.len();
    let directives = if req.strict {
        parse_directives_strict(req.directives)?
    } else {
        validate_directives(req.directives)
    };
    let rejected = received - directives.len();

    let rendered = AdManager::new().render(&req.content, &directives);

    tracing::info!(
        tenant = %tenant,
        directives = directives.len(),
        rejected,
        placed = rendered.placements.len(),
        "Previewed inline ad distribution"
    );

    Ok(Json(DistributeResponse {
        tenant,
        html: rendered.html,
        placements: rendered.placements,
        scripts: rendered.scripts,
        rejected,
    }))
}
