//! Article pages

use axum::{
    extract::{Path, State},
    response::Html,
};
use pressroom_shared::{escape_html, AdManager, RenderedArticle, TenantId};

use crate::{
    error::{ApiError, ApiResult},
    routing::CurrentTenant,
    state::AppState,
};

const MAX_SLUG_LEN: usize = 200;

/// GET /posts/:slug
///
/// Fetches the post and the tenant's inline directives concurrently. A failed
/// directive fetch only costs the ads; the article still renders.
pub async fn show_post(
    State(state): State<AppState>,
    CurrentTenant(tenant): CurrentTenant,
    Path(slug): Path<String>,
) -> ApiResult<Html<String>> {
    validate_slug(&slug)?;

    let (post, directives) = tokio::join!(
        state.backend.fetch_post(&tenant, &slug),
        state
            .backend
            .fetch_inline_ads(&tenant, &state.config.article_page_kind),
    );
    let post = post?;
    let directives = directives.unwrap_or_else(|e| {
        tracing::warn!(tenant = %tenant, slug = %slug, error = %e, "Rendering without inline ads");
        Vec::new()
    });

    let rendered = AdManager::new().render(&post.content, &directives);
    tracing::debug!(
        tenant = %tenant,
        slug = %slug,
        placed = rendered.placements.len(),
        "Rendered article"
    );

    Ok(Html(render_article(&tenant, &post.slug, &post.title, &rendered)))
}

fn validate_slug(slug: &str) -> ApiResult<()> {
    let valid = !slug.is_empty()
        && slug.len() <= MAX_SLUG_LEN
        && slug
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');

    if valid {
        Ok(())
    } else {
        Err(ApiError::BadRequest("Invalid post slug".to_string()))
    }
}

fn render_article(tenant: &TenantId, slug: &str, title: &str, rendered: &RenderedArticle) -> String {
    let mut html = format!(
        "<article class=\"post\" data-tenant=\"{}\" data-slug=\"{}\">\n<h1>{}</h1>\n{}\n</article>\n",
        escape_html(tenant.as_str()),
        escape_html(slug),
        escape_html(title),
        rendered.html,
    );
    for src in &rendered.scripts {
        html.push_str(&format!("<script async src=\"{}\"></script>\n", escape_html(src)));
    }
    html
}
