//! Marketplace feed preview.

use axum::{Router, extract::State, routing::get};
use tracing::instrument;

use crate::db::catalog::CatalogRepository;
use crate::error::Result;
use crate::extract::Json;
use crate::middleware::AdminContext;
use crate::services::feeds::{self, FeedPreview};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/marketplace", get(preview))
}

/// Per-marketplace product counts and missing-data warnings for the feeds.
///
/// GET /api/admin/marketplace
#[instrument(skip(state, _ctx))]
async fn preview(State(state): State<AppState>, _ctx: AdminContext) -> Result<Json<Vec<FeedPreview>>> {
    let listings = CatalogRepository::new(state.pool())
        .list_active_products()
        .await?;
    Ok(Json(feeds::preview(state.config(), &listings)))
}
