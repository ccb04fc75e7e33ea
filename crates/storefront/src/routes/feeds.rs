//! Marketplace feeds, sitemap and robots.txt.

use axum::{Router, extract::State, http::header, response::IntoResponse, routing::get};
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::extract::Path;
use crate::services::feeds::{FeedService, Marketplace, robots_txt};
use crate::state::AppState;

const XML: &str = "application/xml; charset=utf-8";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/feeds/{file}", get(marketplace_feed))
        .route("/sitemap.xml", get(sitemap))
        .route("/robots.txt", get(robots))
}

fn service(state: &AppState) -> FeedService<'_> {
    FeedService::new(state.pool(), state.config(), state.feeds())
}

/// Marketplace product feed.
///
/// GET /feeds/{trendyol|hepsiburada|n11}.xml
#[instrument(skip(state))]
async fn marketplace_feed(
    State(state): State<AppState>,
    Path(file): Path<String>,
) -> Result<impl IntoResponse> {
    let marketplace = Marketplace::from_file_name(&file)
        .ok_or_else(|| AppError::NotFound("Feed bulunamadı".to_string()))?;
    let body = service(&state).marketplace(marketplace).await?;
    Ok(([(header::CONTENT_TYPE, XML)], body.as_str().to_owned()))
}

/// GET /sitemap.xml
#[instrument(skip(state))]
async fn sitemap(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let body = service(&state).sitemap().await?;
    Ok(([(header::CONTENT_TYPE, XML)], body.as_str().to_owned()))
}

/// GET /robots.txt
async fn robots(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        robots_txt(state.config()),
    )
}
