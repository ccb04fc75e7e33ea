//! Storefront content: banners, pages, page layouts, navigation,
//! testimonials and campaigns.

use axum::{Router, extract::State, http::StatusCode, routing::get};
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;

use takviye_core::{BannerId, CampaignId, NavigationLinkId, PageId, TestimonialId};

use super::not_found;
use crate::db::content::{
    BannerInput, CampaignInput, ContentRepository, NavigationLinkInput, PageInput,
    TestimonialInput,
};
use crate::error::{AppError, Result};
use crate::extract::{Json, Path, Query};
use crate::middleware::AdminContext;
use crate::models::content::{
    Banner, Campaign, LayoutBlock, NavigationLink, Page, PageLayout, Testimonial,
};
use crate::services::audit::AuditAction;
use crate::state::AppState;

const MAX_LAYOUT_PAGE_LEN: usize = 64;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/banners", get(list_banners).post(create_banner))
        .route(
            "/banners/{id}",
            get(show_banner).put(update_banner).delete(delete_banner),
        )
        .route("/pages", get(list_pages).post(create_page))
        .route(
            "/pages/{id}",
            get(show_page).put(update_page).delete(delete_page),
        )
        .route("/layouts", get(list_layouts))
        .route(
            "/layouts/{page}",
            get(show_layout).put(save_layout).delete(delete_layout),
        )
        .route("/navigation", get(list_navigation).post(create_navigation_link))
        .route(
            "/navigation/{id}",
            get(show_navigation_link)
                .put(update_navigation_link)
                .delete(delete_navigation_link),
        )
        .route("/testimonials", get(list_testimonials).post(create_testimonial))
        .route(
            "/testimonials/{id}",
            get(show_testimonial)
                .put(update_testimonial)
                .delete(delete_testimonial),
        )
        .route("/campaigns", get(list_campaigns).post(create_campaign))
        .route(
            "/campaigns/{id}",
            get(show_campaign).put(update_campaign).delete(delete_campaign),
        )
}

// =============================================================================
// Banners
// =============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct BannerQuery {
    pub position: Option<String>,
}

/// GET /api/admin/banners?position=
async fn list_banners(
    State(state): State<AppState>,
    _ctx: AdminContext,
    Query(query): Query<BannerQuery>,
) -> Result<Json<Vec<Banner>>> {
    Ok(Json(
        ContentRepository::new(state.pool())
            .list_banners(false, query.position.as_deref())
            .await?,
    ))
}

/// GET /api/admin/banners/{id}
async fn show_banner(
    State(state): State<AppState>,
    _ctx: AdminContext,
    Path(id): Path<BannerId>,
) -> Result<Json<Banner>> {
    ContentRepository::new(state.pool())
        .get_banner(id)
        .await?
        .map(Json)
        .ok_or_else(|| not_found("Banner"))
}

async fn save_banner(
    state: &AppState,
    ctx: &AdminContext,
    id: Option<BannerId>,
    input: &BannerInput,
) -> Result<Banner> {
    let banner = ContentRepository::new(state.pool())
        .save_banner(id, input)
        .await?;
    ctx.audit(
        state,
        AuditAction::for_save(id),
        "banner",
        banner.id,
        json!({ "title": banner.title, "position": banner.position }),
    )
    .await;
    Ok(banner)
}

/// POST /api/admin/banners
#[instrument(skip(state, ctx, body))]
async fn create_banner(
    State(state): State<AppState>,
    ctx: AdminContext,
    Json(body): Json<BannerInput>,
) -> Result<(StatusCode, Json<Banner>)> {
    let banner = save_banner(&state, &ctx, None, &body).await?;
    Ok((StatusCode::CREATED, Json(banner)))
}

/// PUT /api/admin/banners/{id}
#[instrument(skip(state, ctx, body))]
async fn update_banner(
    State(state): State<AppState>,
    ctx: AdminContext,
    Path(id): Path<BannerId>,
    Json(body): Json<BannerInput>,
) -> Result<Json<Banner>> {
    Ok(Json(save_banner(&state, &ctx, Some(id), &body).await?))
}

/// DELETE /api/admin/banners/{id}
#[instrument(skip(state, ctx))]
async fn delete_banner(
    State(state): State<AppState>,
    ctx: AdminContext,
    Path(id): Path<BannerId>,
) -> Result<StatusCode> {
    ContentRepository::new(state.pool()).delete_banner(id).await?;
    ctx.audit(&state, AuditAction::Delete, "banner", id, json!({})).await;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Pages
// =============================================================================

/// All pages, drafts included.
///
/// GET /api/admin/pages
async fn list_pages(State(state): State<AppState>, _ctx: AdminContext) -> Result<Json<Vec<Page>>> {
    Ok(Json(ContentRepository::new(state.pool()).list_pages().await?))
}

/// GET /api/admin/pages/{id}
async fn show_page(
    State(state): State<AppState>,
    _ctx: AdminContext,
    Path(id): Path<PageId>,
) -> Result<Json<Page>> {
    ContentRepository::new(state.pool())
        .get_page(id)
        .await?
        .map(Json)
        .ok_or_else(|| not_found("Sayfa"))
}

async fn save_page(
    state: &AppState,
    ctx: &AdminContext,
    id: Option<PageId>,
    input: &PageInput,
) -> Result<Page> {
    let page = ContentRepository::new(state.pool()).save_page(id, input).await?;
    state.feeds().invalidate_all().await;
    ctx.audit(
        state,
        AuditAction::for_save(id),
        "page",
        page.id,
        json!({ "title": page.title, "slug": page.slug, "isPublished": page.is_published }),
    )
    .await;
    Ok(page)
}

/// POST /api/admin/pages
#[instrument(skip(state, ctx, body))]
async fn create_page(
    State(state): State<AppState>,
    ctx: AdminContext,
    Json(body): Json<PageInput>,
) -> Result<(StatusCode, Json<Page>)> {
    let page = save_page(&state, &ctx, None, &body).await?;
    Ok((StatusCode::CREATED, Json(page)))
}

/// PUT /api/admin/pages/{id}
#[instrument(skip(state, ctx, body))]
async fn update_page(
    State(state): State<AppState>,
    ctx: AdminContext,
    Path(id): Path<PageId>,
    Json(body): Json<PageInput>,
) -> Result<Json<Page>> {
    Ok(Json(save_page(&state, &ctx, Some(id), &body).await?))
}

/// DELETE /api/admin/pages/{id}
#[instrument(skip(state, ctx))]
async fn delete_page(
    State(state): State<AppState>,
    ctx: AdminContext,
    Path(id): Path<PageId>,
) -> Result<StatusCode> {
    ContentRepository::new(state.pool()).delete_page(id).await?;
    state.feeds().invalidate_all().await;
    ctx.audit(&state, AuditAction::Delete, "page", id, json!({})).await;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Layouts
// =============================================================================

/// GET /api/admin/layouts
async fn list_layouts(
    State(state): State<AppState>,
    _ctx: AdminContext,
) -> Result<Json<Vec<PageLayout>>> {
    Ok(Json(ContentRepository::new(state.pool()).list_layouts().await?))
}

/// A layout with disabled blocks kept, for editing.
///
/// GET /api/admin/layouts/{page}
async fn show_layout(
    State(state): State<AppState>,
    _ctx: AdminContext,
    Path(page): Path<String>,
) -> Result<Json<PageLayout>> {
    ContentRepository::new(state.pool())
        .get_layout(&page)
        .await?
        .map(Json)
        .ok_or_else(|| not_found("Sayfa düzeni"))
}

#[derive(Debug, Deserialize)]
pub struct LayoutRequest {
    pub blocks: Vec<LayoutBlock>,
}

fn is_layout_key(page: &str) -> bool {
    !page.is_empty()
        && page.len() <= MAX_LAYOUT_PAGE_LEN
        && page
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'_' || b == b'-')
}

/// Replace a page's blocks, creating the layout if needed.
///
/// PUT /api/admin/layouts/{page}
#[instrument(skip(state, ctx, body), fields(blocks = body.blocks.len()))]
async fn save_layout(
    State(state): State<AppState>,
    ctx: AdminContext,
    Path(page): Path<String>,
    Json(body): Json<LayoutRequest>,
) -> Result<Json<PageLayout>> {
    if !is_layout_key(&page) {
        return Err(AppError::BadRequest("Geçersiz sayfa anahtarı".to_string()));
    }
    if body.blocks.iter().any(|b| b.kind.trim().is_empty()) {
        return Err(AppError::BadRequest("Blok türü boş olamaz".to_string()));
    }

    let layout = ContentRepository::new(state.pool())
        .upsert_layout(&page, &body.blocks)
        .await?;
    let kinds: Vec<&str> = layout.blocks.iter().map(|b| b.kind.as_str()).collect();
    ctx.audit(
        &state,
        AuditAction::Update,
        "page_layout",
        &layout.page,
        json!({ "blocks": kinds }),
    )
    .await;
    Ok(Json(layout))
}

/// DELETE /api/admin/layouts/{page}
#[instrument(skip(state, ctx))]
async fn delete_layout(
    State(state): State<AppState>,
    ctx: AdminContext,
    Path(page): Path<String>,
) -> Result<StatusCode> {
    ContentRepository::new(state.pool()).delete_layout(&page).await?;
    ctx.audit(&state, AuditAction::Delete, "page_layout", &page, json!({})).await;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Navigation
// =============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct NavigationQuery {
    pub location: Option<String>,
}

/// GET /api/admin/navigation?location=
async fn list_navigation(
    State(state): State<AppState>,
    _ctx: AdminContext,
    Query(query): Query<NavigationQuery>,
) -> Result<Json<Vec<NavigationLink>>> {
    Ok(Json(
        ContentRepository::new(state.pool())
            .list_navigation(false, query.location.as_deref())
            .await?,
    ))
}

/// GET /api/admin/navigation/{id}
async fn show_navigation_link(
    State(state): State<AppState>,
    _ctx: AdminContext,
    Path(id): Path<NavigationLinkId>,
) -> Result<Json<NavigationLink>> {
    ContentRepository::new(state.pool())
        .get_navigation_link(id)
        .await?
        .map(Json)
        .ok_or_else(|| not_found("Menü bağlantısı"))
}

async fn save_navigation_link(
    state: &AppState,
    ctx: &AdminContext,
    id: Option<NavigationLinkId>,
    input: &NavigationLinkInput,
) -> Result<NavigationLink> {
    if id.is_some() && input.parent_id == id {
        return Err(AppError::BadRequest(
            "Bağlantı kendi alt öğesi olamaz".to_string(),
        ));
    }
    let link = ContentRepository::new(state.pool())
        .save_navigation_link(id, input)
        .await?;
    ctx.audit(
        state,
        AuditAction::for_save(id),
        "navigation_link",
        link.id,
        json!({ "label": link.label, "url": link.url, "location": link.location }),
    )
    .await;
    Ok(link)
}

/// POST /api/admin/navigation
#[instrument(skip(state, ctx, body))]
async fn create_navigation_link(
    State(state): State<AppState>,
    ctx: AdminContext,
    Json(body): Json<NavigationLinkInput>,
) -> Result<(StatusCode, Json<NavigationLink>)> {
    let link = save_navigation_link(&state, &ctx, None, &body).await?;
    Ok((StatusCode::CREATED, Json(link)))
}

/// PUT /api/admin/navigation/{id}
#[instrument(skip(state, ctx, body))]
async fn update_navigation_link(
    State(state): State<AppState>,
    ctx: AdminContext,
    Path(id): Path<NavigationLinkId>,
    Json(body): Json<NavigationLinkInput>,
) -> Result<Json<NavigationLink>> {
    Ok(Json(save_navigation_link(&state, &ctx, Some(id), &body).await?))
}

/// DELETE /api/admin/navigation/{id}
#[instrument(skip(state, ctx))]
async fn delete_navigation_link(
    State(state): State<AppState>,
    ctx: AdminContext,
    Path(id): Path<NavigationLinkId>,
) -> Result<StatusCode> {
    ContentRepository::new(state.pool())
        .delete_navigation_link(id)
        .await?;
    ctx.audit(&state, AuditAction::Delete, "navigation_link", id, json!({})).await;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Testimonials
// =============================================================================

/// GET /api/admin/testimonials
async fn list_testimonials(
    State(state): State<AppState>,
    _ctx: AdminContext,
) -> Result<Json<Vec<Testimonial>>> {
    Ok(Json(
        ContentRepository::new(state.pool())
            .list_testimonials(false)
            .await?,
    ))
}

/// GET /api/admin/testimonials/{id}
async fn show_testimonial(
    State(state): State<AppState>,
    _ctx: AdminContext,
    Path(id): Path<TestimonialId>,
) -> Result<Json<Testimonial>> {
    ContentRepository::new(state.pool())
        .get_testimonial(id)
        .await?
        .map(Json)
        .ok_or_else(|| not_found("Yorum"))
}

async fn save_testimonial(
    state: &AppState,
    ctx: &AdminContext,
    id: Option<TestimonialId>,
    input: &TestimonialInput,
) -> Result<Testimonial> {
    if !(1..=5).contains(&input.rating) {
        return Err(AppError::BadRequest("Puan 1 ile 5 arasında olmalı".to_string()));
    }
    let testimonial = ContentRepository::new(state.pool())
        .save_testimonial(id, input)
        .await?;
    ctx.audit(
        state,
        AuditAction::for_save(id),
        "testimonial",
        testimonial.id,
        json!({ "name": testimonial.name, "rating": testimonial.rating }),
    )
    .await;
    Ok(testimonial)
}

/// POST /api/admin/testimonials
#[instrument(skip(state, ctx, body))]
async fn create_testimonial(
    State(state): State<AppState>,
    ctx: AdminContext,
    Json(body): Json<TestimonialInput>,
) -> Result<(StatusCode, Json<Testimonial>)> {
    let testimonial = save_testimonial(&state, &ctx, None, &body).await?;
    Ok((StatusCode::CREATED, Json(testimonial)))
}

/// PUT /api/admin/testimonials/{id}
#[instrument(skip(state, ctx, body))]
async fn update_testimonial(
    State(state): State<AppState>,
    ctx: AdminContext,
    Path(id): Path<TestimonialId>,
    Json(body): Json<TestimonialInput>,
) -> Result<Json<Testimonial>> {
    Ok(Json(save_testimonial(&state, &ctx, Some(id), &body).await?))
}

/// DELETE /api/admin/testimonials/{id}
#[instrument(skip(state, ctx))]
async fn delete_testimonial(
    State(state): State<AppState>,
    ctx: AdminContext,
    Path(id): Path<TestimonialId>,
) -> Result<StatusCode> {
    ContentRepository::new(state.pool())
        .delete_testimonial(id)
        .await?;
    ctx.audit(&state, AuditAction::Delete, "testimonial", id, json!({})).await;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Campaigns
// =============================================================================

/// GET /api/admin/campaigns
async fn list_campaigns(
    State(state): State<AppState>,
    _ctx: AdminContext,
) -> Result<Json<Vec<Campaign>>> {
    Ok(Json(
        ContentRepository::new(state.pool())
            .list_campaigns(false)
            .await?,
    ))
}

/// GET /api/admin/campaigns/{id}
async fn show_campaign(
    State(state): State<AppState>,
    _ctx: AdminContext,
    Path(id): Path<CampaignId>,
) -> Result<Json<Campaign>> {
    ContentRepository::new(state.pool())
        .get_campaign(id)
        .await?
        .map(Json)
        .ok_or_else(|| not_found("Kampanya"))
}

async fn save_campaign(
    state: &AppState,
    ctx: &AdminContext,
    id: Option<CampaignId>,
    input: &CampaignInput,
) -> Result<Campaign> {
    if let (Some(starts), Some(ends)) = (input.starts_at, input.ends_at)
        && ends <= starts
    {
        return Err(AppError::BadRequest(
            "Bitiş tarihi başlangıçtan sonra olmalı".to_string(),
        ));
    }
    let campaign = ContentRepository::new(state.pool())
        .save_campaign(id, input)
        .await?;
    ctx.audit(
        state,
        AuditAction::for_save(id),
        "campaign",
        campaign.id,
        json!({ "title": campaign.title, "slug": campaign.slug }),
    )
    .await;
    Ok(campaign)
}

/// POST /api/admin/campaigns
#[instrument(skip(state, ctx, body))]
async fn create_campaign(
    State(state): State<AppState>,
    ctx: AdminContext,
    Json(body): Json<CampaignInput>,
) -> Result<(StatusCode, Json<Campaign>)> {
    let campaign = save_campaign(&state, &ctx, None, &body).await?;
    Ok((StatusCode::CREATED, Json(campaign)))
}

/// PUT /api/admin/campaigns/{id}
#[instrument(skip(state, ctx, body))]
async fn update_campaign(
    State(state): State<AppState>,
    ctx: AdminContext,
    Path(id): Path<CampaignId>,
    Json(body): Json<CampaignInput>,
) -> Result<Json<Campaign>> {
    Ok(Json(save_campaign(&state, &ctx, Some(id), &body).await?))
}

/// DELETE /api/admin/campaigns/{id}
#[instrument(skip(state, ctx))]
async fn delete_campaign(
    State(state): State<AppState>,
    ctx: AdminContext,
    Path(id): Path<CampaignId>,
) -> Result<StatusCode> {
    ContentRepository::new(state.pool()).delete_campaign(id).await?;
    ctx.audit(&state, AuditAction::Delete, "campaign", id, json!({})).await;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_keys() {
        assert!(is_layout_key("home"));
        assert!(is_layout_key("category-page_2"));
        assert!(!is_layout_key(""));
        assert!(!is_layout_key("Home"));
        assert!(!is_layout_key("../etc"));
        assert!(!is_layout_key(&"a".repeat(65)));
    }
}
