//! Public site content, settings, newsletter sign-up and KVKK consent.

use axum::{Router, extract::State, http::{HeaderMap, StatusCode, header}, routing::{get, post}};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::instrument;

use takviye_core::Email;

use crate::db::compliance::{ComplianceRepository, NewConsent};
use crate::db::content::ContentRepository;
use crate::error::{AppError, Result};
use crate::extract::{Json, Path, Query};
use crate::middleware::OptionalAuth;
use crate::middleware::auth::session_id;
use crate::middleware::client_ip;
use crate::models::content::{Banner, Campaign, NavigationLink, Page, PageLayout, Testimonial};
use crate::state::AppState;

const MAX_CONSENT_TYPE_LEN: usize = 64;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/pages/{slug}", get(show_page))
        .route("/banners", get(banners))
        .route("/navigation", get(navigation))
        .route("/testimonials", get(testimonials))
        .route("/campaigns", get(campaigns))
        .route("/layouts/{page}", get(layout))
        .route("/settings", get(settings))
        .route("/newsletter", post(subscribe))
        .route("/consent", post(consent))
}

/// GET /api/pages/{slug}
async fn show_page(State(state): State<AppState>, Path(slug): Path<String>) -> Result<Json<Page>> {
    ContentRepository::new(state.pool())
        .get_published_page(&slug)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Sayfa bulunamadı".to_string()))
}

#[derive(Debug, Default, Deserialize)]
pub struct BannerQuery {
    pub position: Option<String>,
}

/// GET /api/banners?position=
async fn banners(
    State(state): State<AppState>,
    Query(query): Query<BannerQuery>,
) -> Result<Json<Vec<Banner>>> {
    Ok(Json(
        ContentRepository::new(state.pool())
            .list_banners(true, query.position.as_deref())
            .await?,
    ))
}

#[derive(Debug, Default, Deserialize)]
pub struct NavigationQuery {
    pub location: Option<String>,
}

/// GET /api/navigation?location=
async fn navigation(
    State(state): State<AppState>,
    Query(query): Query<NavigationQuery>,
) -> Result<Json<Vec<NavigationLink>>> {
    Ok(Json(
        ContentRepository::new(state.pool())
            .list_navigation(true, query.location.as_deref())
            .await?,
    ))
}

/// GET /api/testimonials
async fn testimonials(State(state): State<AppState>) -> Result<Json<Vec<Testimonial>>> {
    Ok(Json(
        ContentRepository::new(state.pool())
            .list_testimonials(true)
            .await?,
    ))
}

/// Campaigns that are active and within their dates.
///
/// GET /api/campaigns
async fn campaigns(State(state): State<AppState>) -> Result<Json<Vec<Campaign>>> {
    Ok(Json(
        ContentRepository::new(state.pool())
            .list_campaigns(true)
            .await?,
    ))
}

/// SDUI layout with disabled blocks removed.
///
/// GET /api/layouts/{page}
async fn layout(
    State(state): State<AppState>,
    Path(page): Path<String>,
) -> Result<Json<PageLayout>> {
    ContentRepository::new(state.pool())
        .get_layout(&page)
        .await?
        .map(|l| Json(l.enabled_only()))
        .ok_or_else(|| AppError::NotFound("Sayfa düzeni bulunamadı".to_string()))
}

/// Public settings as one `{key: value}` object.
///
/// GET /api/settings
async fn settings(State(state): State<AppState>) -> Result<Json<Map<String, Value>>> {
    let settings = ContentRepository::new(state.pool()).list_settings().await?;
    Ok(Json(
        settings
            .into_iter()
            .filter(|s| s.is_public())
            .map(|s| (s.key, s.value))
            .collect(),
    ))
}

#[derive(Debug, Deserialize)]
pub struct NewsletterRequest {
    pub email: String,
}

/// Subscribe to the newsletter. Repeat sign-ups succeed.
///
/// POST /api/newsletter
#[instrument(skip(state, body))]
async fn subscribe(
    State(state): State<AppState>,
    Json(body): Json<NewsletterRequest>,
) -> Result<StatusCode> {
    let email = Email::parse(&body.email).map_err(|e| AppError::BadRequest(e.to_string()))?;
    ComplianceRepository::new(state.pool()).subscribe(&email).await?;
    tracing::info!("Newsletter subscription");
    Ok(StatusCode::CREATED)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsentRequest {
    pub consent_type: String,
    pub granted: bool,
}

/// Record a KVKK consent decision.
///
/// POST /api/consent
async fn consent(
    State(state): State<AppState>,
    OptionalAuth(claims): OptionalAuth,
    headers: HeaderMap,
    Json(body): Json<ConsentRequest>,
) -> Result<StatusCode> {
    let consent_type = body.consent_type.trim();
    if consent_type.is_empty() || consent_type.len() > MAX_CONSENT_TYPE_LEN {
        return Err(AppError::BadRequest("Geçersiz onay türü".to_string()));
    }

    ComplianceRepository::new(state.pool())
        .record_consent(&NewConsent {
            user_id: claims.map(|c| c.sub),
            session_id: session_id(&headers),
            consent_type,
            granted: body.granted,
            ip_address: client_ip(&headers).map(|ip| ip.to_string()),
            user_agent: headers
                .get(header::USER_AGENT)
                .and_then(|v| v.to_str().ok())
                .map(String::from),
        })
        .await?;
    Ok(StatusCode::CREATED)
}
