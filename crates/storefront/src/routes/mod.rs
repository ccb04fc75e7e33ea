//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Liveness
//! GET  /health/ready           - Readiness (database ping)
//!
//! # Generated outputs
//! GET  /feeds/{marketplace}.xml - Trendyol / Hepsiburada / N11 product feeds
//! GET  /sitemap.xml            - Sitemap
//! GET  /robots.txt             - Crawler rules
//!
//! # Public API (JSON)
//! /api/auth/*                  - Register, login, current user, profile
//! /api/categories, /api/brands, /api/products, /api/bundles
//! /api/cart, /api/coupons/validate, /api/payment-methods, /api/checkout
//! /api/orders, /api/favorites, /api/loyalty, /api/referral
//! /api/pages, /api/banners, /api/navigation, /api/testimonials,
//! /api/campaigns, /api/layouts, /api/settings
//! /api/blog/*, /api/wizard/analyze, /api/chat, /api/newsletter,
//! /api/consent, /api/seo/*
//!
//! # Back-office API (JSON, role gated)
//! /api/admin/{module}/*
//! ```

pub mod admin;
pub mod api;
pub mod feeds;

use std::time::Duration;

use axum::{
    Router,
    extract::State,
    http::{Method, StatusCode, header},
    middleware::from_fn,
    routing::get,
};
use serde::Deserialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::middleware::request_id_middleware;
use crate::models::PageRequest;
use crate::state::AppState;

/// `?page=&limit=` pagination parameters.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct Pagination {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl Pagination {
    #[must_use]
    pub fn request(self, default_limit: i64) -> PageRequest {
        PageRequest::new(self.page, self.limit, default_limit)
    }
}

/// Build the full application router.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
        ])
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            header::HeaderName::from_static(crate::middleware::auth::SESSION_HEADER),
        ])
        .max_age(Duration::from_secs(3600));

    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(feeds::router())
        .nest("/api", api::router())
        .nest("/api/admin", admin::router(state.clone()))
        .layer(from_fn(request_id_middleware))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>, latency: Duration, span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Verifies database connectivity before returning OK.
/// Returns 503 Service Unavailable if the database is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match sqlx::query("SELECT 1").fetch_one(state.pool()).await {
        Ok(_) => StatusCode::OK,
        Err(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}
