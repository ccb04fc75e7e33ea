//! Catalog: categories, brands, products, reviews, bundles, the wizard and
//! JSON-LD for product and post pages.

use axum::{Router, extract::State, http::StatusCode, routing::{get, post}};
use serde::Deserialize;
use tracing::instrument;

use takviye_core::wizard::{self, WizardProfile};
use takviye_core::{Money, ProductId};

use crate::db::blog::BlogRepository;
use crate::db::bundles::BundleRepository;
use crate::db::catalog::{CatalogRepository, ProductFilter, ProductSort};
use crate::db::users::UserRepository;
use crate::error::{AppError, Result};
use crate::extract::{Json, Path, Query};
use crate::middleware::RequireAuth;
use crate::models::{PageRequest, Paginated};
use crate::models::bundle::{Bundle, BundleDetail};
use crate::models::catalog::{
    Brand, Category, ProductDetail, ProductListing, Review, average_rating,
};
use crate::services::seo;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/categories", get(list_categories))
        .route("/categories/{slug}", get(show_category))
        .route("/brands", get(list_brands))
        .route("/products", get(list_products))
        .route("/products/{product}", get(show_product))
        .route("/products/{product}/reviews", get(list_reviews).post(create_review))
        .route("/bundles", get(list_bundles))
        .route("/bundles/{slug}", get(show_bundle))
        .route("/wizard/analyze", post(analyze))
        .route("/seo/products/{slug}", get(product_json_ld))
        .route("/seo/blog/{slug}", get(blog_json_ld))
}

fn product_not_found() -> AppError {
    AppError::NotFound("Ürün bulunamadı".to_string())
}

/// GET /api/categories
async fn list_categories(State(state): State<AppState>) -> Result<Json<Vec<Category>>> {
    Ok(Json(CatalogRepository::new(state.pool()).list_categories(true).await?))
}

/// GET /api/categories/{slug}
async fn show_category(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Category>> {
    CatalogRepository::new(state.pool())
        .get_category_by_slug(&slug)
        .await?
        .filter(|c| c.is_active)
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Kategori bulunamadı".to_string()))
}

/// GET /api/brands
async fn list_brands(State(state): State<AppState>) -> Result<Json<Vec<Brand>>> {
    Ok(Json(CatalogRepository::new(state.pool()).list_brands(true).await?))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductQuery {
    pub category: Option<String>,
    pub brand: Option<String>,
    pub search: Option<String>,
    pub featured: Option<bool>,
    pub min_price: Option<Money>,
    pub max_price: Option<Money>,
    #[serde(default)]
    pub sort: ProductSort,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// Active products, filtered and paginated.
///
/// GET /api/products
#[instrument(skip(state))]
async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ProductQuery>,
) -> Result<Json<Paginated<ProductListing>>> {
    let filter = ProductFilter {
        category: query.category,
        brand: query.brand,
        search: query.search,
        featured: query.featured,
        min_price: query.min_price,
        max_price: query.max_price,
        sort: query.sort,
        include_inactive: false,
    };
    let page = PageRequest::new(query.page, query.limit, 20);
    Ok(Json(CatalogRepository::new(state.pool()).list_products(&filter, page).await?))
}

/// Product with variants, approved reviews and rating.
///
/// GET /api/products/{slug}
#[instrument(skip(state))]
async fn show_product(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<ProductDetail>> {
    let catalog = CatalogRepository::new(state.pool());
    let product = catalog
        .get_product_by_slug(&slug, false)
        .await?
        .ok_or_else(product_not_found)?;

    let category = match product.category_id {
        Some(id) => catalog.get_category(id).await?,
        None => None,
    };
    let brand = match product.brand_id {
        Some(id) => catalog.get_brand(id).await?,
        None => None,
    };
    let variants = catalog.list_variants(product.id, true).await?;
    let reviews = catalog.list_approved_reviews(product.id).await?;

    Ok(Json(ProductDetail {
        average_rating: average_rating(&reviews),
        review_count: reviews.len(),
        discount_percentage: product.price_pair().discount_percentage(),
        product,
        category,
        brand,
        variants,
        reviews,
    }))
}

/// GET /api/products/{id}/reviews
async fn list_reviews(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<Vec<Review>>> {
    Ok(Json(CatalogRepository::new(state.pool()).list_approved_reviews(id).await?))
}

#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    pub rating: i32,
    pub title: Option<String>,
    pub comment: Option<String>,
}

/// Submit a review. Reviews wait for moderation.
///
/// POST /api/products/{id}/reviews
#[instrument(skip(state, claims, body), fields(user_id = %claims.sub))]
async fn create_review(
    State(state): State<AppState>,
    RequireAuth(claims): RequireAuth,
    Path(id): Path<ProductId>,
    Json(body): Json<ReviewRequest>,
) -> Result<(StatusCode, Json<Review>)> {
    if !(1..=5).contains(&body.rating) {
        return Err(AppError::BadRequest("Puan 1 ile 5 arasında olmalı".to_string()));
    }
    let catalog = CatalogRepository::new(state.pool());
    catalog
        .get_product(id)
        .await?
        .filter(|p| p.is_active)
        .ok_or_else(product_not_found)?;

    let review = catalog
        .create_review(
            id,
            claims.sub,
            body.rating,
            body.title.as_deref().map(str::trim).filter(|t| !t.is_empty()),
            body.comment.as_deref().map(str::trim).filter(|c| !c.is_empty()),
        )
        .await?;
    Ok((StatusCode::CREATED, Json(review)))
}

/// Resolve the products of several bundles with one query.
async fn resolve_bundles(state: &AppState, bundles: Vec<Bundle>) -> Result<Vec<BundleDetail>> {
    let mut ids: Vec<ProductId> = bundles.iter().flat_map(Bundle::product_ids).collect();
    ids.sort_unstable();
    ids.dedup();
    let products = CatalogRepository::new(state.pool()).get_products(&ids).await?;
    Ok(bundles
        .into_iter()
        .map(|b| BundleDetail::resolve(b, &products))
        .collect())
}

/// GET /api/bundles
async fn list_bundles(State(state): State<AppState>) -> Result<Json<Vec<BundleDetail>>> {
    let bundles = BundleRepository::new(state.pool()).list(true).await?;
    Ok(Json(resolve_bundles(&state, bundles).await?))
}

/// GET /api/bundles/{slug}
async fn show_bundle(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<BundleDetail>> {
    let bundle = BundleRepository::new(state.pool())
        .get_by_slug(&slug)
        .await?
        .filter(|b| b.is_active)
        .ok_or_else(|| AppError::NotFound("Paket bulunamadı".to_string()))?;
    let mut details = resolve_bundles(&state, vec![bundle]).await?;
    details.pop().map(Json).ok_or_else(|| AppError::NotFound("Paket bulunamadı".to_string()))
}

/// Score active bundles against quiz answers.
///
/// POST /api/wizard/analyze
#[instrument(skip(state, profile), fields(goal = %profile.goal))]
async fn analyze(
    State(state): State<AppState>,
    Json(profile): Json<WizardProfile>,
) -> Result<Json<serde_json::Value>> {
    if profile.goal.trim().is_empty() {
        return Err(AppError::BadRequest("Hedef seçmelisiniz".to_string()));
    }
    if !(10..=100).contains(&profile.age) || !(20.0..=300.0).contains(&profile.weight) {
        return Err(AppError::BadRequest("Yaş veya kilo geçersiz".to_string()));
    }

    let bundles = BundleRepository::new(state.pool()).list(true).await?;
    let result = wizard::analyze(&profile, &bundles);
    tracing::info!(
        match_percentage = result.match_percentage,
        recommendations = result.recommendations.len(),
        "Wizard analyzed"
    );
    let body = serde_json::to_value(&result).map_err(|e| AppError::Internal(e.to_string()))?;
    Ok(Json(body))
}

/// GET /api/seo/products/{slug}
async fn product_json_ld(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<serde_json::Value>> {
    let catalog = CatalogRepository::new(state.pool());
    let product = catalog
        .get_product_by_slug(&slug, false)
        .await?
        .ok_or_else(product_not_found)?;
    let brand = match product.brand_id {
        Some(id) => catalog.get_brand(id).await?,
        None => None,
    };
    let reviews = catalog.list_approved_reviews(product.id).await?;
    Ok(Json(seo::product_json_ld(state.config(), &product, brand.as_ref(), &reviews)))
}

/// GET /api/seo/blog/{slug}
async fn blog_json_ld(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<serde_json::Value>> {
    let post = BlogRepository::new(state.pool())
        .get_published_post(&slug)
        .await?
        .ok_or_else(|| AppError::NotFound("Yazı bulunamadı".to_string()))?;
    let author = match post.author_id {
        Some(id) => UserRepository::new(state.pool()).get_by_id(id).await?,
        None => None,
    };
    let author_name = author.map(|u| u.full_name.unwrap_or(u.username));
    Ok(Json(seo::blog_post_json_ld(state.config(), &post, author_name.as_deref())))
}
