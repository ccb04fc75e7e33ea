//! Catalog management: products with variants, categories, brands and
//! review moderation.
//!
//! Product and variant changes drop the cached marketplace feeds and sitemap.

use axum::{Router, extract::State, http::StatusCode, routing::{get, put}};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::instrument;

use takviye_core::{BrandId, CategoryId, ProductId, ReviewId, VariantId};

use super::{ADMIN_PAGE_SIZE, not_found};
use crate::db::catalog::{
    BrandInput, CatalogRepository, CategoryInput, ProductFilter, ProductInput, ProductSort,
    VariantInput,
};
use crate::error::Result;
use crate::extract::{Json, Path, Query};
use crate::middleware::AdminContext;
use crate::models::catalog::{Brand, Category, Product, ProductListing, ProductVariant, Review};
use crate::models::Paginated;
use crate::routes::Pagination;
use crate::services::audit::AuditAction;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/products", get(list_products).post(create_product))
        .route(
            "/products/{id}",
            get(show_product).put(update_product).delete(delete_product),
        )
        .route("/products/{id}/variants", get(list_variants).post(create_variant))
        .route(
            "/products/{id}/variants/{variant_id}",
            put(update_variant).delete(delete_variant),
        )
        .route("/categories", get(list_categories).post(create_category))
        .route(
            "/categories/{id}",
            get(show_category).put(update_category).delete(delete_category),
        )
        .route("/brands", get(list_brands).post(create_brand))
        .route(
            "/brands/{id}",
            get(show_brand).put(update_brand).delete(delete_brand),
        )
        .route("/reviews", get(list_reviews))
        .route("/reviews/{id}", put(moderate_review).delete(delete_review))
        .route("/reviews/{id}/approve", put(approve_review))
}

// =============================================================================
// Products
// =============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminProductQuery {
    pub category: Option<String>,
    pub brand: Option<String>,
    pub search: Option<String>,
    pub featured: Option<bool>,
    #[serde(default)]
    pub sort: ProductSort,
}

/// All products, including inactive ones.
///
/// GET /api/admin/products
#[instrument(skip(state, _ctx))]
async fn list_products(
    State(state): State<AppState>,
    _ctx: AdminContext,
    Query(query): Query<AdminProductQuery>,
    Query(pagination): Query<Pagination>,
) -> Result<Json<Paginated<ProductListing>>> {
    let filter = ProductFilter {
        category: query.category,
        brand: query.brand,
        search: query.search,
        featured: query.featured,
        sort: query.sort,
        include_inactive: true,
        ..ProductFilter::default()
    };
    Ok(Json(
        CatalogRepository::new(state.pool())
            .list_products(&filter, pagination.request(ADMIN_PAGE_SIZE))
            .await?,
    ))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminProduct {
    #[serde(flatten)]
    pub product: Product,
    pub variants: Vec<ProductVariant>,
}

/// GET /api/admin/products/{id}
async fn show_product(
    State(state): State<AppState>,
    _ctx: AdminContext,
    Path(id): Path<ProductId>,
) -> Result<Json<AdminProduct>> {
    let catalog = CatalogRepository::new(state.pool());
    let product = catalog
        .get_product(id)
        .await?
        .ok_or_else(|| not_found("Ürün"))?;
    let variants = catalog.list_variants(id, false).await?;
    Ok(Json(AdminProduct { product, variants }))
}

async fn save_product(
    state: &AppState,
    ctx: &AdminContext,
    id: Option<ProductId>,
    input: &ProductInput,
) -> Result<Product> {
    let product = CatalogRepository::new(state.pool())
        .save_product(id, input)
        .await?;
    state.feeds().invalidate_all().await;
    ctx.audit(
        state,
        AuditAction::for_save(id),
        "product",
        product.id,
        json!({ "name": product.name, "slug": product.slug, "price": product.price }),
    )
    .await;
    Ok(product)
}

/// POST /api/admin/products
#[instrument(skip(state, ctx, body), fields(name = %body.name))]
async fn create_product(
    State(state): State<AppState>,
    ctx: AdminContext,
    Json(body): Json<ProductInput>,
) -> Result<(StatusCode, Json<Product>)> {
    let product = save_product(&state, &ctx, None, &body).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// PUT /api/admin/products/{id}
#[instrument(skip(state, ctx, body))]
async fn update_product(
    State(state): State<AppState>,
    ctx: AdminContext,
    Path(id): Path<ProductId>,
    Json(body): Json<ProductInput>,
) -> Result<Json<Product>> {
    Ok(Json(save_product(&state, &ctx, Some(id), &body).await?))
}

/// DELETE /api/admin/products/{id}
#[instrument(skip(state, ctx))]
async fn delete_product(
    State(state): State<AppState>,
    ctx: AdminContext,
    Path(id): Path<ProductId>,
) -> Result<StatusCode> {
    CatalogRepository::new(state.pool()).delete_product(id).await?;
    state.feeds().invalidate_all().await;
    ctx.audit(&state, AuditAction::Delete, "product", id, json!({})).await;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Variants
// =============================================================================

/// GET /api/admin/products/{id}/variants
async fn list_variants(
    State(state): State<AppState>,
    _ctx: AdminContext,
    Path(id): Path<ProductId>,
) -> Result<Json<Vec<ProductVariant>>> {
    Ok(Json(
        CatalogRepository::new(state.pool())
            .list_variants(id, false)
            .await?,
    ))
}

async fn save_variant(
    state: &AppState,
    ctx: &AdminContext,
    product_id: ProductId,
    id: Option<VariantId>,
    input: &VariantInput,
) -> Result<ProductVariant> {
    let catalog = CatalogRepository::new(state.pool());
    if catalog.get_product(product_id).await?.is_none() {
        return Err(not_found("Ürün"));
    }
    let variant = catalog.save_variant(product_id, id, input).await?;
    state.feeds().invalidate_all().await;
    ctx.audit(
        state,
        AuditAction::for_save(id),
        "product_variant",
        variant.id,
        json!({ "productId": product_id, "name": variant.name, "stock": variant.stock }),
    )
    .await;
    Ok(variant)
}

/// POST /api/admin/products/{id}/variants
#[instrument(skip(state, ctx, body))]
async fn create_variant(
    State(state): State<AppState>,
    ctx: AdminContext,
    Path(id): Path<ProductId>,
    Json(body): Json<VariantInput>,
) -> Result<(StatusCode, Json<ProductVariant>)> {
    let variant = save_variant(&state, &ctx, id, None, &body).await?;
    Ok((StatusCode::CREATED, Json(variant)))
}

/// PUT /api/admin/products/{id}/variants/{variant_id}
#[instrument(skip(state, ctx, body))]
async fn update_variant(
    State(state): State<AppState>,
    ctx: AdminContext,
    Path((id, variant_id)): Path<(ProductId, VariantId)>,
    Json(body): Json<VariantInput>,
) -> Result<Json<ProductVariant>> {
    Ok(Json(save_variant(&state, &ctx, id, Some(variant_id), &body).await?))
}

/// DELETE /api/admin/products/{id}/variants/{variant_id}
#[instrument(skip(state, ctx))]
async fn delete_variant(
    State(state): State<AppState>,
    ctx: AdminContext,
    Path((id, variant_id)): Path<(ProductId, VariantId)>,
) -> Result<StatusCode> {
    CatalogRepository::new(state.pool())
        .delete_variant(id, variant_id)
        .await?;
    state.feeds().invalidate_all().await;
    ctx.audit(
        &state,
        AuditAction::Delete,
        "product_variant",
        variant_id,
        json!({ "productId": id }),
    )
    .await;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Categories
// =============================================================================

/// GET /api/admin/categories
async fn list_categories(
    State(state): State<AppState>,
    _ctx: AdminContext,
) -> Result<Json<Vec<Category>>> {
    Ok(Json(
        CatalogRepository::new(state.pool())
            .list_categories(false)
            .await?,
    ))
}

/// GET /api/admin/categories/{id}
async fn show_category(
    State(state): State<AppState>,
    _ctx: AdminContext,
    Path(id): Path<CategoryId>,
) -> Result<Json<Category>> {
    CatalogRepository::new(state.pool())
        .get_category(id)
        .await?
        .map(Json)
        .ok_or_else(|| not_found("Kategori"))
}

async fn save_category(
    state: &AppState,
    ctx: &AdminContext,
    id: Option<CategoryId>,
    input: &CategoryInput,
) -> Result<Category> {
    let category = CatalogRepository::new(state.pool())
        .save_category(id, input)
        .await?;
    state.feeds().invalidate_all().await;
    ctx.audit(
        state,
        AuditAction::for_save(id),
        "category",
        category.id,
        json!({ "name": category.name, "slug": category.slug }),
    )
    .await;
    Ok(category)
}

/// POST /api/admin/categories
#[instrument(skip(state, ctx, body))]
async fn create_category(
    State(state): State<AppState>,
    ctx: AdminContext,
    Json(body): Json<CategoryInput>,
) -> Result<(StatusCode, Json<Category>)> {
    let category = save_category(&state, &ctx, None, &body).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

/// PUT /api/admin/categories/{id}
#[instrument(skip(state, ctx, body))]
async fn update_category(
    State(state): State<AppState>,
    ctx: AdminContext,
    Path(id): Path<CategoryId>,
    Json(body): Json<CategoryInput>,
) -> Result<Json<Category>> {
    Ok(Json(save_category(&state, &ctx, Some(id), &body).await?))
}

/// DELETE /api/admin/categories/{id}
#[instrument(skip(state, ctx))]
async fn delete_category(
    State(state): State<AppState>,
    ctx: AdminContext,
    Path(id): Path<CategoryId>,
) -> Result<StatusCode> {
    CatalogRepository::new(state.pool()).delete_category(id).await?;
    state.feeds().invalidate_all().await;
    ctx.audit(&state, AuditAction::Delete, "category", id, json!({})).await;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Brands
// =============================================================================

/// GET /api/admin/brands
async fn list_brands(State(state): State<AppState>, _ctx: AdminContext) -> Result<Json<Vec<Brand>>> {
    Ok(Json(CatalogRepository::new(state.pool()).list_brands(false).await?))
}

/// GET /api/admin/brands/{id}
async fn show_brand(
    State(state): State<AppState>,
    _ctx: AdminContext,
    Path(id): Path<BrandId>,
) -> Result<Json<Brand>> {
    CatalogRepository::new(state.pool())
        .get_brand(id)
        .await?
        .map(Json)
        .ok_or_else(|| not_found("Marka"))
}

async fn save_brand(
    state: &AppState,
    ctx: &AdminContext,
    id: Option<BrandId>,
    input: &BrandInput,
) -> Result<Brand> {
    let brand = CatalogRepository::new(state.pool())
        .save_brand(id, input)
        .await?;
    state.feeds().invalidate_all().await;
    ctx.audit(
        state,
        AuditAction::for_save(id),
        "brand",
        brand.id,
        json!({ "name": brand.name, "slug": brand.slug }),
    )
    .await;
    Ok(brand)
}

/// POST /api/admin/brands
#[instrument(skip(state, ctx, body))]
async fn create_brand(
    State(state): State<AppState>,
    ctx: AdminContext,
    Json(body): Json<BrandInput>,
) -> Result<(StatusCode, Json<Brand>)> {
    let brand = save_brand(&state, &ctx, None, &body).await?;
    Ok((StatusCode::CREATED, Json(brand)))
}

/// PUT /api/admin/brands/{id}
#[instrument(skip(state, ctx, body))]
async fn update_brand(
    State(state): State<AppState>,
    ctx: AdminContext,
    Path(id): Path<BrandId>,
    Json(body): Json<BrandInput>,
) -> Result<Json<Brand>> {
    Ok(Json(save_brand(&state, &ctx, Some(id), &body).await?))
}

/// DELETE /api/admin/brands/{id}
#[instrument(skip(state, ctx))]
async fn delete_brand(
    State(state): State<AppState>,
    ctx: AdminContext,
    Path(id): Path<BrandId>,
) -> Result<StatusCode> {
    CatalogRepository::new(state.pool()).delete_brand(id).await?;
    state.feeds().invalidate_all().await;
    ctx.audit(&state, AuditAction::Delete, "brand", id, json!({})).await;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Reviews
// =============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct ReviewQuery {
    pub approved: Option<bool>,
}

/// Reviews, optionally only pending (`approved=false`) or approved ones.
///
/// GET /api/admin/reviews
#[instrument(skip(state, _ctx))]
async fn list_reviews(
    State(state): State<AppState>,
    _ctx: AdminContext,
    Query(query): Query<ReviewQuery>,
    Query(pagination): Query<Pagination>,
) -> Result<Json<Paginated<Review>>> {
    Ok(Json(
        CatalogRepository::new(state.pool())
            .list_reviews(query.approved, pagination.request(ADMIN_PAGE_SIZE))
            .await?,
    ))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModerationRequest {
    pub is_approved: bool,
}

async fn set_review_approved(
    state: &AppState,
    ctx: &AdminContext,
    id: ReviewId,
    approved: bool,
) -> Result<StatusCode> {
    CatalogRepository::new(state.pool())
        .set_review_approved(id, approved)
        .await?;
    ctx.audit(
        state,
        AuditAction::for_approval(approved),
        "review",
        id,
        json!({ "isApproved": approved }),
    )
    .await;
    Ok(StatusCode::NO_CONTENT)
}

/// Approve or hide a review.
///
/// PUT /api/admin/reviews/{id}
#[instrument(skip(state, ctx))]
async fn moderate_review(
    State(state): State<AppState>,
    ctx: AdminContext,
    Path(id): Path<ReviewId>,
    Json(body): Json<ModerationRequest>,
) -> Result<StatusCode> {
    set_review_approved(&state, &ctx, id, body.is_approved).await
}

/// PUT /api/admin/reviews/{id}/approve
#[instrument(skip(state, ctx))]
async fn approve_review(
    State(state): State<AppState>,
    ctx: AdminContext,
    Path(id): Path<ReviewId>,
) -> Result<StatusCode> {
    set_review_approved(&state, &ctx, id, true).await
}

/// DELETE /api/admin/reviews/{id}
#[instrument(skip(state, ctx))]
async fn delete_review(
    State(state): State<AppState>,
    ctx: AdminContext,
    Path(id): Path<ReviewId>,
) -> Result<StatusCode> {
    CatalogRepository::new(state.pool()).delete_review(id).await?;
    ctx.audit(&state, AuditAction::Delete, "review", id, json!({})).await;
    Ok(StatusCode::NO_CONTENT)
}
