//! Blog editing: categories, posts and comment moderation.

use axum::{Router, extract::State, http::StatusCode, routing::{get, put}};
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;

use takviye_core::{BlogCategoryId, BlogCommentId, BlogPostId};

use super::{ADMIN_PAGE_SIZE, not_found};
use crate::db::blog::{BlogCategoryInput, BlogPostInput, BlogRepository, PostFilter};
use crate::error::{AppError, Result};
use crate::extract::{Json, Path, Query};
use crate::middleware::AdminContext;
use crate::models::Paginated;
use crate::models::blog::{BlogCategory, BlogComment, BlogPost};
use crate::routes::Pagination;
use crate::services::audit::AuditAction;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/blog/categories", get(list_categories).post(create_category))
        .route(
            "/blog/categories/{id}",
            get(show_category).put(update_category).delete(delete_category),
        )
        .route("/blog/posts", get(list_posts).post(create_post))
        .route(
            "/blog/posts/{id}",
            get(show_post).put(update_post).delete(delete_post),
        )
        .route("/blog/comments", get(list_comments))
        .route(
            "/blog/comments/{id}",
            put(moderate_comment).delete(delete_comment),
        )
}

// =============================================================================
// Categories
// =============================================================================

/// GET /api/admin/blog/categories
async fn list_categories(
    State(state): State<AppState>,
    _ctx: AdminContext,
) -> Result<Json<Vec<BlogCategory>>> {
    Ok(Json(BlogRepository::new(state.pool()).list_categories().await?))
}

/// GET /api/admin/blog/categories/{id}
async fn show_category(
    State(state): State<AppState>,
    _ctx: AdminContext,
    Path(id): Path<BlogCategoryId>,
) -> Result<Json<BlogCategory>> {
    BlogRepository::new(state.pool())
        .get_category(id)
        .await?
        .map(Json)
        .ok_or_else(|| not_found("Blog kategorisi"))
}

async fn save_category(
    state: &AppState,
    ctx: &AdminContext,
    id: Option<BlogCategoryId>,
    input: &BlogCategoryInput,
) -> Result<BlogCategory> {
    let category = BlogRepository::new(state.pool())
        .save_category(id, input)
        .await?;
    ctx.audit(
        state,
        AuditAction::for_save(id),
        "blog_category",
        category.id,
        json!({ "name": category.name, "slug": category.slug }),
    )
    .await;
    Ok(category)
}

/// POST /api/admin/blog/categories
#[instrument(skip(state, ctx, body))]
async fn create_category(
    State(state): State<AppState>,
    ctx: AdminContext,
    Json(body): Json<BlogCategoryInput>,
) -> Result<(StatusCode, Json<BlogCategory>)> {
    let category = save_category(&state, &ctx, None, &body).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

/// PUT /api/admin/blog/categories/{id}
#[instrument(skip(state, ctx, body))]
async fn update_category(
    State(state): State<AppState>,
    ctx: AdminContext,
    Path(id): Path<BlogCategoryId>,
    Json(body): Json<BlogCategoryInput>,
) -> Result<Json<BlogCategory>> {
    Ok(Json(save_category(&state, &ctx, Some(id), &body).await?))
}

/// DELETE /api/admin/blog/categories/{id}
#[instrument(skip(state, ctx))]
async fn delete_category(
    State(state): State<AppState>,
    ctx: AdminContext,
    Path(id): Path<BlogCategoryId>,
) -> Result<StatusCode> {
    BlogRepository::new(state.pool()).delete_category(id).await?;
    ctx.audit(&state, AuditAction::Delete, "blog_category", id, json!({})).await;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Posts
// =============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct AdminPostQuery {
    pub category: Option<String>,
    pub tag: Option<String>,
    pub search: Option<String>,
}

/// Posts including drafts.
///
/// GET /api/admin/blog/posts
#[instrument(skip(state, _ctx))]
async fn list_posts(
    State(state): State<AppState>,
    _ctx: AdminContext,
    Query(query): Query<AdminPostQuery>,
    Query(pagination): Query<Pagination>,
) -> Result<Json<Paginated<BlogPost>>> {
    let filter = PostFilter {
        category: query.category,
        tag: query.tag,
        search: query.search,
        include_unpublished: true,
    };
    Ok(Json(
        BlogRepository::new(state.pool())
            .list_posts(&filter, pagination.request(ADMIN_PAGE_SIZE))
            .await?,
    ))
}

/// GET /api/admin/blog/posts/{id}
async fn show_post(
    State(state): State<AppState>,
    _ctx: AdminContext,
    Path(id): Path<BlogPostId>,
) -> Result<Json<BlogPost>> {
    BlogRepository::new(state.pool())
        .get_post(id)
        .await?
        .map(Json)
        .ok_or_else(|| not_found("Yazı"))
}

async fn save_post(
    state: &AppState,
    ctx: &AdminContext,
    id: Option<BlogPostId>,
    input: &BlogPostInput,
) -> Result<BlogPost> {
    if input.title.trim().is_empty() {
        return Err(AppError::BadRequest("Başlık boş olamaz".to_string()));
    }
    let post = BlogRepository::new(state.pool())
        .save_post(id, ctx.claims.sub, input)
        .await?;
    state.feeds().invalidate_all().await;
    ctx.audit(
        state,
        AuditAction::for_save(id),
        "blog_post",
        post.id,
        json!({ "title": post.title, "slug": post.slug, "isPublished": post.is_published }),
    )
    .await;
    Ok(post)
}

/// POST /api/admin/blog/posts
#[instrument(skip(state, ctx, body), fields(title = %body.title))]
async fn create_post(
    State(state): State<AppState>,
    ctx: AdminContext,
    Json(body): Json<BlogPostInput>,
) -> Result<(StatusCode, Json<BlogPost>)> {
    let post = save_post(&state, &ctx, None, &body).await?;
    Ok((StatusCode::CREATED, Json(post)))
}

/// PUT /api/admin/blog/posts/{id}
#[instrument(skip(state, ctx, body))]
async fn update_post(
    State(state): State<AppState>,
    ctx: AdminContext,
    Path(id): Path<BlogPostId>,
    Json(body): Json<BlogPostInput>,
) -> Result<Json<BlogPost>> {
    Ok(Json(save_post(&state, &ctx, Some(id), &body).await?))
}

/// DELETE /api/admin/blog/posts/{id}
#[instrument(skip(state, ctx))]
async fn delete_post(
    State(state): State<AppState>,
    ctx: AdminContext,
    Path(id): Path<BlogPostId>,
) -> Result<StatusCode> {
    BlogRepository::new(state.pool()).delete_post(id).await?;
    state.feeds().invalidate_all().await;
    ctx.audit(&state, AuditAction::Delete, "blog_post", id, json!({})).await;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Comments
// =============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct CommentQuery {
    pub approved: Option<bool>,
}

/// GET /api/admin/blog/comments?approved=
async fn list_comments(
    State(state): State<AppState>,
    _ctx: AdminContext,
    Query(query): Query<CommentQuery>,
) -> Result<Json<Vec<BlogComment>>> {
    Ok(Json(
        BlogRepository::new(state.pool())
            .list_comments(query.approved)
            .await?,
    ))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModerationRequest {
    pub is_approved: bool,
}

/// PUT /api/admin/blog/comments/{id}
#[instrument(skip(state, ctx))]
async fn moderate_comment(
    State(state): State<AppState>,
    ctx: AdminContext,
    Path(id): Path<BlogCommentId>,
    Json(body): Json<ModerationRequest>,
) -> Result<StatusCode> {
    BlogRepository::new(state.pool())
        .set_comment_approved(id, body.is_approved)
        .await?;
    ctx.audit(
        &state,
        AuditAction::for_approval(body.is_approved),
        "blog_comment",
        id,
        json!({ "isApproved": body.is_approved }),
    )
    .await;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/admin/blog/comments/{id}
#[instrument(skip(state, ctx))]
async fn delete_comment(
    State(state): State<AppState>,
    ctx: AdminContext,
    Path(id): Path<BlogCommentId>,
) -> Result<StatusCode> {
    BlogRepository::new(state.pool()).delete_comment(id).await?;
    ctx.audit(&state, AuditAction::Delete, "blog_comment", id, json!({})).await;
    Ok(StatusCode::NO_CONTENT)
}
