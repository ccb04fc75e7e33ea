//! Blog: categories, published posts and comments.

use axum::{Router, extract::State, http::StatusCode, routing::get};
use serde::Deserialize;
use tracing::instrument;

use takviye_core::BlogPostId;

use crate::db::blog::{BlogRepository, PostFilter};
use crate::error::{AppError, Result};
use crate::extract::{Json, Path, Query};
use crate::middleware::OptionalAuth;
use crate::models::blog::{BlogCategory, BlogComment, BlogPost, RenderedPost};
use crate::models::{PageRequest, Paginated};
use crate::services::markdown;
use crate::state::AppState;

const MAX_COMMENT_CHARS: usize = 2000;
const MAX_AUTHOR_CHARS: usize = 100;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/blog/categories", get(categories))
        .route("/blog/posts", get(list_posts))
        .route("/blog/posts/{post}", get(show_post))
        .route("/blog/posts/{post}/comments", get(list_comments).post(create_comment))
}

fn post_not_found() -> AppError {
    AppError::NotFound("Yazı bulunamadı".to_string())
}

/// GET /api/blog/categories
async fn categories(State(state): State<AppState>) -> Result<Json<Vec<BlogCategory>>> {
    Ok(Json(BlogRepository::new(state.pool()).list_categories().await?))
}

#[derive(Debug, Default, Deserialize)]
pub struct PostQuery {
    pub category: Option<String>,
    pub tag: Option<String>,
    pub search: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// GET /api/blog/posts
async fn list_posts(
    State(state): State<AppState>,
    Query(query): Query<PostQuery>,
) -> Result<Json<Paginated<BlogPost>>> {
    let filter = PostFilter {
        category: query.category,
        tag: query.tag,
        search: query.search,
        include_unpublished: false,
    };
    let page = PageRequest::new(query.page, query.limit, 12);
    Ok(Json(BlogRepository::new(state.pool()).list_posts(&filter, page).await?))
}

/// Published post with rendered HTML. Counts a view.
///
/// GET /api/blog/posts/{slug}
#[instrument(skip(state))]
async fn show_post(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<RenderedPost>> {
    let blog = BlogRepository::new(state.pool());
    let post = blog.get_published_post(&slug).await?.ok_or_else(post_not_found)?;

    if let Err(e) = blog.increment_views(post.id).await {
        tracing::warn!(error = %e, post_id = %post.id, "Failed to count blog view");
    }
    let category = match post.category_id {
        Some(id) => blog.get_category(id).await?,
        None => None,
    };

    Ok(Json(RenderedPost {
        content_html: markdown::render(&post.content),
        reading_minutes: markdown::reading_minutes(&post.content),
        category,
        post,
    }))
}

/// GET /api/blog/posts/{id}/comments
async fn list_comments(
    State(state): State<AppState>,
    Path(id): Path<BlogPostId>,
) -> Result<Json<Vec<BlogComment>>> {
    Ok(Json(BlogRepository::new(state.pool()).list_approved_comments(id).await?))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentRequest {
    pub author_name: Option<String>,
    pub content: String,
}

/// Leave a comment. Comments wait for moderation.
///
/// POST /api/blog/posts/{id}/comments
#[instrument(skip(state, claims, body))]
async fn create_comment(
    State(state): State<AppState>,
    OptionalAuth(claims): OptionalAuth,
    Path(id): Path<BlogPostId>,
    Json(body): Json<CommentRequest>,
) -> Result<(StatusCode, Json<BlogComment>)> {
    let content = body.content.trim();
    if content.is_empty() || content.chars().count() > MAX_COMMENT_CHARS {
        return Err(AppError::BadRequest(format!(
            "Yorum 1-{MAX_COMMENT_CHARS} karakter olmalı"
        )));
    }
    let author = body
        .author_name
        .as_deref()
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .map(str::to_owned)
        .or_else(|| claims.as_ref().map(|c| c.username.clone()))
        .ok_or_else(|| AppError::BadRequest("İsim zorunludur".to_string()))?;
    if author.chars().count() > MAX_AUTHOR_CHARS {
        return Err(AppError::BadRequest("İsim çok uzun".to_string()));
    }

    let blog = BlogRepository::new(state.pool());
    blog.get_post(id)
        .await?
        .filter(|p| p.is_published)
        .ok_or_else(post_not_found)?;

    let comment = blog
        .create_comment(id, claims.map(|c| c.sub), &author, content)
        .await?;
    Ok((StatusCode::CREATED, Json(comment)))
}
