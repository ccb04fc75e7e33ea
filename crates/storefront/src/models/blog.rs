//! Blog rows.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

use takviye_core::{BlogCategoryId, BlogCommentId, BlogPostId, UserId};

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct BlogCategory {
    pub id: BlogCategoryId,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A post. `content` is markdown.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct BlogPost {
    pub id: BlogPostId,
    pub title: String,
    pub slug: String,
    pub excerpt: Option<String>,
    pub content: String,
    pub cover_image: Option<String>,
    pub category_id: Option<BlogCategoryId>,
    pub author_id: Option<UserId>,
    #[sqlx(json)]
    pub tags: Vec<String>,
    pub is_published: bool,
    pub published_at: Option<DateTime<Utc>>,
    pub view_count: i32,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Post payload with rendered HTML and reading time.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedPost {
    #[serde(flatten)]
    pub post: BlogPost,
    pub content_html: String,
    pub reading_minutes: u32,
    pub category: Option<BlogCategory>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct BlogComment {
    pub id: BlogCommentId,
    pub post_id: BlogPostId,
    pub user_id: Option<UserId>,
    pub author_name: String,
    pub content: String,
    pub is_approved: bool,
    pub created_at: DateTime<Utc>,
}
