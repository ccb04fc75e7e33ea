//! Blog repository.

use serde::Deserialize;
use sqlx::PgPool;

use takviye_core::{BlogCategoryId, BlogCommentId, BlogPostId, UserId};

use super::catalog::slug_or_name;
use super::{RepositoryError, conflict_on_unique, delete_by_id, found, like_pattern};
use crate::models::blog::{BlogCategory, BlogComment, BlogPost};
use crate::models::{PageRequest, Paginated};

const CATEGORY_COLUMNS: &str = "id, name, slug, description, created_at";
const POST_COLUMNS: &str = "id, title, slug, excerpt, content, cover_image, category_id, \
     author_id, tags, is_published, published_at, view_count, meta_title, meta_description, \
     created_at, updated_at";
const COMMENT_COLUMNS: &str = "id, post_id, user_id, author_name, content, is_approved, created_at";

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogCategoryInput {
    pub name: String,
    pub slug: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogPostInput {
    pub title: String,
    pub slug: Option<String>,
    pub excerpt: Option<String>,
    pub content: String,
    pub cover_image: Option<String>,
    pub category_id: Option<BlogCategoryId>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub is_published: bool,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
}

/// Public post listing filter.
#[derive(Debug, Clone, Default)]
pub struct PostFilter {
    /// Category slug.
    pub category: Option<String>,
    pub tag: Option<String>,
    pub search: Option<String>,
    pub include_unpublished: bool,
}

/// Repository for blog categories, posts and comments.
pub struct BlogRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> BlogRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_categories(&self) -> Result<Vec<BlogCategory>, RepositoryError> {
        let rows = sqlx::query_as::<_, BlogCategory>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM blog_categories ORDER BY name"
        ))
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_category(&self, id: BlogCategoryId) -> Result<Option<BlogCategory>, RepositoryError> {
        let row = sqlx::query_as::<_, BlogCategory>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM blog_categories WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(row)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` on a duplicate slug and
    /// `RepositoryError::NotFound` when updating a missing row.
    pub async fn save_category(
        &self,
        id: Option<BlogCategoryId>,
        input: &BlogCategoryInput,
    ) -> Result<BlogCategory, RepositoryError> {
        let slug = slug_or_name(input.slug.as_deref(), &input.name);
        let sql = match id {
            None => format!(
                "INSERT INTO blog_categories (name, slug, description) VALUES ($2, $3, $4) \
                 RETURNING {CATEGORY_COLUMNS}"
            ),
            Some(_) => format!(
                "UPDATE blog_categories SET name = $2, slug = $3, description = $4 \
                 WHERE id = $1 RETURNING {CATEGORY_COLUMNS}"
            ),
        };
        let row = sqlx::query_as::<_, BlogCategory>(&sql)
            .bind(id)
            .bind(&input.name)
            .bind(&slug)
            .bind(&input.description)
            .fetch_optional(self.pool)
            .await
            .map_err(conflict_on_unique("Blog kategorisi adresi"))?;
        found(row)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the category does not exist.
    pub async fn delete_category(&self, id: BlogCategoryId) -> Result<(), RepositoryError> {
        sqlx::query("UPDATE blog_posts SET category_id = NULL WHERE category_id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        delete_by_id(self.pool, "blog_categories", id).await
    }

    /// Posts, newest first. Unpublished posts only when asked for.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_posts(
        &self,
        filter: &PostFilter,
        page: PageRequest,
    ) -> Result<Paginated<BlogPost>, RepositoryError> {
        let search = filter
            .search
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .map(like_pattern);
        let tag = filter.tag.as_deref().map(|t| serde_json::json!([t]));
        let conditions = "($1 OR is_published) \
             AND ($2::TEXT IS NULL OR category_id = (SELECT id FROM blog_categories WHERE slug = $2)) \
             AND ($3::JSONB IS NULL OR tags @> $3) \
             AND ($4::TEXT IS NULL OR title ILIKE $4 OR excerpt ILIKE $4)";

        let total: i64 =
            sqlx::query_scalar(&format!("SELECT COUNT(*) FROM blog_posts WHERE {conditions}"))
                .bind(filter.include_unpublished)
                .bind(&filter.category)
                .bind(&tag)
                .bind(&search)
                .fetch_one(self.pool)
                .await?;

        let rows = sqlx::query_as::<_, BlogPost>(&format!(
            "SELECT {POST_COLUMNS} FROM blog_posts WHERE {conditions} \
             ORDER BY COALESCE(published_at, created_at) DESC LIMIT $5 OFFSET $6"
        ))
        .bind(filter.include_unpublished)
        .bind(&filter.category)
        .bind(&tag)
        .bind(&search)
        .bind(page.limit)
        .bind(page.offset())
        .fetch_all(self.pool)
        .await?;

        Ok(page.wrap(rows, total))
    }

    /// All published posts, for the sitemap.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_published(&self) -> Result<Vec<BlogPost>, RepositoryError> {
        let rows = sqlx::query_as::<_, BlogPost>(&format!(
            "SELECT {POST_COLUMNS} FROM blog_posts WHERE is_published ORDER BY published_at DESC"
        ))
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// A published post by slug.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_published_post(&self, slug: &str) -> Result<Option<BlogPost>, RepositoryError> {
        let row = sqlx::query_as::<_, BlogPost>(&format!(
            "SELECT {POST_COLUMNS} FROM blog_posts WHERE slug = $1 AND is_published"
        ))
        .bind(slug)
        .fetch_optional(self.pool)
        .await?;
        Ok(row)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_post(&self, id: BlogPostId) -> Result<Option<BlogPost>, RepositoryError> {
        let row = sqlx::query_as::<_, BlogPost>(&format!(
            "SELECT {POST_COLUMNS} FROM blog_posts WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(row)
    }

    /// Bump the view counter.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn increment_views(&self, id: BlogPostId) -> Result<(), RepositoryError> {
        sqlx::query("UPDATE blog_posts SET view_count = view_count + 1 WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(())
    }

    /// Insert or update a post. `published_at` is stamped the first time a
    /// post is published.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` on a duplicate slug and
    /// `RepositoryError::NotFound` when updating a missing row.
    pub async fn save_post(
        &self,
        id: Option<BlogPostId>,
        author_id: UserId,
        input: &BlogPostInput,
    ) -> Result<BlogPost, RepositoryError> {
        let slug = slug_or_name(input.slug.as_deref(), &input.title);
        let sql = match id {
            None => format!(
                "INSERT INTO blog_posts (title, slug, excerpt, content, cover_image, category_id, \
                     tags, is_published, meta_title, meta_description, author_id, published_at) \
                 VALUES ($2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, \
                     CASE WHEN $9 THEN NOW() END) \
                 RETURNING {POST_COLUMNS}"
            ),
            Some(_) => format!(
                "UPDATE blog_posts SET title = $2, slug = $3, excerpt = $4, content = $5, \
                     cover_image = $6, category_id = $7, tags = $8, is_published = $9, \
                     meta_title = $10, meta_description = $11, \
                     published_at = CASE WHEN $9 THEN COALESCE(published_at, NOW()) END, \
                     updated_at = NOW() \
                 WHERE id = $1 RETURNING {POST_COLUMNS}"
            ),
        };
        let row = sqlx::query_as::<_, BlogPost>(&sql)
            .bind(id)
            .bind(&input.title)
            .bind(&slug)
            .bind(&input.excerpt)
            .bind(&input.content)
            .bind(&input.cover_image)
            .bind(input.category_id)
            .bind(sqlx::types::Json(&input.tags))
            .bind(input.is_published)
            .bind(&input.meta_title)
            .bind(&input.meta_description)
            .bind(author_id)
            .fetch_optional(self.pool)
            .await
            .map_err(conflict_on_unique("Yazı adresi"))?;
        found(row)
    }

    /// Delete a post and its comments.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the post does not exist.
    pub async fn delete_post(&self, id: BlogPostId) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM blog_comments WHERE post_id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        delete_by_id(self.pool, "blog_posts", id).await
    }

    /// Approved comments on a post, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_approved_comments(
        &self,
        post_id: BlogPostId,
    ) -> Result<Vec<BlogComment>, RepositoryError> {
        let rows = sqlx::query_as::<_, BlogComment>(&format!(
            "SELECT {COMMENT_COLUMNS} FROM blog_comments \
             WHERE post_id = $1 AND is_approved ORDER BY created_at"
        ))
        .bind(post_id)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// Comments for moderation.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_comments(&self, approved: Option<bool>) -> Result<Vec<BlogComment>, RepositoryError> {
        let rows = sqlx::query_as::<_, BlogComment>(&format!(
            "SELECT {COMMENT_COLUMNS} FROM blog_comments \
             WHERE ($1::BOOLEAN IS NULL OR is_approved = $1) ORDER BY created_at DESC"
        ))
        .bind(approved)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// Create a comment pending approval.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create_comment(
        &self,
        post_id: BlogPostId,
        user_id: Option<UserId>,
        author_name: &str,
        content: &str,
    ) -> Result<BlogComment, RepositoryError> {
        let row = sqlx::query_as::<_, BlogComment>(&format!(
            "INSERT INTO blog_comments (post_id, user_id, author_name, content) \
             VALUES ($1, $2, $3, $4) RETURNING {COMMENT_COLUMNS}"
        ))
        .bind(post_id)
        .bind(user_id)
        .bind(author_name)
        .bind(content)
        .fetch_one(self.pool)
        .await?;
        Ok(row)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the comment does not exist.
    pub async fn set_comment_approved(
        &self,
        id: BlogCommentId,
        approved: bool,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE blog_comments SET is_approved = $2 WHERE id = $1")
            .bind(id)
            .bind(approved)
            .execute(self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the comment does not exist.
    pub async fn delete_comment(&self, id: BlogCommentId) -> Result<(), RepositoryError> {
        delete_by_id(self.pool, "blog_comments", id).await
    }
}
