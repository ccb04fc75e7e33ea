//! Content repository: banners, pages, layouts, navigation, testimonials,
//! campaigns, site settings and payment methods.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use sqlx::PgPool;

use takviye_core::{
    BannerId, CampaignId, NavigationLinkId, PageId, PaymentMethodId, PaymentMethodKind,
    TestimonialId,
};

use super::catalog::{default_true, slug_or_name};
use super::{RepositoryError, conflict_on_unique, delete_by_id, fetch_by_id, found};
use crate::models::content::{
    Banner, Campaign, LayoutBlock, NavigationLink, Page, PageLayout, PaymentMethod, SiteSetting,
    Testimonial,
};

const BANNER_COLUMNS: &str =
    "id, title, subtitle, image_url, link_url, position, sort_order, is_active, created_at";
const PAGE_COLUMNS: &str = "id, title, slug, content, meta_title, meta_description, \
     is_published, created_at, updated_at";
const NAV_COLUMNS: &str = "id, label, url, location, parent_id, sort_order, is_active";
const TESTIMONIAL_COLUMNS: &str =
    "id, name, title, content, rating, image_url, sort_order, is_active, created_at";
const CAMPAIGN_COLUMNS: &str = "id, title, slug, description, image_url, link_url, starts_at, \
     ends_at, is_active, created_at";
const PAYMENT_METHOD_COLUMNS: &str =
    "id, kind, name, description, details, is_active, sort_order, created_at";

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BannerInput {
    pub title: String,
    pub subtitle: Option<String>,
    pub image_url: String,
    pub link_url: Option<String>,
    #[serde(default = "default_position")]
    pub position: String,
    #[serde(default)]
    pub sort_order: i32,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_position() -> String {
    "home".to_owned()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInput {
    pub title: String,
    pub slug: Option<String>,
    pub content: String,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    #[serde(default = "default_true")]
    pub is_published: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationLinkInput {
    pub label: String,
    pub url: String,
    #[serde(default = "default_location")]
    pub location: String,
    pub parent_id: Option<NavigationLinkId>,
    #[serde(default)]
    pub sort_order: i32,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_location() -> String {
    "header".to_owned()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestimonialInput {
    pub name: String,
    pub title: Option<String>,
    pub content: String,
    #[serde(default = "default_rating")]
    pub rating: i32,
    pub image_url: Option<String>,
    #[serde(default)]
    pub sort_order: i32,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

const fn default_rating() -> i32 {
    5
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignInput {
    pub title: String,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub link_url: Option<String>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethodInput {
    pub kind: PaymentMethodKind,
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub details: serde_json::Value,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub sort_order: i32,
}

/// Repository for storefront content.
pub struct ContentRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ContentRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    // -------------------------------------------------------------------------
    // Banners
    // -------------------------------------------------------------------------

    /// Banners, optionally only active ones at a position.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_banners(
        &self,
        active_only: bool,
        position: Option<&str>,
    ) -> Result<Vec<Banner>, RepositoryError> {
        let rows = sqlx::query_as::<_, Banner>(&format!(
            "SELECT {BANNER_COLUMNS} FROM banners \
             WHERE ($1 = FALSE OR is_active) AND ($2::TEXT IS NULL OR position = $2) \
             ORDER BY sort_order, id"
        ))
        .bind(active_only)
        .bind(position)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_banner(&self, id: BannerId) -> Result<Option<Banner>, RepositoryError> {
        fetch_by_id(self.pool, "banners", BANNER_COLUMNS, id).await
    }

    /// Insert or update a banner.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` when updating a missing row.
    pub async fn save_banner(
        &self,
        id: Option<BannerId>,
        input: &BannerInput,
    ) -> Result<Banner, RepositoryError> {
        let sql = match id {
            None => format!(
                "INSERT INTO banners (title, subtitle, image_url, link_url, position, sort_order, is_active) \
                 VALUES ($2, $3, $4, $5, $6, $7, $8) RETURNING {BANNER_COLUMNS}"
            ),
            Some(_) => format!(
                "UPDATE banners SET title = $2, subtitle = $3, image_url = $4, link_url = $5, \
                 position = $6, sort_order = $7, is_active = $8 \
                 WHERE id = $1 RETURNING {BANNER_COLUMNS}"
            ),
        };
        let row = sqlx::query_as::<_, Banner>(&sql)
            .bind(id)
            .bind(&input.title)
            .bind(&input.subtitle)
            .bind(&input.image_url)
            .bind(&input.link_url)
            .bind(&input.position)
            .bind(input.sort_order)
            .bind(input.is_active)
            .fetch_optional(self.pool)
            .await?;
        found(row)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the banner does not exist.
    pub async fn delete_banner(&self, id: BannerId) -> Result<(), RepositoryError> {
        delete_by_id(self.pool, "banners", id).await
    }

    // -------------------------------------------------------------------------
    // Pages
    // -------------------------------------------------------------------------

    /// All pages for the back-office.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_pages(&self) -> Result<Vec<Page>, RepositoryError> {
        let rows = sqlx::query_as::<_, Page>(&format!(
            "SELECT {PAGE_COLUMNS} FROM pages ORDER BY title"
        ))
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// Published pages, for the sitemap.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_published_pages(&self) -> Result<Vec<Page>, RepositoryError> {
        let rows = sqlx::query_as::<_, Page>(&format!(
            "SELECT {PAGE_COLUMNS} FROM pages WHERE is_published ORDER BY slug"
        ))
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// A published page by slug.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_published_page(&self, slug: &str) -> Result<Option<Page>, RepositoryError> {
        let row = sqlx::query_as::<_, Page>(&format!(
            "SELECT {PAGE_COLUMNS} FROM pages WHERE slug = $1 AND is_published"
        ))
        .bind(slug)
        .fetch_optional(self.pool)
        .await?;
        Ok(row)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_page(&self, id: PageId) -> Result<Option<Page>, RepositoryError> {
        let row = sqlx::query_as::<_, Page>(&format!(
            "SELECT {PAGE_COLUMNS} FROM pages WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(row)
    }

    /// Insert or update a page.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` on a duplicate slug and
    /// `RepositoryError::NotFound` when updating a missing row.
    pub async fn save_page(&self, id: Option<PageId>, input: &PageInput) -> Result<Page, RepositoryError> {
        let slug = slug_or_name(input.slug.as_deref(), &input.title);
        let sql = match id {
            None => format!(
                "INSERT INTO pages (title, slug, content, meta_title, meta_description, is_published) \
                 VALUES ($2, $3, $4, $5, $6, $7) RETURNING {PAGE_COLUMNS}"
            ),
            Some(_) => format!(
                "UPDATE pages SET title = $2, slug = $3, content = $4, meta_title = $5, \
                 meta_description = $6, is_published = $7, updated_at = NOW() \
                 WHERE id = $1 RETURNING {PAGE_COLUMNS}"
            ),
        };
        let row = sqlx::query_as::<_, Page>(&sql)
            .bind(id)
            .bind(&input.title)
            .bind(&slug)
            .bind(&input.content)
            .bind(&input.meta_title)
            .bind(&input.meta_description)
            .bind(input.is_published)
            .fetch_optional(self.pool)
            .await
            .map_err(conflict_on_unique("Sayfa adresi"))?;
        found(row)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the page does not exist.
    pub async fn delete_page(&self, id: PageId) -> Result<(), RepositoryError> {
        delete_by_id(self.pool, "pages", id).await
    }

    // -------------------------------------------------------------------------
    // Layouts
    // -------------------------------------------------------------------------

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_layouts(&self) -> Result<Vec<PageLayout>, RepositoryError> {
        let rows = sqlx::query_as::<_, PageLayout>(
            "SELECT id, page, blocks, updated_at FROM page_layouts ORDER BY page",
        )
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_layout(&self, page: &str) -> Result<Option<PageLayout>, RepositoryError> {
        let row = sqlx::query_as::<_, PageLayout>(
            "SELECT id, page, blocks, updated_at FROM page_layouts WHERE page = $1",
        )
        .bind(page)
        .fetch_optional(self.pool)
        .await?;
        Ok(row)
    }

    /// Replace the blocks of a page layout, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the write fails.
    pub async fn upsert_layout(
        &self,
        page: &str,
        blocks: &[LayoutBlock],
    ) -> Result<PageLayout, RepositoryError> {
        let row = sqlx::query_as::<_, PageLayout>(
            "INSERT INTO page_layouts (page, blocks) VALUES ($1, $2) \
             ON CONFLICT (page) DO UPDATE SET blocks = EXCLUDED.blocks, updated_at = NOW() \
             RETURNING id, page, blocks, updated_at",
        )
        .bind(page)
        .bind(sqlx::types::Json(blocks))
        .fetch_one(self.pool)
        .await?;
        Ok(row)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if there is no layout for the page.
    pub async fn delete_layout(&self, page: &str) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM page_layouts WHERE page = $1")
            .bind(page)
            .execute(self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Navigation
    // -------------------------------------------------------------------------

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_navigation(
        &self,
        active_only: bool,
        location: Option<&str>,
    ) -> Result<Vec<NavigationLink>, RepositoryError> {
        let rows = sqlx::query_as::<_, NavigationLink>(&format!(
            "SELECT {NAV_COLUMNS} FROM navigation_links \
             WHERE ($1 = FALSE OR is_active) AND ($2::TEXT IS NULL OR location = $2) \
             ORDER BY location, sort_order, id"
        ))
        .bind(active_only)
        .bind(location)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_navigation_link(&self, id: NavigationLinkId) -> Result<Option<NavigationLink>, RepositoryError> {
        fetch_by_id(self.pool, "navigation_links", NAV_COLUMNS, id).await
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` when updating a missing row.
    pub async fn save_navigation_link(
        &self,
        id: Option<NavigationLinkId>,
        input: &NavigationLinkInput,
    ) -> Result<NavigationLink, RepositoryError> {
        let sql = match id {
            None => format!(
                "INSERT INTO navigation_links (label, url, location, parent_id, sort_order, is_active) \
                 VALUES ($2, $3, $4, $5, $6, $7) RETURNING {NAV_COLUMNS}"
            ),
            Some(_) => format!(
                "UPDATE navigation_links SET label = $2, url = $3, location = $4, parent_id = $5, \
                 sort_order = $6, is_active = $7 WHERE id = $1 RETURNING {NAV_COLUMNS}"
            ),
        };
        let row = sqlx::query_as::<_, NavigationLink>(&sql)
            .bind(id)
            .bind(&input.label)
            .bind(&input.url)
            .bind(&input.location)
            .bind(input.parent_id)
            .bind(input.sort_order)
            .bind(input.is_active)
            .fetch_optional(self.pool)
            .await?;
        found(row)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the link does not exist.
    pub async fn delete_navigation_link(&self, id: NavigationLinkId) -> Result<(), RepositoryError> {
        delete_by_id(self.pool, "navigation_links", id).await
    }

    // -------------------------------------------------------------------------
    // Testimonials
    // -------------------------------------------------------------------------

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_testimonials(&self, active_only: bool) -> Result<Vec<Testimonial>, RepositoryError> {
        let rows = sqlx::query_as::<_, Testimonial>(&format!(
            "SELECT {TESTIMONIAL_COLUMNS} FROM testimonials \
             WHERE ($1 = FALSE OR is_active) ORDER BY sort_order, id"
        ))
        .bind(active_only)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_testimonial(&self, id: TestimonialId) -> Result<Option<Testimonial>, RepositoryError> {
        fetch_by_id(self.pool, "testimonials", TESTIMONIAL_COLUMNS, id).await
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` when updating a missing row.
    pub async fn save_testimonial(
        &self,
        id: Option<TestimonialId>,
        input: &TestimonialInput,
    ) -> Result<Testimonial, RepositoryError> {
        let sql = match id {
            None => format!(
                "INSERT INTO testimonials (name, title, content, rating, image_url, sort_order, is_active) \
                 VALUES ($2, $3, $4, $5, $6, $7, $8) RETURNING {TESTIMONIAL_COLUMNS}"
            ),
            Some(_) => format!(
                "UPDATE testimonials SET name = $2, title = $3, content = $4, rating = $5, \
                 image_url = $6, sort_order = $7, is_active = $8 \
                 WHERE id = $1 RETURNING {TESTIMONIAL_COLUMNS}"
            ),
        };
        let row = sqlx::query_as::<_, Testimonial>(&sql)
            .bind(id)
            .bind(&input.name)
            .bind(&input.title)
            .bind(&input.content)
            .bind(input.rating)
            .bind(&input.image_url)
            .bind(input.sort_order)
            .bind(input.is_active)
            .fetch_optional(self.pool)
            .await?;
        found(row)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the testimonial does not exist.
    pub async fn delete_testimonial(&self, id: TestimonialId) -> Result<(), RepositoryError> {
        delete_by_id(self.pool, "testimonials", id).await
    }

    // -------------------------------------------------------------------------
    // Campaigns
    // -------------------------------------------------------------------------

    /// Campaigns. `running_only` keeps active ones inside their date window.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_campaigns(&self, running_only: bool) -> Result<Vec<Campaign>, RepositoryError> {
        let rows = sqlx::query_as::<_, Campaign>(&format!(
            "SELECT {CAMPAIGN_COLUMNS} FROM campaigns \
             WHERE $1 = FALSE OR (is_active \
                 AND (starts_at IS NULL OR starts_at <= NOW()) \
                 AND (ends_at IS NULL OR ends_at >= NOW())) \
             ORDER BY COALESCE(starts_at, created_at) DESC"
        ))
        .bind(running_only)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_campaign(&self, id: CampaignId) -> Result<Option<Campaign>, RepositoryError> {
        fetch_by_id(self.pool, "campaigns", CAMPAIGN_COLUMNS, id).await
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` on a duplicate slug and
    /// `RepositoryError::NotFound` when updating a missing row.
    pub async fn save_campaign(
        &self,
        id: Option<CampaignId>,
        input: &CampaignInput,
    ) -> Result<Campaign, RepositoryError> {
        let slug = slug_or_name(input.slug.as_deref(), &input.title);
        let sql = match id {
            None => format!(
                "INSERT INTO campaigns (title, slug, description, image_url, link_url, starts_at, \
                     ends_at, is_active) \
                 VALUES ($2, $3, $4, $5, $6, $7, $8, $9) RETURNING {CAMPAIGN_COLUMNS}"
            ),
            Some(_) => format!(
                "UPDATE campaigns SET title = $2, slug = $3, description = $4, image_url = $5, \
                 link_url = $6, starts_at = $7, ends_at = $8, is_active = $9 \
                 WHERE id = $1 RETURNING {CAMPAIGN_COLUMNS}"
            ),
        };
        let row = sqlx::query_as::<_, Campaign>(&sql)
            .bind(id)
            .bind(&input.title)
            .bind(&slug)
            .bind(&input.description)
            .bind(&input.image_url)
            .bind(&input.link_url)
            .bind(input.starts_at)
            .bind(input.ends_at)
            .bind(input.is_active)
            .fetch_optional(self.pool)
            .await
            .map_err(conflict_on_unique("Kampanya adresi"))?;
        found(row)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the campaign does not exist.
    pub async fn delete_campaign(&self, id: CampaignId) -> Result<(), RepositoryError> {
        delete_by_id(self.pool, "campaigns", id).await
    }

    // -------------------------------------------------------------------------
    // Settings
    // -------------------------------------------------------------------------

    /// All settings, including private ones.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_settings(&self) -> Result<Vec<SiteSetting>, RepositoryError> {
        let rows = sqlx::query_as::<_, SiteSetting>(
            "SELECT key, value, updated_at FROM site_settings ORDER BY key",
        )
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// Get a setting value.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_setting(&self, key: &str) -> Result<Option<serde_json::Value>, RepositoryError> {
        let value = sqlx::query_scalar("SELECT value FROM site_settings WHERE key = $1")
            .bind(key)
            .fetch_optional(self.pool)
            .await?;
        Ok(value)
    }

    /// Set a setting value.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the write fails.
    pub async fn upsert_setting(
        &self,
        key: &str,
        value: &serde_json::Value,
    ) -> Result<SiteSetting, RepositoryError> {
        let row = sqlx::query_as::<_, SiteSetting>(
            "INSERT INTO site_settings (key, value) VALUES ($1, $2) \
             ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value, updated_at = NOW() \
             RETURNING key, value, updated_at",
        )
        .bind(key)
        .bind(value)
        .fetch_one(self.pool)
        .await?;
        Ok(row)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the key is not set.
    pub async fn delete_setting(&self, key: &str) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM site_settings WHERE key = $1")
            .bind(key)
            .execute(self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Payment methods
    // -------------------------------------------------------------------------

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_payment_methods(
        &self,
        active_only: bool,
    ) -> Result<Vec<PaymentMethod>, RepositoryError> {
        let rows = sqlx::query_as::<_, PaymentMethod>(&format!(
            "SELECT {PAYMENT_METHOD_COLUMNS} FROM payment_methods \
             WHERE ($1 = FALSE OR is_active) ORDER BY sort_order, id"
        ))
        .bind(active_only)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// First active payment method of a kind.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn active_payment_method(
        &self,
        kind: PaymentMethodKind,
    ) -> Result<Option<PaymentMethod>, RepositoryError> {
        let row = sqlx::query_as::<_, PaymentMethod>(&format!(
            "SELECT {PAYMENT_METHOD_COLUMNS} FROM payment_methods \
             WHERE kind = $1 AND is_active ORDER BY sort_order, id LIMIT 1"
        ))
        .bind(kind)
        .fetch_optional(self.pool)
        .await?;
        Ok(row)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_payment_method(&self, id: PaymentMethodId) -> Result<Option<PaymentMethod>, RepositoryError> {
        fetch_by_id(self.pool, "payment_methods", PAYMENT_METHOD_COLUMNS, id).await
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` when updating a missing row.
    pub async fn save_payment_method(
        &self,
        id: Option<PaymentMethodId>,
        input: &PaymentMethodInput,
    ) -> Result<PaymentMethod, RepositoryError> {
        let sql = match id {
            None => format!(
                "INSERT INTO payment_methods (kind, name, description, details, is_active, sort_order) \
                 VALUES ($2, $3, $4, $5, $6, $7) RETURNING {PAYMENT_METHOD_COLUMNS}"
            ),
            Some(_) => format!(
                "UPDATE payment_methods SET kind = $2, name = $3, description = $4, details = $5, \
                 is_active = $6, sort_order = $7 WHERE id = $1 RETURNING {PAYMENT_METHOD_COLUMNS}"
            ),
        };
        let details = if input.details.is_null() {
            serde_json::json!({})
        } else {
            input.details.clone()
        };
        let row = sqlx::query_as::<_, PaymentMethod>(&sql)
            .bind(id)
            .bind(input.kind)
            .bind(&input.name)
            .bind(&input.description)
            .bind(details)
            .bind(input.is_active)
            .bind(input.sort_order)
            .fetch_optional(self.pool)
            .await?;
        found(row)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the method does not exist.
    pub async fn delete_payment_method(&self, id: PaymentMethodId) -> Result<(), RepositoryError> {
        delete_by_id(self.pool, "payment_methods", id).await
    }
}
