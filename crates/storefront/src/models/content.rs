//! Storefront content: banners, pages, layouts, navigation, testimonials,
//! campaigns, settings and payment methods.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use takviye_core::{
    BannerId, CampaignId, LayoutId, NavigationLinkId, PageId, PaymentMethodId, PaymentMethodKind,
    TestimonialId,
};

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Banner {
    pub id: BannerId,
    pub title: String,
    pub subtitle: Option<String>,
    pub image_url: String,
    pub link_url: Option<String>,
    pub position: String,
    pub sort_order: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub id: PageId,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One server-driven UI section of a page layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutBlock {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
    #[serde(default)]
    pub config: serde_json::Value,
}

const fn enabled_by_default() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PageLayout {
    pub id: LayoutId,
    pub page: String,
    #[sqlx(json)]
    pub blocks: Vec<LayoutBlock>,
    pub updated_at: DateTime<Utc>,
}

impl PageLayout {
    /// Drop disabled blocks, keeping order.
    #[must_use]
    pub fn enabled_only(mut self) -> Self {
        self.blocks.retain(|b| b.enabled);
        self
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct NavigationLink {
    pub id: NavigationLinkId,
    pub label: String,
    pub url: String,
    pub location: String,
    pub parent_id: Option<NavigationLinkId>,
    pub sort_order: i32,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Testimonial {
    pub id: TestimonialId,
    pub name: String,
    pub title: Option<String>,
    pub content: String,
    pub rating: i32,
    pub image_url: Option<String>,
    pub sort_order: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Campaign {
    pub id: CampaignId,
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub link_url: Option<String>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// A `site_settings` row. Keys prefixed `private.` never leave the back-office.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SiteSetting {
    pub key: String,
    pub value: serde_json::Value,
    pub updated_at: DateTime<Utc>,
}

/// Prefix of settings hidden from the public API.
pub const PRIVATE_SETTING_PREFIX: &str = "private.";

impl SiteSetting {
    #[must_use]
    pub fn is_public(&self) -> bool {
        !self.key.starts_with(PRIVATE_SETTING_PREFIX)
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethod {
    pub id: PaymentMethodId,
    pub kind: PaymentMethodKind,
    pub name: String,
    pub description: Option<String>,
    /// Bank account details for transfers (`bankName`, `accountHolder`, `iban`).
    pub details: serde_json::Value,
    pub is_active: bool,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_block_defaults() {
        let block: LayoutBlock =
            serde_json::from_str(r#"{"type":"hero_slider"}"#).unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(block.kind, "hero_slider");
        assert!(block.enabled);
        assert!(block.config.is_null());
    }

    #[test]
    fn test_enabled_only_keeps_order() {
        let layout = PageLayout {
            id: LayoutId::new(1),
            page: "home".to_string(),
            blocks: vec![
                LayoutBlock {
                    kind: "hero_slider".to_string(),
                    enabled: true,
                    config: serde_json::Value::Null,
                },
                LayoutBlock {
                    kind: "brand_strip".to_string(),
                    enabled: false,
                    config: serde_json::Value::Null,
                },
                LayoutBlock {
                    kind: "featured_products".to_string(),
                    enabled: true,
                    config: serde_json::json!({"limit": 8}),
                },
            ],
            updated_at: Utc::now(),
        };
        let kinds: Vec<String> = layout
            .enabled_only()
            .blocks
            .into_iter()
            .map(|b| b.kind)
            .collect();
        assert_eq!(kinds, vec!["hero_slider", "featured_products"]);
    }
}
