//! Marketplace product feeds, the sitemap and robots.txt.
//!
//! Feeds are rendered from askama XML templates (text is escaped) and kept in
//! a 5-minute `moka` cache. Product mutations clear the cache.

use std::sync::Arc;
use std::time::Duration;

use askama::Template;
use moka::future::Cache;
use serde::Serialize;
use sqlx::PgPool;
use thiserror::Error;

use crate::config::StorefrontConfig;
use crate::db::RepositoryError;
use crate::db::blog::BlogRepository;
use crate::db::catalog::CatalogRepository;
use crate::db::content::ContentRepository;
use crate::models::catalog::ProductListing;

const CACHE_TTL: Duration = Duration::from_secs(300);

/// Site paths always listed in the sitemap: `(path, changefreq, priority)`.
const STATIC_PATHS: &[(&str, &str, &str)] = &[
    ("/", "daily", "1.0"),
    ("/urunler", "daily", "0.9"),
    ("/paketler", "weekly", "0.8"),
    ("/takviye-sihirbazi", "monthly", "0.7"),
    ("/blog", "daily", "0.7"),
    ("/kampanyalar", "weekly", "0.6"),
    ("/iletisim", "monthly", "0.4"),
];

/// Paths crawlers must not index.
const DISALLOWED_PATHS: &[&str] = &["/api/", "/admin", "/cart", "/checkout"];

#[derive(Debug, Error)]
pub enum FeedError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error("template rendering failed: {0}")]
    Template(#[from] askama::Error),
}

/// Supported marketplace dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Marketplace {
    Trendyol,
    Hepsiburada,
    N11,
}

impl Marketplace {
    pub const ALL: [Self; 3] = [Self::Trendyol, Self::Hepsiburada, Self::N11];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Trendyol => "trendyol",
            Self::Hepsiburada => "hepsiburada",
            Self::N11 => "n11",
        }
    }

    /// Match a `/feeds/{file}` segment such as `trendyol.xml`.
    #[must_use]
    pub fn from_file_name(file: &str) -> Option<Self> {
        let name = file.strip_suffix(".xml")?;
        Self::ALL.into_iter().find(|m| m.as_str() == name)
    }
}

/// A product flattened into the fields every dialect needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedItem {
    pub id: i32,
    pub stock_code: String,
    pub barcode: String,
    pub title: String,
    pub description: String,
    pub brand: String,
    pub category: String,
    pub sale_price: String,
    pub list_price: String,
    pub stock: i32,
    pub images: Vec<String>,
    pub url: String,
}

impl FeedItem {
    #[must_use]
    pub fn from_listing(config: &StorefrontConfig, listing: &ProductListing) -> Self {
        let product = &listing.product;
        let prices = product.price_pair();
        let stock_code = product
            .sku
            .clone()
            .unwrap_or_else(|| format!("TK-{}", product.id));

        Self {
            id: product.id.as_i32(),
            barcode: product.barcode.clone().unwrap_or_else(|| stock_code.clone()),
            stock_code,
            title: product.name.clone(),
            description: product
                .description
                .clone()
                .or_else(|| product.short_description.clone())
                .unwrap_or_default(),
            brand: listing.brand_name.clone().unwrap_or_default(),
            category: listing.category_name.clone().unwrap_or_default(),
            sale_price: prices.price.to_string(),
            list_price: prices.compare_at.unwrap_or(prices.price).to_string(),
            stock: product.stock.max(0),
            images: product.images.clone(),
            url: config.absolute_url(&format!("/urun/{}", product.slug)),
        }
    }
}

#[derive(Template)]
#[template(path = "feeds/trendyol.xml")]
struct TrendyolFeed<'a> {
    items: &'a [FeedItem],
    vat_rate: u32,
}

#[derive(Template)]
#[template(path = "feeds/hepsiburada.xml")]
struct HepsiburadaFeed<'a> {
    items: &'a [FeedItem],
}

#[derive(Template)]
#[template(path = "feeds/n11.xml")]
struct N11Feed<'a> {
    items: &'a [FeedItem],
}

/// Render one marketplace dialect.
///
/// # Errors
///
/// Returns an error if the template fails to render.
pub fn render_feed(marketplace: Marketplace, items: &[FeedItem]) -> Result<String, askama::Error> {
    match marketplace {
        Marketplace::Trendyol => TrendyolFeed {
            items,
            vat_rate: takviye_core::pricing::VAT_RATE_PERCENT,
        }
        .render(),
        Marketplace::Hepsiburada => HepsiburadaFeed { items }.render(),
        Marketplace::N11 => N11Feed { items }.render(),
    }
}

/// Feed generation summary shown in the back office.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedPreview {
    pub marketplace: Marketplace,
    pub url: String,
    pub product_count: usize,
    pub in_stock: usize,
    pub missing_barcode: usize,
    pub missing_images: usize,
}

#[must_use]
pub fn preview(config: &StorefrontConfig, listings: &[ProductListing]) -> Vec<FeedPreview> {
    let in_stock = listings.iter().filter(|l| l.product.stock > 0).count();
    let missing_barcode = listings.iter().filter(|l| l.product.barcode.is_none()).count();
    let missing_images = listings.iter().filter(|l| l.product.images.is_empty()).count();

    Marketplace::ALL
        .into_iter()
        .map(|marketplace| FeedPreview {
            marketplace,
            url: config.absolute_url(&format!("/feeds/{}.xml", marketplace.as_str())),
            product_count: listings.len(),
            in_stock,
            missing_barcode,
            missing_images,
        })
        .collect()
}

pub struct SitemapEntry {
    pub loc: String,
    pub lastmod: Option<String>,
    pub changefreq: &'static str,
    pub priority: &'static str,
}

#[derive(Template)]
#[template(path = "sitemap.xml")]
struct SitemapTemplate<'a> {
    entries: &'a [SitemapEntry],
}

/// Render a sitemap.
///
/// # Errors
///
/// Returns an error if the template fails to render.
pub fn render_sitemap(entries: &[SitemapEntry]) -> Result<String, askama::Error> {
    SitemapTemplate { entries }.render()
}

#[must_use]
pub fn robots_txt(config: &StorefrontConfig) -> String {
    let mut body = String::from("User-agent: *\nAllow: /\n");
    for path in DISALLOWED_PATHS {
        body.push_str("Disallow: ");
        body.push_str(path);
        body.push('\n');
    }
    body.push_str("\nSitemap: ");
    body.push_str(&config.absolute_url("/sitemap.xml"));
    body.push('\n');
    body
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum CacheKey {
    Feed(Marketplace),
    Sitemap,
}

/// Rendered feed bodies shared across requests.
#[derive(Clone)]
pub struct FeedCache {
    cache: Cache<CacheKey, Arc<String>>,
}

impl FeedCache {
    #[must_use]
    pub fn new() -> Self {
        Self {
            cache: Cache::builder()
                .max_capacity(16)
                .time_to_live(CACHE_TTL)
                .build(),
        }
    }

    /// Drop every cached body. Called after product mutations.
    pub async fn invalidate_all(&self) {
        self.cache.invalidate_all();
        self.cache.run_pending_tasks().await;
    }
}

impl Default for FeedCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Builds feeds from the database through the cache.
pub struct FeedService<'a> {
    pool: &'a PgPool,
    config: &'a StorefrontConfig,
    cache: &'a FeedCache,
}

impl<'a> FeedService<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool, config: &'a StorefrontConfig, cache: &'a FeedCache) -> Self {
        Self {
            pool,
            config,
            cache,
        }
    }

    /// Marketplace XML for all active products.
    ///
    /// # Errors
    ///
    /// Returns an error if the products cannot be loaded or rendered.
    pub async fn marketplace(&self, marketplace: Marketplace) -> Result<Arc<String>, FeedError> {
        let key = CacheKey::Feed(marketplace);
        if let Some(body) = self.cache.cache.get(&key).await {
            return Ok(body);
        }

        let listings = CatalogRepository::new(self.pool).list_active_products().await?;
        let items: Vec<FeedItem> = listings
            .iter()
            .map(|l| FeedItem::from_listing(self.config, l))
            .collect();
        let body = Arc::new(render_feed(marketplace, &items)?);

        tracing::info!(
            marketplace = marketplace.as_str(),
            products = items.len(),
            "Generated marketplace feed"
        );
        self.cache.cache.insert(key, Arc::clone(&body)).await;
        Ok(body)
    }

    /// Sitemap with static paths, categories, products, pages and posts.
    ///
    /// # Errors
    ///
    /// Returns an error if any listing query or the render fails.
    pub async fn sitemap(&self) -> Result<Arc<String>, FeedError> {
        if let Some(body) = self.cache.cache.get(&CacheKey::Sitemap).await {
            return Ok(body);
        }

        let catalog = CatalogRepository::new(self.pool);
        let categories = catalog.list_categories(true).await?;
        let products = catalog.list_active_products().await?;
        let pages = ContentRepository::new(self.pool).list_published_pages().await?;
        let posts = BlogRepository::new(self.pool).list_published().await?;

        let lastmod = |at: chrono::DateTime<chrono::Utc>| Some(at.format("%Y-%m-%d").to_string());
        let mut entries: Vec<SitemapEntry> = STATIC_PATHS
            .iter()
            .map(|&(path, changefreq, priority)| SitemapEntry {
                loc: self.config.absolute_url(path),
                lastmod: None,
                changefreq,
                priority,
            })
            .collect();
        entries.extend(categories.iter().map(|c| SitemapEntry {
            loc: self.config.absolute_url(&format!("/kategori/{}", c.slug)),
            lastmod: None,
            changefreq: "weekly",
            priority: "0.8",
        }));
        entries.extend(products.iter().map(|l| SitemapEntry {
            loc: self.config.absolute_url(&format!("/urun/{}", l.product.slug)),
            lastmod: lastmod(l.product.updated_at),
            changefreq: "weekly",
            priority: "0.8",
        }));
        entries.extend(pages.iter().map(|p| SitemapEntry {
            loc: self.config.absolute_url(&format!("/sayfa/{}", p.slug)),
            lastmod: lastmod(p.updated_at),
            changefreq: "monthly",
            priority: "0.5",
        }));
        entries.extend(posts.iter().map(|p| SitemapEntry {
            loc: self.config.absolute_url(&format!("/blog/{}", p.slug)),
            lastmod: lastmod(p.updated_at),
            changefreq: "monthly",
            priority: "0.6",
        }));

        let body = Arc::new(render_sitemap(&entries)?);
        self.cache.cache.insert(CacheKey::Sitemap, Arc::clone(&body)).await;
        Ok(body)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::tests::test_config;

    fn item() -> FeedItem {
        FeedItem {
            id: 12,
            stock_code: "OMG-90".to_string(),
            barcode: "8690000000012".to_string(),
            title: "Omega-3 & Balık Yağı <90 Kapsül>".to_string(),
            description: "EPA/DHA \"yüksek\" içerik".to_string(),
            brand: "Takviye".to_string(),
            category: "Vitamin & Mineral".to_string(),
            sale_price: "349.90".to_string(),
            list_price: "399.90".to_string(),
            stock: 25,
            images: vec![
                "https://cdn.example.com/omega-1.jpg".to_string(),
                "https://cdn.example.com/omega-2.jpg".to_string(),
            ],
            url: "https://takviye.com.tr/urun/omega-3".to_string(),
        }
    }

    #[test]
    fn test_marketplace_from_file_name() {
        assert_eq!(Marketplace::from_file_name("trendyol.xml"), Some(Marketplace::Trendyol));
        assert_eq!(Marketplace::from_file_name("n11.xml"), Some(Marketplace::N11));
        assert_eq!(Marketplace::from_file_name("n11"), None);
        assert_eq!(Marketplace::from_file_name("amazon.xml"), None);
    }

    #[test]
    fn test_feeds_escape_text() {
        for marketplace in Marketplace::ALL {
            let xml = render_feed(marketplace, &[item()]).unwrap();
            assert!(xml.starts_with("<?xml"), "{marketplace:?}");
            assert!(xml.contains("Omega-3 &amp; Balık Yağı &lt;90 Kapsül&gt;"), "{marketplace:?}");
            assert!(!xml.contains("<90 Kapsül>"), "{marketplace:?}");
            assert!(xml.contains("349.90"), "{marketplace:?}");
            assert!(xml.contains("https://cdn.example.com/omega-2.jpg"), "{marketplace:?}");
        }
    }

    #[test]
    fn test_dialect_specific_fields() {
        let trendyol = render_feed(Marketplace::Trendyol, &[item()]).unwrap();
        assert!(trendyol.contains("<barcode>8690000000012</barcode>"));
        assert!(trendyol.contains("<vatRate>20</vatRate>"));

        let hepsiburada = render_feed(Marketplace::Hepsiburada, &[item()]).unwrap();
        assert!(hepsiburada.contains("<MerchantSku>OMG-90</MerchantSku>"));
        assert!(hepsiburada.contains("<Image2>https://cdn.example.com/omega-2.jpg</Image2>"));

        let n11 = render_feed(Marketplace::N11, &[item()]).unwrap();
        assert!(n11.contains("<productSellerCode>OMG-90</productSellerCode>"));
        assert!(n11.contains("<currencyType>TL</currencyType>"));
    }

    #[test]
    fn test_empty_feed_is_well_formed() {
        let xml = render_feed(Marketplace::Trendyol, &[]).unwrap();
        assert!(xml.contains("<products>"));
        assert!(xml.contains("</products>"));
    }

    #[test]
    fn test_sitemap() {
        let entries = [SitemapEntry {
            loc: "https://takviye.com.tr/urun/a?x=1&y=2".to_string(),
            lastmod: Some("2025-01-02".to_string()),
            changefreq: "weekly",
            priority: "0.8",
        }];
        let xml = render_sitemap(&entries).unwrap();
        assert!(xml.contains("http://www.sitemaps.org/schemas/sitemap/0.9"));
        assert!(xml.contains("<loc>https://takviye.com.tr/urun/a?x=1&amp;y=2</loc>"));
        assert!(xml.contains("<lastmod>2025-01-02</lastmod>"));
    }

    #[test]
    fn test_robots() {
        let robots = robots_txt(&test_config());
        for path in ["/api/", "/admin", "/cart", "/checkout"] {
            assert!(robots.contains(&format!("Disallow: {path}\n")), "{path}");
        }
        assert!(robots.contains("Sitemap: https://takviye.com.tr/sitemap.xml"));
    }
}
