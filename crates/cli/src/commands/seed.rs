//! Seed the store from a YAML file.
//!
//! The file is parsed and validated before connecting. Rows are matched by
//! slug (or code, key, kind) and existing ones are skipped, so the command
//! can be re-run against a live database. Products name their category,
//! brand and bundle slots by slug.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::path::Path;

use serde::Deserialize;
use sqlx::PgPool;
use tracing::{error, info};

use takviye_core::Money;
use takviye_core::coupon::normalize_code;
use takviye_core::slug::slugify;
use takviye_storefront::db::blog::{BlogCategoryInput, BlogRepository};
use takviye_storefront::db::bundles::{BundleInput, BundleRepository};
use takviye_storefront::db::catalog::{
    BrandInput, CatalogRepository, CategoryInput, ProductInput, VariantInput,
};
use takviye_storefront::db::content::{
    BannerInput, ContentRepository, NavigationLinkInput, PageInput, PaymentMethodInput,
    TestimonialInput,
};
use takviye_storefront::db::coupons::{CouponInput, CouponRepository};
use takviye_storefront::models::bundle::BundleItem;
use takviye_storefront::models::content::LayoutBlock;

/// Top-level seed document. Every section is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SeedFile {
    #[serde(default)]
    pub categories: Vec<CategoryInput>,
    #[serde(default)]
    pub brands: Vec<BrandInput>,
    #[serde(default)]
    pub products: Vec<SeedProduct>,
    #[serde(default)]
    pub bundles: Vec<SeedBundle>,
    #[serde(default)]
    pub coupons: Vec<CouponInput>,
    #[serde(default)]
    pub payment_methods: Vec<PaymentMethodInput>,
    #[serde(default)]
    pub pages: Vec<PageInput>,
    #[serde(default)]
    pub banners: Vec<BannerInput>,
    #[serde(default)]
    pub navigation: Vec<NavigationLinkInput>,
    #[serde(default)]
    pub testimonials: Vec<TestimonialInput>,
    #[serde(default)]
    pub blog_categories: Vec<BlogCategoryInput>,
    /// Page key to layout blocks.
    #[serde(default)]
    pub layouts: BTreeMap<String, Vec<LayoutBlock>>,
    #[serde(default)]
    pub settings: BTreeMap<String, serde_json::Value>,
}

/// A product with its category and brand given by slug.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedProduct {
    pub category: Option<String>,
    pub brand: Option<String>,
    #[serde(default)]
    pub variants: Vec<VariantInput>,
    #[serde(flatten)]
    pub product: ProductInput,
}

/// A bundle whose slots name products by slug.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedBundle {
    pub products: Vec<SeedBundleSlot>,
    #[serde(flatten)]
    pub bundle: BundleInput,
}

#[derive(Debug, Deserialize)]
pub struct SeedBundleSlot {
    pub slug: String,
    #[serde(default = "one")]
    pub quantity: i32,
}

const fn one() -> i32 {
    1
}

/// Counts reported after a run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub inserted: usize,
    pub skipped: usize,
}

impl fmt::Display for SeedSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} inserted, {} skipped", self.inserted, self.skipped)
    }
}

fn slug_of(slug: Option<&str>, name: &str) -> String {
    match slug.map(str::trim) {
        Some(s) if !s.is_empty() => slugify(s),
        _ => slugify(name),
    }
}

/// Problems that would make the seed fail or produce bad rows.
#[must_use]
pub fn validate(seed: &SeedFile) -> Vec<String> {
    let mut errors = Vec::new();

    let mut product_slugs = HashSet::new();
    for p in &seed.products {
        let slug = slug_of(p.product.slug.as_deref(), &p.product.name);
        if p.product.name.trim().is_empty() {
            errors.push("product with an empty name".to_string());
        }
        if p.product.price <= Money::ZERO {
            errors.push(format!("product {slug}: price must be positive"));
        }
        if p.product.stock < 0 {
            errors.push(format!("product {slug}: stock cannot be negative"));
        }
        if !product_slugs.insert(slug.clone()) {
            errors.push(format!("duplicate product slug: {slug}"));
        }
    }

    let mut category_slugs = HashSet::new();
    for c in &seed.categories {
        let slug = slug_of(c.slug.as_deref(), &c.name);
        if !category_slugs.insert(slug.clone()) {
            errors.push(format!("duplicate category slug: {slug}"));
        }
    }

    for b in &seed.bundles {
        let slug = slug_of(b.bundle.slug.as_deref(), &b.bundle.name);
        if b.products.is_empty() {
            errors.push(format!("bundle {slug}: no products"));
        }
        if b.products.iter().any(|slot| slot.quantity < 1) {
            errors.push(format!("bundle {slug}: quantities must be at least 1"));
        }
    }

    let mut codes = HashSet::new();
    for c in &seed.coupons {
        if let Err(e) = c.validate() {
            errors.push(format!("coupon {}: {e}", c.code));
        }
        if !codes.insert(normalize_code(&c.code)) {
            errors.push(format!("duplicate coupon code: {}", c.code));
        }
    }

    for t in &seed.testimonials {
        if !(1..=5).contains(&t.rating) {
            errors.push(format!("testimonial {}: rating must be 1-5", t.name));
        }
    }

    errors
}

/// Load, validate and apply a seed file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, validation fails,
/// or a database write fails.
pub async fn run(file_path: &Path) -> Result<SeedSummary, Box<dyn std::error::Error>> {
    if !file_path.exists() {
        return Err(format!("File not found: {}", file_path.display()).into());
    }

    info!(path = %file_path.display(), "Loading seed file");
    let content = tokio::fs::read_to_string(file_path).await?;
    let seed: SeedFile = serde_yaml::from_str(&content)?;

    let errors = validate(&seed);
    if !errors.is_empty() {
        error!("Seed validation failed:");
        for err in &errors {
            error!("  - {err}");
        }
        return Err(format!("{} validation errors found", errors.len()).into());
    }

    let pool = super::connect().await?;
    apply(&pool, seed).await
}

async fn apply(pool: &PgPool, seed: SeedFile) -> Result<SeedSummary, Box<dyn std::error::Error>> {
    let mut summary = SeedSummary::default();
    let catalog = CatalogRepository::new(pool);
    let content = ContentRepository::new(pool);

    for input in &seed.categories {
        let slug = slug_of(input.slug.as_deref(), &input.name);
        if catalog.get_category_by_slug(&slug).await?.is_some() {
            summary.skipped += 1;
            continue;
        }
        catalog.save_category(None, input).await?;
        summary.inserted += 1;
    }

    let mut brands = catalog.list_brands(false).await?;
    for input in &seed.brands {
        let slug = slug_of(input.slug.as_deref(), &input.name);
        if brands.iter().any(|b| b.slug == slug) {
            summary.skipped += 1;
            continue;
        }
        brands.push(catalog.save_brand(None, input).await?);
        summary.inserted += 1;
    }

    for SeedProduct {
        category,
        brand,
        variants,
        mut product,
    } in seed.products
    {
        let slug = slug_of(product.slug.as_deref(), &product.name);
        if catalog.get_product_by_slug(&slug, true).await?.is_some() {
            summary.skipped += 1;
            continue;
        }
        if let Some(category) = category {
            product.category_id = Some(
                catalog
                    .get_category_by_slug(&category)
                    .await?
                    .ok_or_else(|| format!("product {slug}: unknown category {category}"))?
                    .id,
            );
        }
        if let Some(brand) = brand {
            product.brand_id = Some(
                brands
                    .iter()
                    .find(|b| b.slug == brand)
                    .ok_or_else(|| format!("product {slug}: unknown brand {brand}"))?
                    .id,
            );
        }
        let saved = catalog.save_product(None, &product).await?;
        for variant in &variants {
            catalog.save_variant(saved.id, None, variant).await?;
        }
        summary.inserted += 1;
    }

    let bundles = BundleRepository::new(pool);
    for SeedBundle {
        products,
        mut bundle,
    } in seed.bundles
    {
        let slug = slug_of(bundle.slug.as_deref(), &bundle.name);
        if bundles.get_by_slug(&slug).await?.is_some() {
            summary.skipped += 1;
            continue;
        }
        let mut items = Vec::with_capacity(products.len());
        for slot in products {
            let product = catalog
                .get_product_by_slug(&slot.slug, true)
                .await?
                .ok_or_else(|| format!("bundle {slug}: unknown product {}", slot.slug))?;
            items.push(BundleItem {
                product_id: product.id,
                quantity: slot.quantity,
            });
        }
        bundle.items = items;
        bundles.save(None, &bundle).await?;
        summary.inserted += 1;
    }

    let coupons = CouponRepository::new(pool);
    for input in &seed.coupons {
        if coupons.get_by_code(&input.code).await?.is_some() {
            summary.skipped += 1;
            continue;
        }
        coupons.save(None, input).await?;
        summary.inserted += 1;
    }

    let methods = content.list_payment_methods(false).await?;
    for input in &seed.payment_methods {
        if methods.iter().any(|m| m.kind == input.kind) {
            summary.skipped += 1;
            continue;
        }
        content.save_payment_method(None, input).await?;
        summary.inserted += 1;
    }

    let pages = content.list_pages().await?;
    for input in &seed.pages {
        let slug = slug_of(input.slug.as_deref(), &input.title);
        if pages.iter().any(|p| p.slug == slug) {
            summary.skipped += 1;
            continue;
        }
        content.save_page(None, input).await?;
        summary.inserted += 1;
    }

    let banners = content.list_banners(false, None).await?;
    for input in &seed.banners {
        if banners
            .iter()
            .any(|b| b.title == input.title && b.position == input.position)
        {
            summary.skipped += 1;
            continue;
        }
        content.save_banner(None, input).await?;
        summary.inserted += 1;
    }

    let links = content.list_navigation(false, None).await?;
    for input in &seed.navigation {
        if links
            .iter()
            .any(|l| l.url == input.url && l.location == input.location)
        {
            summary.skipped += 1;
            continue;
        }
        content.save_navigation_link(None, input).await?;
        summary.inserted += 1;
    }

    let testimonials = content.list_testimonials(false).await?;
    for input in &seed.testimonials {
        if testimonials
            .iter()
            .any(|t| t.name == input.name && t.content == input.content)
        {
            summary.skipped += 1;
            continue;
        }
        content.save_testimonial(None, input).await?;
        summary.inserted += 1;
    }

    let blog = BlogRepository::new(pool);
    let blog_categories = blog.list_categories().await?;
    for input in &seed.blog_categories {
        let slug = slug_of(input.slug.as_deref(), &input.name);
        if blog_categories.iter().any(|c| c.slug == slug) {
            summary.skipped += 1;
            continue;
        }
        blog.save_category(None, input).await?;
        summary.inserted += 1;
    }

    for (page, blocks) in &seed.layouts {
        if content.get_layout(page).await?.is_some() {
            summary.skipped += 1;
            continue;
        }
        content.upsert_layout(page, blocks).await?;
        summary.inserted += 1;
    }

    for (key, value) in &seed.settings {
        if content.get_setting(key).await?.is_some() {
            summary.skipped += 1;
            continue;
        }
        content.upsert_setting(key, value).await?;
        summary.inserted += 1;
    }

    Ok(summary)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const DEMO: &str = include_str!("../../seed/demo.yaml");

    #[test]
    fn test_demo_seed_parses_and_validates() {
        let seed: SeedFile = serde_yaml::from_str(DEMO).unwrap();
        assert!(!seed.products.is_empty());
        assert!(!seed.bundles.is_empty());
        assert!(seed.settings.contains_key("company"));
        assert_eq!(validate(&seed), Vec::<String>::new());
    }

    #[test]
    fn test_product_category_and_brand_by_slug() {
        let seed: SeedFile = serde_yaml::from_str(
            r#"
products:
  - name: Magnezyum Bisglisinat
    price: "349.90"
    stock: 40
    category: mineraller
    brand: ornek-marka
"#,
        )
        .unwrap();
        let product = &seed.products[0];
        assert_eq!(product.category.as_deref(), Some("mineraller"));
        assert_eq!(product.brand.as_deref(), Some("ornek-marka"));
        assert_eq!(product.product.price, Money::from_kurus(34_990));
    }

    #[test]
    fn test_validation_catches_duplicates_and_bad_values() {
        let seed: SeedFile = serde_yaml::from_str(
            r#"
products:
  - name: Omega 3
    price: "0"
  - name: Omega 3
    price: "199.90"
bundles:
  - name: Boş Paket
    price: "100"
    products: []
"#,
        )
        .unwrap();
        let errors = validate(&seed);
        assert!(errors.iter().any(|e| e.contains("price must be positive")));
        assert!(errors.iter().any(|e| e.contains("duplicate product slug: omega-3")));
        assert!(errors.iter().any(|e| e.contains("no products")));
    }

    #[test]
    fn test_unknown_sections_are_rejected() {
        assert!(serde_yaml::from_str::<SeedFile>("warehouses: []").is_err());
    }

    #[test]
    fn test_summary_display() {
        let summary = SeedSummary {
            inserted: 12,
            skipped: 3,
        };
        assert_eq!(summary.to_string(), "12 inserted, 3 skipped");
    }
}
