//! Product bundles.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use takviye_core::wizard::WizardCandidate;
use takviye_core::{BundleId, Money, ProductId};

use super::catalog::Product;

/// One product slot in a bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleItem {
    pub product_id: ProductId,
    #[serde(default = "one")]
    pub quantity: i32,
}

const fn one() -> i32 {
    1
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Bundle {
    pub id: BundleId,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    #[sqlx(json)]
    pub items: Vec<BundleItem>,
    pub price: Money,
    pub compare_price: Option<Money>,
    #[sqlx(json)]
    pub tags: Vec<String>,
    pub is_active: bool,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
}

impl Bundle {
    #[must_use]
    pub fn product_ids(&self) -> Vec<ProductId> {
        self.items.iter().map(|i| i.product_id).collect()
    }
}

impl WizardCandidate for Bundle {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    fn tags(&self) -> &[String] {
        &self.tags
    }
}

/// Bundle with its products resolved.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleDetail {
    #[serde(flatten)]
    pub bundle: Bundle,
    pub products: Vec<BundleProduct>,
    pub savings: Money,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleProduct {
    pub quantity: i32,
    pub product: Product,
}

impl BundleDetail {
    /// Pair bundle items with their products. Items whose product is missing
    /// or inactive are left out; savings compare against the listed prices.
    #[must_use]
    pub fn resolve(bundle: Bundle, products: &[Product]) -> Self {
        let products: Vec<BundleProduct> = bundle
            .items
            .iter()
            .filter_map(|item| {
                products
                    .iter()
                    .find(|p| p.id == item.product_id && p.is_active)
                    .map(|product| BundleProduct {
                        quantity: item.quantity,
                        product: product.clone(),
                    })
            })
            .collect();

        let list_total: Money = products
            .iter()
            .map(|bp| bp.product.price * u32::try_from(bp.quantity).unwrap_or(0))
            .sum();

        Self {
            savings: list_total.saturating_sub(bundle.price),
            bundle,
            products,
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use chrono::Utc;

    use super::*;

    pub(crate) fn product(id: i32, price_kurus: i64) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Ürün {id}"),
            slug: format!("urun-{id}"),
            description: None,
            short_description: None,
            price: Money::from_kurus(price_kurus),
            compare_price: None,
            sku: None,
            barcode: None,
            stock: 10,
            category_id: None,
            brand_id: None,
            images: Vec::new(),
            tags: Vec::new(),
            usage_instructions: None,
            ingredients: None,
            is_featured: false,
            is_active: true,
            meta_title: None,
            meta_description: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn bundle(items: Vec<BundleItem>, price_kurus: i64) -> Bundle {
        Bundle {
            id: BundleId::new(1),
            name: "Kas Paketi".to_string(),
            slug: "kas-paketi".to_string(),
            description: None,
            image_url: None,
            items,
            price: Money::from_kurus(price_kurus),
            compare_price: None,
            tags: vec!["muscle_gain".to_string()],
            is_active: true,
            sort_order: 0,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_resolve_computes_savings() {
        let items = vec![
            BundleItem { product_id: ProductId::new(1), quantity: 2 },
            BundleItem { product_id: ProductId::new(2), quantity: 1 },
        ];
        let detail = BundleDetail::resolve(
            bundle(items, 100_000),
            &[product(1, 45_000), product(2, 30_000)],
        );
        assert_eq!(detail.products.len(), 2);
        assert_eq!(detail.savings, Money::from_kurus(20_000));
    }

    #[test]
    fn test_resolve_skips_missing_products() {
        let items = vec![
            BundleItem { product_id: ProductId::new(1), quantity: 1 },
            BundleItem { product_id: ProductId::new(9), quantity: 1 },
        ];
        let detail = BundleDetail::resolve(bundle(items, 50_000), &[product(1, 45_000)]);
        assert_eq!(detail.products.len(), 1);
        assert_eq!(detail.savings, Money::ZERO);
    }
}
