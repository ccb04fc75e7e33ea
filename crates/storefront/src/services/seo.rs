//! Structured data (JSON-LD) for products and blog posts.

use serde_json::{Value, json};

use takviye_core::types::money::CURRENCY_CODE;

use crate::config::StorefrontConfig;
use crate::models::blog::BlogPost;
use crate::models::catalog::{Brand, Product, Review, average_rating};

/// `schema.org/Product` with an offer and, when reviewed, an aggregate rating.
#[must_use]
pub fn product_json_ld(
    config: &StorefrontConfig,
    product: &Product,
    brand: Option<&Brand>,
    reviews: &[Review],
) -> Value {
    let url = config.absolute_url(&format!("/urun/{}", product.slug));
    let availability = if product.stock > 0 {
        "https://schema.org/InStock"
    } else {
        "https://schema.org/OutOfStock"
    };

    let mut ld = json!({
        "@context": "https://schema.org",
        "@type": "Product",
        "name": product.name,
        "url": url,
        "image": product.images,
        "description": product
            .meta_description
            .as_deref()
            .or(product.short_description.as_deref())
            .or(product.description.as_deref())
            .unwrap_or_default(),
        "offers": {
            "@type": "Offer",
            "url": url,
            "priceCurrency": CURRENCY_CODE,
            "price": product.price.amount().to_string(),
            "availability": availability,
            "itemCondition": "https://schema.org/NewCondition",
        },
    });

    if let Some(sku) = &product.sku {
        ld["sku"] = json!(sku);
    }
    if let Some(gtin) = &product.barcode {
        ld["gtin13"] = json!(gtin);
    }
    if let Some(brand) = brand {
        ld["brand"] = json!({ "@type": "Brand", "name": brand.name });
    }
    if let Some(rating) = average_rating(reviews) {
        ld["aggregateRating"] = json!({
            "@type": "AggregateRating",
            "ratingValue": rating,
            "reviewCount": reviews.len(),
            "bestRating": 5,
            "worstRating": 1,
        });
    }

    ld
}

/// `schema.org/BlogPosting` for a published post.
#[must_use]
pub fn blog_post_json_ld(
    config: &StorefrontConfig,
    post: &BlogPost,
    author: Option<&str>,
) -> Value {
    let url = config.absolute_url(&format!("/blog/{}", post.slug));
    let mut ld = json!({
        "@context": "https://schema.org",
        "@type": "BlogPosting",
        "headline": post.meta_title.as_deref().unwrap_or(&post.title),
        "url": url,
        "mainEntityOfPage": url,
        "datePublished": post.published_at.unwrap_or(post.created_at).to_rfc3339(),
        "dateModified": post.updated_at.to_rfc3339(),
        "keywords": post.tags.join(", "),
    });

    if let Some(description) = post.meta_description.as_deref().or(post.excerpt.as_deref()) {
        ld["description"] = json!(description);
    }
    if let Some(image) = &post.cover_image {
        ld["image"] = json!(image);
    }
    if let Some(author) = author {
        ld["author"] = json!({ "@type": "Person", "name": author });
    }

    ld
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use takviye_core::{Money, ProductId, ReviewId, UserId};

    use super::*;
    use crate::config::tests::test_config;

    fn product(stock: i32) -> Product {
        let now = Utc::now();
        Product {
            id: ProductId::new(7),
            name: "Kreatin Monohidrat 300g".to_string(),
            slug: "kreatin-monohidrat-300g".to_string(),
            description: Some("Saf kreatin".to_string()),
            short_description: None,
            price: Money::from_kurus(44_990),
            compare_price: None,
            sku: Some("KRT-300".to_string()),
            barcode: None,
            stock,
            category_id: None,
            brand_id: None,
            images: vec!["https://cdn.example.com/kreatin.jpg".to_string()],
            tags: vec![],
            usage_instructions: None,
            ingredients: None,
            is_featured: false,
            is_active: true,
            meta_title: None,
            meta_description: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn review(rating: i32) -> Review {
        Review {
            id: ReviewId::new(1),
            product_id: ProductId::new(7),
            user_id: UserId::new(1),
            author: None,
            rating,
            title: None,
            comment: None,
            is_approved: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_product_offer() {
        let config = test_config();
        let ld = product_json_ld(&config, &product(3), None, &[]);
        assert_eq!(ld["@type"], "Product");
        assert_eq!(ld["offers"]["price"], "449.90");
        assert_eq!(ld["offers"]["priceCurrency"], "TRY");
        assert_eq!(ld["offers"]["availability"], "https://schema.org/InStock");
        assert_eq!(ld["sku"], "KRT-300");
        assert_eq!(ld["description"], "Saf kreatin");
        assert!(ld.get("aggregateRating").is_none());
    }

    #[test]
    fn test_out_of_stock_and_rating() {
        let config = test_config();
        let ld = product_json_ld(&config, &product(0), None, &[review(5), review(4)]);
        assert_eq!(ld["offers"]["availability"], "https://schema.org/OutOfStock");
        assert_eq!(ld["aggregateRating"]["ratingValue"], 4.5);
        assert_eq!(ld["aggregateRating"]["reviewCount"], 2);
    }
}
