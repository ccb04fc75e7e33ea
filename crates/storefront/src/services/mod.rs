//! Business logic services for the storefront.
//!
//! # Services
//!
//! - `auth` - Registration, login, password hashing and bearer tokens
//! - `checkout` - Quote, payment and order recording
//! - `orders` - Order status machine side effects
//! - `payment` - Signed card payment gateway client
//! - `chat` - AI supplement advisor
//! - `feeds` - Marketplace XML feeds, sitemap and robots.txt
//! - `invoice` - Printable HTML invoices
//! - `seo` - JSON-LD structured data
//! - `markdown` - Blog post rendering
//! - `audit` - Back-office audit trail

pub mod audit;
pub mod auth;
pub mod chat;
pub mod checkout;
pub mod feeds;
pub mod invoice;
pub mod markdown;
pub mod orders;
pub mod payment;
pub mod seo;
