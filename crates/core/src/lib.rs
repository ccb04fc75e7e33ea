//! Takviye Core - Shared types and business rules.
//!
//! This crate provides the domain vocabulary used across all Takviye components:
//! - `storefront` - Public JSON API and back-office API for the supplement store
//! - `cli` - Command-line tools for migrations, seeding and admin management
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP clients. Every pricing, shipping, loyalty and recommendation
//! rule lives here so it can be unit tested without a running server.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, money, emails, statuses and roles
//! - [`permissions`] - Static role to admin-module access table
//! - [`pricing`] - Compare-price normalization, discount percentages and VAT
//! - [`shipping`] - Free-shipping threshold policy
//! - [`coupon`] - Coupon eligibility and discount calculation
//! - [`loyalty`] - Point earning, redemption and referral rewards
//! - [`checkout`] - Order quote assembly
//! - [`wizard`] - Supplement wizard bundle scorer
//! - [`slug`] - Turkish-aware URL slugs

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod checkout;
pub mod coupon;
pub mod loyalty;
pub mod permissions;
pub mod pricing;
pub mod shipping;
pub mod slug;
pub mod types;
pub mod wizard;

pub use types::*;
