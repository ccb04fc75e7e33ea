//! Takviye storefront library.
//!
//! The public storefront API, the back-office API, marketplace feeds and the
//! sitemap, packaged as a library so the binary and the integration tests
//! build the same router.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

pub use routes::app;
