//! Back-office API.
//!
//! Every route here sits behind [`admin_gate`], which checks the caller's
//! role against the module named by the first path segment. Handlers take an
//! [`AdminContext`](crate::middleware::AdminContext) and record each mutation
//! in the audit log once it has been written.

mod blog;
mod catalog;
mod commerce;
mod compliance;
mod content;
mod dashboard;
mod marketplace;
mod orders;
mod settings;
mod users;

use axum::{Router, middleware::from_fn_with_state};

use crate::error::AppError;
use crate::middleware::admin_gate;
use crate::state::AppState;

/// Default page size for back-office listings.
const ADMIN_PAGE_SIZE: i64 = 25;

pub fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .merge(dashboard::router())
        .merge(catalog::router())
        .merge(orders::router())
        .merge(users::router())
        .merge(commerce::router())
        .merge(content::router())
        .merge(blog::router())
        .merge(settings::router())
        .merge(compliance::router())
        .merge(marketplace::router())
        .fallback(unknown_route)
        .layer(from_fn_with_state(state, admin_gate))
}

/// Unmatched admin paths. Registered before the gate layer so it covers them.
async fn unknown_route() -> AppError {
    not_found("Sayfa")
}

fn not_found(what: &str) -> AppError {
    AppError::NotFound(format!("{what} bulunamadı"))
}
