//! Public JSON API under `/api`.
//!
//! Rate limits apply to sign-in, the AI advisor and the cart/checkout
//! writes; everything else is read-mostly and unthrottled.

pub mod account;
pub mod auth;
pub mod blog;
pub mod cart;
pub mod catalog;
pub mod chat;
pub mod content;
pub mod orders;

use axum::Router;

use crate::middleware::{api_rate_limiter, auth_rate_limiter, chat_rate_limiter};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(auth::router().layer(auth_rate_limiter()))
        .merge(chat::router().layer(chat_rate_limiter()))
        .merge(cart::router().layer(api_rate_limiter()))
        .merge(catalog::router())
        .merge(orders::router())
        .merge(account::router())
        .merge(content::router())
        .merge(blog::router())
}
