//! HTTP middleware and extractors.
//!
//! # Layer order (outermost first)
//!
//! 1. Sentry layers (hub per request, HTTP transaction)
//! 2. `TraceLayer` (request span)
//! 3. CORS
//! 4. Request ID (recorded on the span)
//! 5. Route-level: rate limits on auth/chat/checkout, role gate on `/api/admin`

pub mod admin_gate;
pub mod auth;
pub mod rate_limit;
pub mod request_id;

pub use admin_gate::{AdminContext, admin_gate};
pub use auth::{CurrentCartOwner, OptionalAuth, RequireAuth};
pub use rate_limit::{api_rate_limiter, auth_rate_limiter, chat_rate_limiter, client_ip};
pub use request_id::request_id_middleware;
