//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::StorefrontConfig;
use crate::services::auth::TokenKeys;
use crate::services::chat::{ChatClient, ChatError};
use crate::services::feeds::FeedCache;
use crate::services::payment::{PaymentClient, PaymentError};

/// Error building an outbound HTTP client at startup.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("payment client: {0}")]
    Payment(#[from] PaymentError),
    #[error("chat client: {0}")]
    Chat(#[from] ChatError),
}

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`. Holds the pool, configuration, token keys,
/// the optional payment and AI clients and the feed cache.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    pool: PgPool,
    tokens: TokenKeys,
    payments: Option<PaymentClient>,
    chat: Option<ChatClient>,
    feeds: FeedCache,
}

impl AppState {
    /// Create the application state.
    ///
    /// # Errors
    ///
    /// Returns an error if a configured HTTP client cannot be built.
    pub fn new(config: StorefrontConfig, pool: PgPool) -> Result<Self, StateError> {
        let tokens = TokenKeys::new(&config.jwt);
        let payments = config.payment.as_ref().map(PaymentClient::new).transpose()?;
        let chat = config.ai.as_ref().map(ChatClient::new).transpose()?;

        if payments.is_none() {
            tracing::warn!("Payment gateway not configured, card checkout disabled");
        }
        if chat.is_none() {
            tracing::warn!("AI chat not configured, advisor disabled");
        }

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                tokens,
                payments,
                chat,
                feeds: FeedCache::new(),
            }),
        })
    }

    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// JWT signing and verification keys.
    #[must_use]
    pub fn tokens(&self) -> &TokenKeys {
        &self.inner.tokens
    }

    /// Card payment gateway, if configured.
    #[must_use]
    pub fn payments(&self) -> Option<&PaymentClient> {
        self.inner.payments.as_ref()
    }

    /// AI advisor client, if configured.
    #[must_use]
    pub fn chat(&self) -> Option<&ChatClient> {
        self.inner.chat.as_ref()
    }

    #[must_use]
    pub fn feeds(&self) -> &FeedCache {
        &self.inner.feeds
    }
}
