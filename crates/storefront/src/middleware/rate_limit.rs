//! Per-IP rate limiting with governor and `tower_governor`.
//!
//! - `auth_rate_limiter`: login and registration (~10/min)
//! - `chat_rate_limiter`: AI advisor, which costs money per call (~20/min)
//! - `api_rate_limiter`: cart and checkout writes (~100/min)

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::extract::ConnectInfo;
use axum::http::{HeaderMap, Request};
use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use tower_governor::{GovernorError, GovernorLayer, governor::GovernorConfigBuilder};

/// Proxy headers carrying the client address, most trusted first.
const CLIENT_IP_HEADERS: &[&str] = &["cf-connecting-ip", "x-forwarded-for", "x-real-ip"];

/// Client address from proxy headers.
///
/// `X-Forwarded-For` may hold a chain; the first hop is the client.
#[must_use]
pub fn client_ip(headers: &HeaderMap) -> Option<IpAddr> {
    CLIENT_IP_HEADERS.iter().find_map(|name| {
        headers
            .get(*name)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.split(',').next())
            .and_then(|s| s.trim().parse::<IpAddr>().ok())
    })
}

/// Keys rate limits by [`client_ip`], else the socket peer address.
#[derive(Clone, Copy)]
pub struct ClientIpKeyExtractor;

impl tower_governor::key_extractor::KeyExtractor for ClientIpKeyExtractor {
    type Key = IpAddr;

    fn extract<T>(&self, req: &Request<T>) -> Result<Self::Key, GovernorError> {
        client_ip(req.headers())
            .or_else(|| {
                req.extensions()
                    .get::<ConnectInfo<SocketAddr>>()
                    .map(|ConnectInfo(addr)| addr.ip())
            })
            .ok_or(GovernorError::UnableToExtractKey)
    }
}

pub type RateLimiterLayer =
    GovernorLayer<ClientIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

fn limiter(replenish_secs: u64, burst: u32) -> RateLimiterLayer {
    let config = GovernorConfigBuilder::default()
        .key_extractor(ClientIpKeyExtractor)
        .per_second(replenish_secs)
        .burst_size(burst)
        .finish()
        .expect("rate limiter config with non-zero period and burst is valid");
    GovernorLayer::new(Arc::new(config))
}

/// One request every 6 seconds, burst of 5.
///
/// # Panics
///
/// Never: the period and burst are non-zero constants.
#[must_use]
pub fn auth_rate_limiter() -> RateLimiterLayer {
    limiter(6, 5)
}

/// One request every 3 seconds, burst of 10.
///
/// # Panics
///
/// Never: the period and burst are non-zero constants.
#[must_use]
pub fn chat_rate_limiter() -> RateLimiterLayer {
    limiter(3, 10)
}

/// One request per second, burst of 50.
///
/// # Panics
///
/// Never: the period and burst are non-zero constants.
#[must_use]
pub fn api_rate_limiter() -> RateLimiterLayer {
    limiter(1, 50)
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_static(value));
        }
        map
    }

    #[test]
    fn test_client_ip_prefers_cloudflare() {
        let map = headers(&[
            ("x-forwarded-for", "10.0.0.1"),
            ("cf-connecting-ip", "203.0.113.7"),
        ]);
        assert_eq!(client_ip(&map), "203.0.113.7".parse().ok());
    }

    #[test]
    fn test_client_ip_first_forwarded_hop() {
        let map = headers(&[("x-forwarded-for", "198.51.100.2, 10.0.0.1")]);
        assert_eq!(client_ip(&map), "198.51.100.2".parse().ok());
    }

    #[test]
    fn test_client_ip_skips_garbage() {
        let map = headers(&[("cf-connecting-ip", "unknown"), ("x-real-ip", "::1")]);
        assert_eq!(client_ip(&map), "::1".parse().ok());
        assert_eq!(client_ip(&HeaderMap::new()), None);
    }
}
