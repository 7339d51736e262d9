//! Client address resolution and the general API rate limiter.
//!
//! The same resolution order feeds both `tower_governor` (coarse per-IP
//! throttling of `/api`) and the [`ClientIp`] extractor used as the origin
//! address for the submission limiter:
//!
//! 1. `CF-Connecting-IP`
//! 2. `X-Forwarded-For` (first entry)
//! 3. `X-Real-IP`
//! 4. `Fly-Client-IP`
//! 5. The socket peer address (`ConnectInfo`)

use std::convert::Infallible;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::{Extensions, HeaderMap, Request, request::Parts};
use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use tower_governor::{GovernorError, GovernorLayer, governor::GovernorConfigBuilder};

const IP_HEADERS: &[&str] = &["cf-connecting-ip", "x-forwarded-for", "x-real-ip", "fly-client-ip"];

/// Resolve the client address from proxy headers, then the peer address.
#[must_use]
pub fn resolve_client_ip(headers: &HeaderMap, extensions: &Extensions) -> Option<IpAddr> {
    IP_HEADERS
        .iter()
        .find_map(|name| {
            headers
                .get(*name)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.split(',').next())
                .and_then(|s| s.trim().parse::<IpAddr>().ok())
        })
        .or_else(|| {
            extensions
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| addr.ip())
        })
}

// =============================================================================
// Key Extractor
// =============================================================================

/// `tower_governor` key extractor using [`resolve_client_ip`].
#[derive(Clone, Copy)]
pub struct ClientIpKeyExtractor;

impl tower_governor::key_extractor::KeyExtractor for ClientIpKeyExtractor {
    type Key = IpAddr;

    fn extract<T>(&self, req: &Request<T>) -> Result<Self::Key, GovernorError> {
        resolve_client_ip(req.headers(), req.extensions()).ok_or(GovernorError::UnableToExtractKey)
    }
}

// =============================================================================
// Handler Extractor
// =============================================================================

/// The submitting client's address.
///
/// Falls back to `0.0.0.0` when nothing identifies the client, so every
/// unidentifiable request shares one limiter bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientIp(pub IpAddr);

impl<S> FromRequestParts<S> for ClientIp
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let ip = resolve_client_ip(&parts.headers, &parts.extensions).unwrap_or_else(|| {
            tracing::debug!("No client address on request");
            IpAddr::V4(Ipv4Addr::UNSPECIFIED)
        });
        Ok(Self(ip))
    }
}

// =============================================================================
// Rate Limiter Configuration
// =============================================================================

/// Rate limiter layer type for Axum.
pub type RateLimiterLayer =
    GovernorLayer<ClientIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

/// Create rate limiter for the JSON API: ~100 requests per minute per IP.
///
/// Configuration: 1 request per second (replenish), burst of 50. Word
/// submissions are additionally held to their own sliding window.
///
/// # Panics
///
/// This function will not panic. The configuration uses only valid positive
/// integers (`per_second(1)` and `burst_size(50)`), which are always accepted
/// by `GovernorConfigBuilder`.
#[must_use]
pub fn api_rate_limiter() -> RateLimiterLayer {
    let config = GovernorConfigBuilder::default()
        .key_extractor(ClientIpKeyExtractor)
        .per_second(1)
        .burst_size(50)
        .finish()
        .expect("rate limiter config with per_second(1) and burst_size(50) is valid");
    GovernorLayer::new(Arc::new(config))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
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
    fn test_cloudflare_header_wins() {
        let map = headers(&[
            ("x-forwarded-for", "10.0.0.1"),
            ("cf-connecting-ip", "203.0.113.7"),
        ]);
        let ip = resolve_client_ip(&map, &Extensions::new()).unwrap();
        assert_eq!(ip, "203.0.113.7".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn test_forwarded_for_first_entry() {
        let map = headers(&[("x-forwarded-for", "198.51.100.2, 10.0.0.1")]);
        let ip = resolve_client_ip(&map, &Extensions::new()).unwrap();
        assert_eq!(ip, "198.51.100.2".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn test_falls_back_to_peer_address() {
        let mut extensions = Extensions::new();
        extensions.insert(ConnectInfo("192.0.2.9:5555".parse::<SocketAddr>().unwrap()));
        let map = headers(&[("x-real-ip", "not-an-ip")]);

        let ip = resolve_client_ip(&map, &extensions).unwrap();
        assert_eq!(ip, "192.0.2.9".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn test_nothing_to_resolve() {
        assert!(resolve_client_ip(&HeaderMap::new(), &Extensions::new()).is_none());
    }
}
