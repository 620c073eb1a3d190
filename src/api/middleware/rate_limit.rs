//! Per-IP rate limiting for the management API.

use axum::Router;
use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use std::sync::Arc;
use tower_governor::{
    GovernorLayer,
    governor::GovernorConfigBuilder,
    key_extractor::{PeerIpKeyExtractor, SmartIpKeyExtractor},
};

use crate::state::AppState;

const PER_SECOND: u64 = 1;
const BURST_SIZE: u32 = 10;

/// Wraps `router` in a token bucket keyed by client IP.
///
/// # Limits
///
/// - **Rate**: 1 request per second
/// - **Burst**: 10 requests
///
/// Requests exceeding the limit receive `429 Too Many Requests`.
///
/// # Key Extraction
///
/// With `behind_proxy` the client IP is read from `X-Forwarded-For`,
/// `X-Real-IP` or `Forwarded`, falling back to the peer address. Enable it only
/// behind a trusted reverse proxy; otherwise clients can spoof their key.
/// Without it the socket peer address is used, which requires the server to
/// be started with connect info.
pub fn apply(router: Router<AppState>, behind_proxy: bool) -> Router<AppState> {
    if behind_proxy {
        router.layer(proxied_layer())
    } else {
        router.layer(peer_layer())
    }
}

fn peer_layer() -> GovernorLayer<PeerIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>
{
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(PER_SECOND)
            .burst_size(BURST_SIZE)
            .finish()
            .unwrap(),
    );

    GovernorLayer::new(governor_conf)
}

fn proxied_layer()
-> GovernorLayer<SmartIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body> {
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .key_extractor(SmartIpKeyExtractor)
            .per_second(PER_SECOND)
            .burst_size(BURST_SIZE)
            .finish()
            .unwrap(),
    );

    GovernorLayer::new(governor_conf)
}
