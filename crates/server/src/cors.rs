//! Cross-origin policy.
//!
//! One [`CorsConfig`] drives both surfaces: [`cors_layer`] builds the
//! tower-http layer for the axum routes and [`write_headers`] stamps the same
//! headers onto raw adapter responses.

use crate::config::CorsConfig;
use axum::http::header::{
    ACCESS_CONTROL_ALLOW_CREDENTIALS, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
    ACCESS_CONTROL_ALLOW_ORIGIN, ACCESS_CONTROL_REQUEST_HEADERS, ORIGIN, VARY,
};
use axum::http::{HeaderMap, HeaderValue, Method};
use tower_http::cors::{AllowHeaders, AllowOrigin, Any, CorsLayer};

/// Methods advertised in preflight responses.
pub const ALLOWED_METHODS: [Method; 3] = [Method::GET, Method::POST, Method::OPTIONS];

// Joined without spaces, as tower-http renders `ALLOWED_METHODS`.
const ALLOWED_METHODS_VALUE: &str = "GET,POST,OPTIONS";

/// Build the tower-http layer for `cfg`.
///
/// tower-http answers every OPTIONS request itself with an empty 200, so the
/// axum routes need no preflight handlers of their own.
pub fn cors_layer(cfg: &CorsConfig) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(ALLOWED_METHODS);

    if cfg.is_wildcard() {
        return layer.allow_origin(Any).allow_headers(Any);
    }

    let origins: Vec<HeaderValue> = cfg
        .allowed_origins
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();

    layer
        .allow_origin(AllowOrigin::list(origins))
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(cfg.allow_credentials)
}

/// Write the policy's headers for a request carrying `request_headers`.
///
/// Preflight responses additionally get the allowed methods and headers.
pub fn write_headers(
    cfg: &CorsConfig,
    request_headers: &HeaderMap,
    preflight: bool,
    headers: &mut HeaderMap,
) {
    if cfg.is_wildcard() {
        headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    } else {
        headers.append(VARY, HeaderValue::from_static("origin"));
        let allowed = request_headers.get(ORIGIN).filter(|origin| {
            cfg.allowed_origins
                .iter()
                .any(|candidate| origin.as_bytes() == candidate.as_bytes())
        });
        if let Some(origin) = allowed {
            headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, origin.clone());
            if cfg.allow_credentials {
                headers.insert(
                    ACCESS_CONTROL_ALLOW_CREDENTIALS,
                    HeaderValue::from_static("true"),
                );
            }
        }
    }

    if !preflight {
        return;
    }

    headers.insert(
        ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOWED_METHODS_VALUE),
    );
    if cfg.is_wildcard() {
        headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static("*"));
    } else if let Some(requested) = request_headers.get(ACCESS_CONTROL_REQUEST_HEADERS) {
        headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, requested.clone());
    }
}
