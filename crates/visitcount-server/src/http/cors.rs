//! Permissive CORS policy.
//!
//! Every response gets allow-origin, allow-methods and allow-headers. OPTIONS
//! responses additionally get `Access-Control-Max-Age`. The layer only
//! decorates headers; the preflight body and status come from the route.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, HeaderValue, Method},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use crate::config::{AllowOrigin, CorsSection};

pub const ALLOW_METHODS: &str = "GET, POST, OPTIONS";
pub const ALLOW_HEADERS: &str = "Content-Type";

#[derive(Debug, Clone)]
pub struct CorsPolicy {
    allow_origin: AllowOrigin,
    max_age: HeaderValue,
}

impl CorsPolicy {
    pub fn from_config(cfg: &CorsSection) -> Self {
        Self {
            allow_origin: cfg.allow_origin.clone(),
            max_age: HeaderValue::from(cfg.max_age_secs),
        }
    }

    /// Write the CORS headers for a response to a request carrying `origin`.
    pub fn apply(&self, origin: Option<&HeaderValue>, preflight: bool, headers: &mut HeaderMap) {
        let allow_origin = match (&self.allow_origin, origin) {
            (AllowOrigin::Mirror, Some(o)) => {
                headers.append(header::VARY, HeaderValue::from_static("Origin"));
                o.clone()
            }
            // no Origin to mirror: fall back to the wildcard
            _ => HeaderValue::from_static("*"),
        };

        headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, allow_origin);
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(ALLOW_METHODS),
        );
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(ALLOW_HEADERS),
        );
        if preflight {
            headers.insert(header::ACCESS_CONTROL_MAX_AGE, self.max_age.clone());
        }
    }
}

/// `axum::middleware::from_fn_with_state` entry point.
pub async fn cors_middleware(
    State(policy): State<Arc<CorsPolicy>>,
    req: Request,
    next: Next,
) -> Response {
    let origin = req.headers().get(header::ORIGIN).cloned();
    let preflight = req.method() == Method::OPTIONS;

    let mut resp = next.run(req).await;
    policy.apply(origin.as_ref(), preflight, resp.headers_mut());
    resp
}
