//! Axum router wiring.
//!
//! `/` carries the counter (GET/POST) and its preflight (OPTIONS); the ops
//! endpoints sit beside it. The CORS layer wraps every route.

use axum::{middleware, routing::get, Router};

use crate::{app_state::AppState, http, ops};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/",
            get(http::record_visit)
                .post(http::record_visit)
                .options(http::preflight),
        )
        .route("/healthz", get(ops::healthz))
        .route("/readyz", get(ops::readyz))
        .route("/metrics", get(ops::metrics))
        .layer(middleware::from_fn_with_state(
            state.cors(),
            http::cors::cors_middleware,
        ))
        .with_state(state)
}
