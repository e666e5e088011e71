//! HTTP routes.
//!
//! Health and API responses are marked `no-store` so intermediaries never
//! serve a stale heartbeat or recommendation. Every request passes through
//! the request ID middleware, which opens the span all request logs attach to,
//! and is counted by the metrics middleware. A panicking handler answers 500.

pub mod coffee;
pub mod health;
pub mod metrics;

use axum::{middleware, routing::get, Router};
use http::header::{HeaderName, HeaderValue, CACHE_CONTROL};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::config::{CorsConfig, CACHE_CONTROL_NO_STORE, REQUEST_ID_HEADER};
use crate::error::panic_response;
use crate::middleware::{metrics_layer, request_id_layer};
use crate::state::AppState;

/// Build the CORS layer from configuration. Unparseable origins and the
/// `*` wildcard (not allowed with credentials) are skipped.
pub fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter(|origin| {
            let wildcard = origin.trim() == "*";
            if wildcard {
                tracing::warn!("Ignoring wildcard CORS origin");
            }
            !wildcard
        })
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(origin = %origin, error = %e, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .expose_headers([HeaderName::from_static(REQUEST_ID_HEADER)])
}

/// Creates the Axum router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    let health_routes = Router::new()
        .route("/", get(health::simple))
        .route("/health", get(health::detailed));

    let coffee_routes = Router::new()
        .route("/api/v1/coffee/recommend", get(coffee::recommend))
        .route("/api/v1/coffee/drinks", get(coffee::drinks));

    let metrics_routes = Router::new().route("/metrics", get(metrics::metrics));

    let cors = cors_layer(&state.config.cors);
    let request_metrics = state.metrics.clone();

    Router::new()
        .merge(health_routes)
        .merge(coffee_routes)
        .merge(metrics_routes)
        .with_state(state)
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(SetResponseHeaderLayer::if_not_present(
            CACHE_CONTROL,
            HeaderValue::from_static(CACHE_CONTROL_NO_STORE),
        ))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn_with_state(request_metrics, metrics_layer))
        // Request ID middleware - creates root span with request_id for correlation
        .layer(middleware::from_fn(request_id_layer))
}
