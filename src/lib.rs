pub mod client_ip;
pub mod config;
pub mod error;
pub mod geolocation;
pub mod handlers;
pub mod metrics;
pub mod rate_limit;
pub mod state;
pub mod upstream;

use axum::{Router, middleware, routing::get};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::geolocation::geolocation_middleware;
use crate::handlers::{forecast_handler, health_handler, metrics_handler, weather_handler};
use crate::rate_limit::rate_limit_middleware;
use crate::state::AppState;

// Full router: proxy routes behind location logging, everything behind the rate limiter
pub fn app(state: Arc<AppState>) -> Router {
    let proxy = Router::new()
        .route("/weather", get(weather_handler))
        .route("/forecast", get(forecast_handler))
        .route_layer(middleware::from_fn_with_state(
            Arc::clone(&state),
            geolocation_middleware,
        ));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(proxy)
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .layer(middleware::from_fn_with_state(
            Arc::clone(&state),
            rate_limit_middleware,
        ))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
