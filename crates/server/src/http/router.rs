use super::handlers::comments;
use crate::{limiter, state::AppState};
use axum::{
    http::{HeaderValue, Method},
    middleware,
    routing::post,
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub fn build_router(state: AppState, allowed_origins: &str) -> Router {
    let cors = if allowed_origins == "*" {
        CorsLayer::new()
            .allow_methods([Method::GET, Method::POST])
            .allow_origin(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<HeaderValue> = allowed_origins
            .split(',')
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .filter_map(|s| s.parse::<HeaderValue>().ok())
            .collect();

        if origins.is_empty() {
            tracing::warn!("CORS config is invalid or empty, falling back to allow ANY.");
            CorsLayer::new()
                .allow_methods([Method::GET, Method::POST])
                .allow_origin(Any)
                .allow_headers(Any)
        } else {
            tracing::info!("CORS enabled for origins: {:?}", origins);
            CorsLayer::new()
                .allow_methods([Method::GET, Method::POST])
                .allow_origin(origins)
                .allow_headers(Any)
        }
    };

    Router::new()
        .route(
            "/comments",
            post(comments::create_comment)
                .route_layer(middleware::from_fn_with_state(state.clone(), limiter::limit)),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
