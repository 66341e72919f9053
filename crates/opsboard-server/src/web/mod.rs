use axum::{
    http::Method,
    middleware as axum_middleware,
    routing::get,
    Json, Router,
};
use opsboard_core::ServerConfig;
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::context::Workspace;

pub mod auth;
pub mod error;
pub mod extract;
pub mod models;
pub mod routes;

pub use error::ApiError;

pub struct AppState {
    pub workspace: Arc<Workspace>,
    pub config: Arc<ServerConfig>,
}

async fn health_check_handler() -> Json<Value> {
    Json(json!({ "status": true, "data": "OK" }))
}

pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(vec![
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any);

    let protected = Router::new()
        .merge(routes::boards::router())
        .merge(routes::lists::router())
        .merge(routes::cards::router())
        .merge(routes::activities::router())
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            auth::authenticate,
        ));

    Router::new()
        .route("/health", get(health_check_handler))
        .merge(protected)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
