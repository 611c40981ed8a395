use axum::extract::{DefaultBodyLimit, State};
use axum::{http::Method, middleware as axum_middleware, response::Json, routing::get, Router};
use serde_json::{json, Value};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod config;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

pub use config::{AppConfig, Endpoint};
pub use errors::{AppError, Result};
pub use state::AppState;

/// Announcement images are uploaded at full resolution.
pub const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

pub fn build_router(app_state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any)
        .allow_credentials(false);

    let protected = routes::hub::routes().route_layer(axum_middleware::from_fn_with_state(
        app_state.clone(),
        middleware::auth::auth_middleware,
    ));

    let uploads = Router::new()
        .nest("/announce", routes::announce::routes())
        .merge(routes::announce::upload_routes())
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES));

    let api = Router::new().merge(protected).merge(uploads);

    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_check))
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state)
}

async fn root_handler() -> &'static str {
    "⚽ Matchday Hub API"
}

async fn health_check(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "config": state.config.get_config_info(),
        "live_refreshed_at": state.live.snapshot().refreshed_at,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
