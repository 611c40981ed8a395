use axum::{routing::post, Router};

use crate::handlers::proxy;
use crate::state::AppState;

// Multipart routes check the token themselves; it may arrive as a form field.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/matchday", post(proxy::announce_matchday))
        .route("/squad", post(proxy::announce_squad))
        .route("/result", post(proxy::announce_result))
        .route("/upnext", post(proxy::announce_up_next))
        .route("/custom", post(proxy::announce_custom))
}

pub fn upload_routes() -> Router<AppState> {
    Router::new().route("/assets/upload", post(proxy::upload_asset))
}
