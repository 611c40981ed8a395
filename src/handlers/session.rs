use axum::{extract::State, response::Json, Extension};

use crate::errors::Result;
use crate::middleware::auth::BearerToken;
use crate::models::ApiResponse;
use crate::services::session::SessionStatus;
use crate::state::AppState;

pub async fn refresh_session(
    State(state): State<AppState>,
    Extension(token): Extension<BearerToken>,
) -> Result<Json<ApiResponse<SessionStatus>>> {
    state.session.refresh(&token.0, &state.webhooks).await?;
    let status = state.session.status().await;
    Ok(Json(ApiResponse::ok(status).with_message("Session refreshed")))
}

pub async fn invalidate_session(State(state): State<AppState>) -> Json<ApiResponse<SessionStatus>> {
    state.session.invalidate().await;
    Json(ApiResponse::ok(state.session.status().await).with_message("Session cleared"))
}

pub async fn session_status(State(state): State<AppState>) -> Json<ApiResponse<SessionStatus>> {
    Json(ApiResponse::ok(state.session.status().await))
}
