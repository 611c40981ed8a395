use axum::{
    extract::State,
    http::HeaderMap,
    response::Json,
};
use axum_extra::extract::Multipart;
use serde_json::Value;
use tracing::Instrument;
use uuid::Uuid;

use crate::config::Endpoint;
use crate::errors::{AppError, Result};
use crate::middleware::auth::{authorize, bearer_from_headers};
use crate::services::webhook::{forward_form, Relayed};
use crate::state::AppState;

/// Forward a JSON body to `endpoint`. The bearer check has already run in the middleware.
pub async fn relay_json(state: &AppState, endpoint: Endpoint, body: Value) -> Result<Relayed> {
    let action = body
        .get("action")
        .and_then(Value::as_str)
        .unwrap_or("-")
        .to_string();
    let span = tracing::info_span!("proxy", request_id = %Uuid::new_v4(), ?endpoint, %action);

    async move {
        let started = std::time::Instant::now();
        let relayed = state.webhooks.forward_json(endpoint, &body).await?;
        tracing::info!("Relayed in {:?}", started.elapsed());
        Ok::<_, AppError>(relayed)
    }
    .instrument(span)
    .await
}

/// Read the whole form, check its token (form field or header), then forward it.
pub async fn relay_multipart(
    state: &AppState,
    endpoint: Endpoint,
    headers: &HeaderMap,
    multipart: Multipart,
) -> Result<Relayed> {
    let span = tracing::info_span!("proxy", request_id = %Uuid::new_v4(), ?endpoint);

    async move {
        let forward = forward_form(multipart).await?;
        let token = forward.token.as_deref().or_else(|| bearer_from_headers(headers));
        authorize(state, token)?;

        if forward.field_count == 0 {
            return Err(AppError::Multipart("form has no fields".to_string()));
        }

        tracing::info!("Forwarding {} form fields", forward.field_count);
        state.webhooks.forward_multipart(endpoint, forward.form).await
    }
    .instrument(span)
    .await
}

// ---- announcement compositions ----

pub async fn announce_matchday(
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<Relayed> {
    relay_multipart(&state, Endpoint::Matchday, &headers, multipart).await
}

pub async fn announce_squad(
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<Relayed> {
    relay_multipart(&state, Endpoint::Squad, &headers, multipart).await
}

pub async fn announce_result(
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<Relayed> {
    relay_multipart(&state, Endpoint::Result, &headers, multipart).await
}

pub async fn announce_up_next(
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<Relayed> {
    relay_multipart(&state, Endpoint::UpNext, &headers, multipart).await
}

pub async fn announce_custom(
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<Relayed> {
    relay_multipart(&state, Endpoint::Custom, &headers, multipart).await
}

// ---- asset library ----

pub async fn assets_action(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Relayed> {
    relay_json(&state, Endpoint::Assets, body).await
}

pub async fn upload_asset(
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<Relayed> {
    relay_multipart(&state, Endpoint::Assets, &headers, multipart).await
}

// ---- match hub ----

/// `add_match`, `update_match` and friends. The live poller re-reads fixtures
/// and the calendar reloads on its next request.
pub async fn fixtures_action(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Relayed> {
    let relayed = relay_json(&state, Endpoint::Fixtures, body).await?;
    state.session.invalidate().await;
    state.live.request_refresh();
    Ok(relayed)
}

// ---- live logger ----

pub async fn log_live_event(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Relayed> {
    let relayed = relay_json(&state, Endpoint::LiveEvents, body).await?;
    state.live.request_refresh();
    Ok(relayed)
}

// ---- post scheduler ----

pub async fn scheduler_action(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Relayed> {
    let relayed = relay_json(&state, Endpoint::Scheduler, body).await?;
    state.session.invalidate().await;
    Ok(relayed)
}
