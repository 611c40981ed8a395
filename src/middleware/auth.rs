use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use crate::errors::{AppError, Result};
use crate::state::AppState;

/// Token that passed the check, available to handlers as an extension.
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

pub fn bearer_from_headers(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("authorization")
        .and_then(|header| header.to_str().ok())
        .and_then(|header| header.strip_prefix("Bearer "))
}

/// Exact comparison against the configured secret; an unset secret is a server error.
pub fn authorize(state: &AppState, presented: Option<&str>) -> Result<()> {
    let secret = state.config.require_secret()?;
    match presented {
        Some(token) if token == secret => Ok(()),
        _ => {
            tracing::warn!("Rejected request with missing or wrong token");
            Err(AppError::Unauthorized)
        }
    }
}

pub async fn auth_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response> {
    let token = bearer_from_headers(&headers);
    authorize(&state, token)?;

    if let Some(token) = token {
        request.extensions_mut().insert(BearerToken(token.to_string()));
    }

    Ok(next.run(request).await)
}
