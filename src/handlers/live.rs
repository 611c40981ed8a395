use axum::{extract::State, http::StatusCode, response::Json};

use crate::models::ApiResponse;
use crate::services::live::LiveView;
use crate::state::AppState;

/// Current live match (clock computed at request time) or the next fixture.
pub async fn get_live(State(state): State<AppState>) -> Json<ApiResponse<LiveView>> {
    let view = state.live.snapshot().view(state.clock.now());

    let message = match (&view.live, &view.next_match) {
        (Some(live), _) => format!("{} {}", live.fixture.title(), live.state.display),
        (None, Some(next)) => format!("Next: {}", next.fixture.title()),
        (None, None) => "No upcoming fixtures".to_string(),
    };

    Json(ApiResponse::ok(view).with_message(message))
}

pub async fn refresh_live(State(state): State<AppState>) -> (StatusCode, Json<ApiResponse<()>>) {
    state.live.request_refresh();
    (
        StatusCode::ACCEPTED,
        Json(ApiResponse::ok(()).with_message("Live refresh requested")),
    )
}
