use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers::{live, proxy, schedule, session};
use crate::state::AppState;

/// JSON routes; mounted behind the bearer middleware.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Asset library
        .route("/assets", post(proxy::assets_action))

        // Match hub
        .route("/fixtures", post(proxy::fixtures_action))

        // Live logger
        .route("/live", get(live::get_live))
        .route("/live/refresh", post(live::refresh_live))
        .route("/live/events", post(proxy::log_live_event))

        // Scheduler
        .route("/schedule/posts", post(proxy::scheduler_action))
        .route("/schedule/events", get(schedule::list_events))
        .route("/schedule/month", get(schedule::month_view))
        .route("/schedule/week", get(schedule::week_view))
        .route("/schedule/day", get(schedule::day_view))

        // Session
        .route(
            "/session",
            get(session::session_status).delete(session::invalidate_session),
        )
        .route("/session/refresh", post(session::refresh_session))
}
