use axum::{
    extract::{Query, State},
    response::Json,
    Extension,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::errors::{AppError, Result};
use crate::middleware::auth::BearerToken;
use crate::models::ApiResponse;
use crate::services::schedule::{self, CalendarEvent, EventFilter, MonthGrid, WeekDay};
use crate::services::session::Dataset;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub filter: EventFilter,
}

#[derive(Debug, Deserialize, Validate)]
pub struct MonthQuery {
    #[validate(range(min = 1970, max = 9999))]
    pub year: i32,
    #[validate(range(min = 1, max = 12))]
    pub month: u32,
    #[serde(default)]
    pub filter: EventFilter,
}

#[derive(Debug, Deserialize)]
pub struct WeekQuery {
    pub anchor: NaiveDate,
    #[serde(default)]
    pub filter: EventFilter,
}

#[derive(Debug, Deserialize)]
pub struct DayQuery {
    pub date: NaiveDate,
    #[serde(default)]
    pub filter: EventFilter,
}

#[derive(Debug, Serialize)]
pub struct DayView {
    pub date: NaiveDate,
    pub events: Vec<CalendarEvent>,
}

/// Cached dataset, loading it with the caller's token on first use.
async fn dataset(state: &AppState, token: &BearerToken) -> Result<Dataset> {
    if let Some(dataset) = state.session.dataset().await {
        return Ok(dataset);
    }
    tracing::info!("No cached schedule data; refreshing session");
    state.session.refresh(&token.0, &state.webhooks).await
}

async fn events(state: &AppState, token: &BearerToken, filter: EventFilter) -> Result<Vec<CalendarEvent>> {
    let data = dataset(state, token).await?;
    Ok(schedule::aggregate(&data.posts, &data.fixtures, filter, &state.config.club_tz))
}

pub async fn list_events(
    State(state): State<AppState>,
    Extension(token): Extension<BearerToken>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ApiResponse<Vec<CalendarEvent>>>> {
    let events = events(&state, &token, query.filter).await?;
    Ok(Json(ApiResponse::ok(events)))
}

pub async fn month_view(
    State(state): State<AppState>,
    Extension(token): Extension<BearerToken>,
    Query(query): Query<MonthQuery>,
) -> Result<Json<ApiResponse<MonthGrid>>> {
    query.validate()?;
    let events = events(&state, &token, query.filter).await?;
    let grid = schedule::month_grid(&events, query.year, query.month, &state.config.club_tz)
        .ok_or_else(|| AppError::invalid_data("month out of range"))?;
    Ok(Json(ApiResponse::ok(grid)))
}

pub async fn week_view(
    State(state): State<AppState>,
    Extension(token): Extension<BearerToken>,
    Query(query): Query<WeekQuery>,
) -> Result<Json<ApiResponse<[WeekDay; 7]>>> {
    let events = events(&state, &token, query.filter).await?;
    let week = schedule::bucket_by_week(&events, query.anchor, &state.config.club_tz);
    Ok(Json(ApiResponse::ok(week)))
}

/// Everything on one date; what a month cell's "N more" opens.
pub async fn day_view(
    State(state): State<AppState>,
    Extension(token): Extension<BearerToken>,
    Query(query): Query<DayQuery>,
) -> Result<Json<ApiResponse<DayView>>> {
    let events = events(&state, &token, query.filter).await?;
    let day = DayView {
        date: query.date,
        events: schedule::events_on(&events, query.date, &state.config.club_tz),
    };
    Ok(Json(ApiResponse::ok(day)))
}
