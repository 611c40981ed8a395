use axum::http::StatusCode;
use chrono::FixedOffset;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use matchday_hub::config::Endpoint;

mod common;
use common::*;

fn app_data() -> Value {
    json!({ "data": [
        { "class": "player", "name": "Keeper" },
        { "class": "asset", "url": "https://cdn.example/bg.png" },
        { "class": "scheduledPost", "id": "p-late", "scheduled_time_utc": "2025-05-14T12:00:00Z", "post_caption": "Kit launch" },
        { "class": "scheduledPost", "post_id": "p-early", "scheduled_time_utc": "2025-05-14T10:00:00Z", "post_caption": "Ticket news" },
        { "class": "scheduledPost", "id": "p-other", "scheduled_time_utc": "2025-05-20T11:00:00Z" },
        { "class": "scheduledPost", "id": "p-june", "scheduled_time_utc": "2025-06-02T11:00:00Z" }
    ]})
}

fn fixtures() -> Value {
    json!([
        { "matchId": "m-1", "matchDate": "2025-05-14", "matchTime": "15:00", "opponent": "Rovers", "homeOrAway": "Away" },
        { "matchId": "m-2", "matchDate": "2025-05-17" }
    ])
}

async fn serve(app: &mut TestApp, endpoint: Endpoint, body: &Value) -> mockito::Mock {
    app.server
        .mock("POST", path_for(endpoint))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body.to_string())
        .create_async()
        .await
}

async fn app_with_data() -> TestApp {
    let mut app = TestAppBuilder::new().build().await;
    serve(&mut app, Endpoint::AppData, &app_data()).await;
    serve(&mut app, Endpoint::Fixtures, &fixtures()).await;
    app
}

fn ids(events: &Value) -> Vec<String> {
    events
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["id"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn list_view_merges_posts_and_matches() {
    let app = app_with_data().await;

    let body = body_json(app.send(get_request("/api/schedule/events", Some(SECRET))).await).await;
    assert_eq!(
        ids(&body["data"]),
        vec!["p-early", "p-late", "m-1", "m-2", "p-other", "p-june"]
    );

    let matches =
        body_json(app.send(get_request("/api/schedule/events?filter=matches", Some(SECRET))).await)
            .await;
    assert_eq!(ids(&matches["data"]), vec!["m-1", "m-2"]);
}

#[tokio::test]
async fn month_view_collapses_busy_days() {
    let app = app_with_data().await;

    let response = app
        .send(get_request("/api/schedule/month?year=2025&month=5", Some(SECRET)))
        .await;
    assert_status(&response, StatusCode::OK);
    let body = body_json(response).await;

    let cells: Vec<&Value> = body["data"]["weeks"]
        .as_array()
        .unwrap()
        .iter()
        .flat_map(|week| week.as_array().unwrap().iter())
        .collect();

    let busy = cells.iter().find(|c| c["date"] == json!("2025-05-14")).unwrap();
    assert_eq!(busy["total"], json!(3));
    assert_eq!(busy["inline"].as_array().unwrap().len(), 2);
    assert_eq!(busy["more_label"], json!("1 more"));

    let quiet = cells.iter().find(|c| c["date"] == json!("2025-05-17")).unwrap();
    assert_eq!(quiet["total"], json!(1));
    assert!(quiet["more_label"].is_null());

    // May 2025 starts on a Thursday.
    assert_eq!(cells[0]["date"], json!("2025-04-28"));
    assert_eq!(cells[0]["in_month"], json!(false));
}

#[tokio::test]
async fn day_view_shows_everything() {
    let app = app_with_data().await;

    let body = body_json(
        app.send(get_request("/api/schedule/day?date=2025-05-14", Some(SECRET)))
            .await,
    )
    .await;
    assert_eq!(ids(&body["data"]["events"]), vec!["p-early", "p-late", "m-1"]);
}

#[tokio::test]
async fn week_view_starts_monday() {
    let app = app_with_data().await;

    let body = body_json(
        app.send(get_request("/api/schedule/week?anchor=2025-05-14&filter=posts", Some(SECRET)))
            .await,
    )
    .await;
    let days = body["data"].as_array().unwrap();
    assert_eq!(days.len(), 7);
    assert_eq!(days[0]["date"], json!("2025-05-12"));
    assert_eq!(ids(&days[2]["events"]), vec!["p-early", "p-late"]);
}

#[tokio::test]
async fn bad_month_is_rejected() {
    let app = app_with_data().await;
    let response = app
        .send(get_request("/api/schedule/month?year=2025&month=13", Some(SECRET)))
        .await;
    assert_status(&response, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn session_refresh_and_invalidate() {
    let app = app_with_data().await;

    let refreshed = body_json(
        app.send(json_request("POST", "/api/session/refresh", Some(SECRET), &json!({})))
            .await,
    )
    .await;
    assert_eq!(refreshed["data"]["authenticated"], json!(true));
    assert_eq!(refreshed["data"]["posts"], json!(4));
    assert_eq!(refreshed["data"]["fixtures"], json!(2));

    let cleared = app
        .send(json_request("DELETE", "/api/session", Some(SECRET), &json!({})))
        .await;
    assert_status(&cleared, StatusCode::OK);
    let status = body_json(app.send(get_request("/api/session", Some(SECRET))).await).await;
    assert_eq!(status["data"]["authenticated"], json!(false));
}

#[tokio::test]
async fn relayed_scheduler_action_reloads_calendar() {
    let mut app = TestAppBuilder::new().build().await;
    let before = serve(
        &mut app,
        Endpoint::AppData,
        &json!([{ "class": "scheduledPost", "id": "old", "scheduled_time_utc": "2025-05-14T10:00:00Z" }]),
    )
    .await;
    serve(&mut app, Endpoint::Fixtures, &json!([])).await;
    serve(&mut app, Endpoint::Scheduler, &json!({ "ok": true })).await;

    let first = body_json(app.send(get_request("/api/schedule/events", Some(SECRET))).await).await;
    assert_eq!(ids(&first["data"]), vec!["old"]);

    before.remove_async().await;
    serve(
        &mut app,
        Endpoint::AppData,
        &json!([
            { "class": "scheduledPost", "id": "old", "scheduled_time_utc": "2025-05-14T10:00:00Z" },
            { "class": "scheduledPost", "id": "new", "scheduled_time_utc": "2025-05-15T10:00:00Z" }
        ]),
    )
    .await;

    let scheduled = app
        .send(json_request(
            "POST",
            "/api/schedule/posts",
            Some(SECRET),
            &json!({ "action": "schedule_post", "post_caption": "New kit" }),
        ))
        .await;
    assert_status(&scheduled, StatusCode::OK);

    let after = body_json(app.send(get_request("/api/schedule/events", Some(SECRET))).await).await;
    assert_eq!(ids(&after["data"]), vec!["old", "new"]);
}

#[tokio::test]
async fn fixtures_action_clears_cached_session() {
    let app = app_with_data().await;
    app.send(json_request("POST", "/api/session/refresh", Some(SECRET), &json!({})))
        .await;

    let added = app
        .send(json_request(
            "POST",
            "/api/fixtures",
            Some(SECRET),
            &json!({ "action": "add_match", "opponent": "United" }),
        ))
        .await;
    assert_status(&added, StatusCode::OK);

    let status = body_json(app.send(get_request("/api/session", Some(SECRET))).await).await;
    assert_eq!(status["data"]["authenticated"], json!(false));
}

#[tokio::test]
async fn days_follow_the_club_time_zone() {
    let tokyo = FixedOffset::east_opt(9 * 3600).unwrap();
    let mut app = TestAppBuilder::new().in_tz(tokyo).build().await;
    serve(
        &mut app,
        Endpoint::AppData,
        &json!([{ "class": "scheduledPost", "id": "late", "scheduled_time_utc": "2025-05-14T20:00:00Z" }]),
    )
    .await;
    serve(
        &mut app,
        Endpoint::Fixtures,
        &json!([{ "matchId": "m-1", "matchDate": "2025-05-15", "matchTime": "10:00" }]),
    )
    .await;

    let wednesday = body_json(
        app.send(get_request("/api/schedule/day?date=2025-05-14", Some(SECRET)))
            .await,
    )
    .await;
    assert_eq!(wednesday["data"]["events"], json!([]));

    let thursday = body_json(
        app.send(get_request("/api/schedule/day?date=2025-05-15", Some(SECRET)))
            .await,
    )
    .await;
    let events = &thursday["data"]["events"];
    assert_eq!(ids(events), vec!["late", "m-1"]);
    assert_eq!(events[1]["occurs_at"], json!("2025-05-15T01:00:00Z"));
}
