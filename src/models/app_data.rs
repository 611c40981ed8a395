use serde::Serialize;
use serde_json::Value;

use super::fixture::Fixture;
use super::scheduled_post::ScheduledPost;

/// Record kinds found in the app-data payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordClass {
    Player,
    Asset,
    ScheduledPost,
    Match,
    Other,
}

impl RecordClass {
    pub fn of(record: &Value) -> Self {
        let class = record.get("class").and_then(Value::as_str);
        let kind = record.get("type").and_then(Value::as_str);
        match (class, kind) {
            (Some("player"), _) => RecordClass::Player,
            (Some("asset"), _) => RecordClass::Asset,
            (Some("scheduledPost"), _) => RecordClass::ScheduledPost,
            (_, Some("Match")) => RecordClass::Match,
            _ => RecordClass::Other,
        }
    }
}

/// The app-data payload split by discriminant.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AppData {
    pub players: Vec<Value>,
    pub assets: Vec<Value>,
    pub scheduled_posts: Vec<ScheduledPost>,
    pub fixtures: Vec<Fixture>,
}

impl AppData {
    pub fn from_records(records: Vec<Value>) -> Self {
        let mut data = AppData::default();

        for record in records {
            match RecordClass::of(&record) {
                RecordClass::Player => data.players.push(record),
                RecordClass::Asset => data.assets.push(record),
                RecordClass::ScheduledPost => match serde_json::from_value(record) {
                    Ok(post) => data.scheduled_posts.push(post),
                    Err(e) => tracing::warn!("Skipping malformed scheduled post: {}", e),
                },
                RecordClass::Match => match serde_json::from_value(record) {
                    Ok(fixture) => data.fixtures.push(fixture),
                    Err(e) => tracing::warn!("Skipping malformed match record: {}", e),
                },
                RecordClass::Other => {}
            }
        }

        data
    }
}

/// Accept a bare array or an object wrapping one under `data`; anything else is empty.
pub fn normalize_list(value: Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("data") {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}
