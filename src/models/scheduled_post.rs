use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use super::match_event::parse_instant;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScheduledPost {
    #[serde(default, alias = "post_id", deserialize_with = "id_string")]
    pub id: String,

    #[serde(default)]
    pub scheduled_time_utc: Option<String>,

    #[serde(default)]
    pub image_url: Option<String>,

    #[serde(default)]
    pub post_caption: Option<String>,
}

impl ScheduledPost {
    pub fn scheduled_at(&self) -> Option<DateTime<Utc>> {
        let raw = self.scheduled_time_utc.as_deref()?;
        parse_instant(raw).or_else(|| {
            // Date-only values are read as midnight UTC.
            chrono::NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
                .ok()
                .map(|d| d.and_time(chrono::NaiveTime::MIN))
                .map(|naive| Utc.from_utc_datetime(&naive))
        })
    }

    pub fn title(&self) -> String {
        let caption = self.post_caption.as_deref().unwrap_or("").trim();
        if caption.is_empty() {
            return "Scheduled post".to_string();
        }
        let mut short: String = caption.chars().take(40).collect();
        if caption.chars().count() > 40 {
            short.push('…');
        }
        short
    }
}

// Scheduler rows use numeric ids in some tables and strings in others.
fn id_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => s,
        Some(serde_json::Value::Number(n)) => n.to_string(),
        _ => String::new(),
    })
}
