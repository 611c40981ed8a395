use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Which column an incident belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Home,
    Away,
}

impl Side {
    /// Records without a `team` land in the home column.
    pub fn from_wire(team: Option<&str>) -> Self {
        match team.map(|t| t.trim().to_ascii_lowercase()) {
            Some(t) if t == "away" => Side::Away,
            _ => Side::Home,
        }
    }
}

// Event record exactly as the workflow engine stores it.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMatchEvent {
    #[serde(default)]
    pub event_id: Option<String>,
    #[serde(default)]
    pub match_id: Option<String>,
    #[serde(default)]
    pub event_type: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub minute: Option<u32>,
    #[serde(default)]
    pub team: Option<String>,
    #[serde(default)]
    pub player_full_name: Option<String>,
    #[serde(default)]
    pub assist_by_full_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventKind {
    MatchStart,
    HalfTime,
    SecondHalfStart,
    MatchEnd,
    Goal {
        minute: u32,
        side: Side,
        scorer: Option<String>,
        assist: Option<String>,
    },
    YellowCard {
        minute: u32,
        side: Side,
        player: Option<String>,
    },
    RedCard {
        minute: u32,
        side: Side,
        player: Option<String>,
    },
    Substitution {
        minute: u32,
        side: Side,
        player_off: Option<String>,
        player_on: Option<String>,
    },
}

impl EventKind {
    pub fn wire_name(&self) -> &'static str {
        match self {
            EventKind::MatchStart => "MATCH_START",
            EventKind::HalfTime => "HALF_TIME",
            EventKind::SecondHalfStart => "SECOND_HALF_START",
            EventKind::MatchEnd => "MATCH_END",
            EventKind::Goal { .. } => "Goal",
            EventKind::YellowCard { .. } => "Yellow Card",
            EventKind::RedCard { .. } => "Red Card",
            EventKind::Substitution { .. } => "Substitution",
        }
    }

    /// Side the event is shown under; control events sit in the home column.
    pub fn side(&self) -> Side {
        match self {
            EventKind::Goal { side, .. }
            | EventKind::YellowCard { side, .. }
            | EventKind::RedCard { side, .. }
            | EventKind::Substitution { side, .. } => *side,
            _ => Side::Home,
        }
    }

    pub fn minute(&self) -> Option<u32> {
        match self {
            EventKind::Goal { minute, .. }
            | EventKind::YellowCard { minute, .. }
            | EventKind::RedCard { minute, .. }
            | EventKind::Substitution { minute, .. } => Some(*minute),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchEvent {
    pub id: String,
    pub match_id: String,
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub kind: EventKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventParseError {
    MissingTimestamp,
    BadTimestamp(String),
    UnknownType(String),
}

impl std::fmt::Display for EventParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventParseError::MissingTimestamp => write!(f, "missing timestamp"),
            EventParseError::BadTimestamp(raw) => write!(f, "unparseable timestamp {:?}", raw),
            EventParseError::UnknownType(raw) => write!(f, "unknown event type {:?}", raw),
        }
    }
}

impl TryFrom<RawMatchEvent> for MatchEvent {
    type Error = EventParseError;

    fn try_from(raw: RawMatchEvent) -> std::result::Result<Self, Self::Error> {
        let stamp = raw
            .timestamp
            .as_deref()
            .ok_or(EventParseError::MissingTimestamp)?;
        let timestamp = parse_instant(stamp)
            .ok_or_else(|| EventParseError::BadTimestamp(stamp.to_string()))?;

        let minute = raw.minute.unwrap_or(1).max(1);
        let side = Side::from_wire(raw.team.as_deref());
        let event_type = raw.event_type.unwrap_or_default();

        let kind = match event_type.trim() {
            "MATCH_START" => EventKind::MatchStart,
            "HALF_TIME" => EventKind::HalfTime,
            "SECOND_HALF_START" => EventKind::SecondHalfStart,
            "MATCH_END" => EventKind::MatchEnd,
            "Goal" => EventKind::Goal {
                minute,
                side,
                scorer: raw.player_full_name,
                assist: raw.assist_by_full_name,
            },
            "Yellow Card" => EventKind::YellowCard {
                minute,
                side,
                player: raw.player_full_name,
            },
            "Red Card" => EventKind::RedCard {
                minute,
                side,
                player: raw.player_full_name,
            },
            "Substitution" => EventKind::Substitution {
                minute,
                side,
                player_off: raw.player_full_name,
                player_on: raw.assist_by_full_name,
            },
            other => return Err(EventParseError::UnknownType(other.to_string())),
        };

        Ok(MatchEvent {
            id: raw.event_id.unwrap_or_default(),
            match_id: raw.match_id.unwrap_or_default(),
            timestamp,
            kind,
        })
    }
}

/// Convert whatever the event source returned, dropping records that cannot be read.
pub fn events_from_values(values: Vec<serde_json::Value>) -> Vec<MatchEvent> {
    values
        .into_iter()
        .filter_map(|value| {
            let raw: RawMatchEvent = match serde_json::from_value(value) {
                Ok(raw) => raw,
                Err(e) => {
                    tracing::warn!("Skipping malformed match event: {}", e);
                    return None;
                }
            };
            let event_id = raw.event_id.clone().unwrap_or_default();
            match MatchEvent::try_from(raw) {
                Ok(event) => Some(event),
                Err(e) => {
                    tracing::warn!("Skipping match event {:?}: {}", event_id, e);
                    None
                }
            }
        })
        .collect()
}

/// RFC 3339, falling back to a naive timestamp read as UTC.
pub fn parse_instant(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| Utc.from_utc_datetime(&naive))
}

// The logger form posts minutes as strings as often as numbers.
fn lenient_u32<'de, D>(deserializer: D) -> std::result::Result<Option<u32>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Some(serde_json::Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}
