use chrono::{DateTime, Duration, LocalResult, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

// Fixture record as returned by the match hub workflow.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fixture {
    #[serde(default, alias = "match_id")]
    pub match_id: String,

    #[serde(default)]
    pub match_date: Option<String>,

    #[serde(default)]
    pub match_time: Option<String>,

    #[serde(default)]
    pub home_or_away: Option<String>,

    #[serde(default)]
    pub opponent: Option<String>,

    #[serde(default)]
    pub venue: Option<String>,

    #[serde(default)]
    pub competition: Option<String>,

    #[serde(default)]
    pub team: Option<String>, // "first-team", "development"

    #[serde(default)]
    pub squad: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub home_score: Option<serde_json::Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub away_score: Option<serde_json::Value>,

    #[serde(default)]
    pub status: Option<String>, // "archived" or anything else
}

impl Fixture {
    pub fn date(&self) -> Option<NaiveDate> {
        let raw = self.match_date.as_deref()?.trim();
        // Some rows carry a full timestamp in matchDate.
        let day = raw.get(..10).unwrap_or(raw);
        NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
    }

    /// Time of day, midnight when absent or unreadable.
    pub fn time_of_day(&self) -> NaiveTime {
        self.match_time
            .as_deref()
            .map(str::trim)
            .and_then(|raw| {
                NaiveTime::parse_from_str(raw, "%H:%M:%S")
                    .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
                    .ok()
            })
            .unwrap_or(NaiveTime::MIN)
    }

    /// Scheduled kickoff with the date and time read as wall-clock time in `tz`.
    pub fn kickoff_in<Tz: TimeZone>(&self, tz: &Tz) -> Option<DateTime<Utc>> {
        let naive = self.date()?.and_time(self.time_of_day());
        let local = match tz.from_local_datetime(&naive) {
            LocalResult::Single(dt) => dt,
            LocalResult::Ambiguous(earliest, _) => earliest,
            // Wall time fell into a DST gap.
            LocalResult::None => tz
                .from_local_datetime(&(naive + Duration::hours(1)))
                .earliest()?,
        };
        Some(local.with_timezone(&Utc))
    }

    pub fn squad_members(&self) -> Vec<&str> {
        self.squad
            .as_deref()
            .map(|s| s.split(',').map(str::trim).filter(|n| !n.is_empty()).collect())
            .unwrap_or_default()
    }

    /// "Opponent (H)" style label used on calendar cells.
    pub fn title(&self) -> String {
        let opponent = self.opponent.as_deref().unwrap_or("TBC");
        match self.home_or_away.as_deref().map(str::to_ascii_lowercase) {
            Some(h) if h.starts_with('h') => format!("{} (H)", opponent),
            Some(a) if a.starts_with('a') => format!("{} (A)", opponent),
            _ => opponent.to_string(),
        }
    }
}
