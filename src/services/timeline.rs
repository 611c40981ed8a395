//! Match clock reconstruction.
//!
//! Everything here is a pure function of the event list and `now`; nothing is
//! carried over between polls.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::match_event::{EventKind, MatchEvent, Side};

pub const HALF_SECONDS: i64 = 45 * 60;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchState {
    pub minute: u32,
    pub display: String,
    pub is_half_time: bool,
    pub has_second_half_started: bool,
    pub has_ended: bool,
}

fn first_of(events: &[MatchEvent], wanted: fn(&EventKind) -> bool) -> Option<DateTime<Utc>> {
    events
        .iter()
        .filter(|e| wanted(&e.kind))
        .map(|e| e.timestamp)
        .min()
}

pub fn compute_elapsed(
    events: &[MatchEvent],
    scheduled_kickoff: DateTime<Utc>,
    now: DateTime<Utc>,
) -> MatchState {
    if events.iter().any(|e| e.kind == EventKind::MatchEnd) {
        return MatchState {
            minute: 90,
            display: "Finished".to_string(),
            is_half_time: false,
            has_second_half_started: true,
            has_ended: true,
        };
    }

    let second_half = first_of(events, |k| *k == EventKind::SecondHalfStart);

    if second_half.is_none() && events.iter().any(|e| e.kind == EventKind::HalfTime) {
        return MatchState {
            minute: 45,
            display: "HT".to_string(),
            is_half_time: true,
            has_second_half_started: false,
            has_ended: false,
        };
    }

    let kickoff = first_of(events, |k| *k == EventKind::MatchStart).unwrap_or(scheduled_kickoff);

    let elapsed = match second_half {
        // The clock sits at 45:00 through the break and resumes at the restart.
        Some(restart) if now >= restart => HALF_SECONDS + (now - restart).num_seconds(),
        _ => (now - kickoff).num_seconds().max(0),
    };

    MatchState {
        minute: (elapsed / 60) as u32,
        display: format_clock(elapsed),
        is_half_time: false,
        has_second_half_started: matches!(second_half, Some(restart) if now >= restart),
        has_ended: false,
    }
}

pub fn format_clock(elapsed_seconds: i64) -> String {
    let secs = elapsed_seconds.max(0);
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// One row of the running incident log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogEntry {
    pub event_id: String,
    pub minute: u32,
    pub side: Side,
    pub label: String,
    pub timestamp: DateTime<Utc>,
}

fn describe(kind: &EventKind) -> Option<String> {
    let name = |n: &Option<String>| n.clone().unwrap_or_else(|| "Unknown".to_string());
    match kind {
        EventKind::MatchStart
        | EventKind::HalfTime
        | EventKind::SecondHalfStart
        | EventKind::MatchEnd => None,
        EventKind::Goal { scorer, assist, .. } => Some(match assist {
            Some(a) if !a.trim().is_empty() => format!("Goal: {} (assist {})", name(scorer), a),
            _ => format!("Goal: {}", name(scorer)),
        }),
        EventKind::YellowCard { player, .. } => Some(format!("Yellow card: {}", name(player))),
        EventKind::RedCard { player, .. } => Some(format!("Red card: {}", name(player))),
        EventKind::Substitution {
            player_off,
            player_on,
            ..
        } => Some(format!(
            "Substitution: {} off, {} on",
            name(player_off),
            name(player_on)
        )),
    }
}

/// Incident events in ascending timestamp order.
pub fn event_log(events: &[MatchEvent]) -> Vec<LogEntry> {
    let mut entries: Vec<LogEntry> = events
        .iter()
        .filter_map(|e| {
            let label = describe(&e.kind)?;
            Some(LogEntry {
                event_id: e.id.clone(),
                minute: e.kind.minute().unwrap_or(1),
                side: e.kind.side(),
                label,
                timestamp: e.timestamp,
            })
        })
        .collect();
    entries.sort_by_key(|entry| entry.timestamp);
    entries
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Score {
    pub home: u32,
    pub away: u32,
}

pub fn score(events: &[MatchEvent]) -> Score {
    events.iter().fold(Score::default(), |mut acc, e| {
        if let EventKind::Goal { side, .. } = e.kind {
            match side {
                Side::Home => acc.home += 1,
                Side::Away => acc.away += 1,
            }
        }
        acc
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use pretty_assertions::assert_eq;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 8, 16, 15, 0, 0).unwrap()
    }

    fn control(kind: EventKind, at: DateTime<Utc>) -> MatchEvent {
        MatchEvent {
            id: format!("{}-{}", kind.wire_name(), at.timestamp()),
            match_id: "m1".into(),
            timestamp: at,
            kind,
        }
    }

    fn goal(side: Side, minute: u32, at: DateTime<Utc>) -> MatchEvent {
        control(
            EventKind::Goal {
                minute,
                side,
                scorer: Some("Striker".into()),
                assist: None,
            },
            at,
        )
    }

    #[test]
    fn match_end_is_absorbing() {
        let events = vec![
            control(EventKind::MatchStart, t0()),
            control(EventKind::MatchEnd, t0() + Duration::minutes(95)),
            goal(Side::Home, 96, t0() + Duration::minutes(97)),
            control(EventKind::SecondHalfStart, t0() + Duration::minutes(99)),
        ];
        let state = compute_elapsed(&events, t0(), t0() + Duration::hours(5));
        assert_eq!(state.display, "Finished");
        assert_eq!(state.minute, 90);
        assert!(state.has_ended);
    }

    #[test]
    fn half_time_freezes_the_clock() {
        let events = vec![
            control(EventKind::MatchStart, t0()),
            control(EventKind::HalfTime, t0() + Duration::minutes(47)),
        ];
        for later in [48, 60, 200] {
            let state = compute_elapsed(&events, t0(), t0() + Duration::minutes(later));
            assert_eq!(state.display, "HT");
            assert_eq!(state.minute, 45);
            assert!(state.is_half_time);
        }
    }

    #[test]
    fn second_half_resumes_from_45() {
        let restart = t0() + Duration::minutes(62);
        let events = vec![
            control(EventKind::MatchStart, t0()),
            control(EventKind::HalfTime, t0() + Duration::minutes(46)),
            control(EventKind::SecondHalfStart, restart),
        ];
        let state = compute_elapsed(&events, t0(), restart + Duration::seconds(600));
        assert_eq!(state.display, "55:00");
        assert_eq!(state.minute, 55);
        assert!(state.has_second_half_started);
        assert!(!state.is_half_time);
    }

    #[test]
    fn second_half_flag_waits_for_the_restart() {
        let restart = t0() + Duration::minutes(62);
        let events = vec![
            control(EventKind::MatchStart, t0()),
            control(EventKind::HalfTime, t0() + Duration::minutes(46)),
            control(EventKind::SecondHalfStart, restart),
        ];

        let before = compute_elapsed(&events, t0(), restart - Duration::seconds(30));
        assert!(!before.has_second_half_started);

        let after = compute_elapsed(&events, t0(), restart);
        assert!(after.has_second_half_started);
        assert_eq!(after.display, "45:00");
    }

    #[test]
    fn no_events_counts_from_scheduled_kickoff() {
        let state = compute_elapsed(&[], t0(), t0() + Duration::seconds(65));
        assert_eq!(state.display, "01:05");
        assert_eq!(state.minute, 1);
    }

    #[test]
    fn clock_before_kickoff_is_zero() {
        let state = compute_elapsed(&[], t0(), t0() - Duration::minutes(10));
        assert_eq!(state.display, "00:00");
    }

    #[test]
    fn logged_start_overrides_scheduled_kickoff() {
        let events = vec![control(EventKind::MatchStart, t0() + Duration::minutes(4))];
        let state = compute_elapsed(&events, t0(), t0() + Duration::minutes(14));
        assert_eq!(state.display, "10:00");
    }

    #[test]
    fn minutes_are_not_capped_at_59() {
        assert_eq!(format_clock(100 * 60 + 7), "100:07");
    }

    #[test]
    fn log_and_score_follow_timestamps() {
        let events = vec![
            goal(Side::Away, 30, t0() + Duration::minutes(31)),
            control(EventKind::MatchStart, t0()),
            goal(Side::Home, 12, t0() + Duration::minutes(12)),
        ];

        let log = event_log(&events);
        assert_eq!(log.len(), 2);
        assert_eq!(log[0].minute, 12);
        assert_eq!(log[1].side, Side::Away);
        assert_eq!(score(&events), Score { home: 1, away: 1 });
    }
}
