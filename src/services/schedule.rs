//! Calendar view of scheduled posts and fixtures.
//!
//! Posts and fixtures are merged into [`CalendarEvent`]s sorted by when they
//! happen, then grouped by local calendar date for the month, week, day and
//! list views. Day grouping always uses the supplied time zone, so a post at
//! 23:30 UTC can land on the next day for a club east of Greenwich.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc, Weekday};
use serde::{Deserialize, Serialize};

use crate::models::fixture::Fixture;
use crate::models::scheduled_post::ScheduledPost;

/// Events shown inline in a month cell before collapsing into "N more".
pub const INLINE_LIMIT: usize = 2;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EventFilter {
    #[default]
    All,
    Posts,
    Matches,
}

impl EventFilter {
    fn admits(&self, kind: EventType) -> bool {
        match self {
            EventFilter::All => true,
            EventFilter::Posts => kind == EventType::Post,
            EventFilter::Matches => kind == EventType::Match,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    Post,
    Match,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum EventOrigin {
    Post(ScheduledPost),
    Match(Fixture),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalendarEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: EventType,
    pub title: String,
    pub occurs_at: DateTime<Utc>,
    pub source: EventOrigin,
}

impl CalendarEvent {
    pub fn local_date<Tz: TimeZone>(&self, tz: &Tz) -> NaiveDate {
        self.occurs_at.with_timezone(tz).date_naive()
    }
}

/// Merge posts and fixtures into one list ordered by `occurs_at`.
///
/// The sort is stable, so equal instants keep input order with posts ahead of
/// fixtures. Records with no readable date are left out.
pub fn aggregate<Tz: TimeZone>(
    posts: &[ScheduledPost],
    fixtures: &[Fixture],
    filter: EventFilter,
    tz: &Tz,
) -> Vec<CalendarEvent> {
    let mut events = Vec::with_capacity(posts.len() + fixtures.len());

    if filter.admits(EventType::Post) {
        for post in posts {
            match post.scheduled_at() {
                Some(occurs_at) => events.push(CalendarEvent {
                    id: post.id.clone(),
                    kind: EventType::Post,
                    title: post.title(),
                    occurs_at,
                    source: EventOrigin::Post(post.clone()),
                }),
                None => tracing::warn!("Scheduled post {:?} has no readable time; skipped", post.id),
            }
        }
    }

    if filter.admits(EventType::Match) {
        for fixture in fixtures {
            match fixture.kickoff_in(tz) {
                Some(occurs_at) => events.push(CalendarEvent {
                    id: fixture.match_id.clone(),
                    kind: EventType::Match,
                    title: fixture.title(),
                    occurs_at,
                    source: EventOrigin::Match(fixture.clone()),
                }),
                None => tracing::warn!("Fixture {:?} has no readable date; skipped", fixture.match_id),
            }
        }
    }

    events.sort_by_key(|e| e.occurs_at);
    events
}

pub fn bucket_by_month<Tz: TimeZone>(
    events: &[CalendarEvent],
    year: i32,
    month: u32,
    tz: &Tz,
) -> BTreeMap<u32, Vec<CalendarEvent>> {
    let mut buckets: BTreeMap<u32, Vec<CalendarEvent>> = BTreeMap::new();
    for event in events {
        let date = event.local_date(tz);
        if date.year() == year && date.month() == month {
            buckets.entry(date.day()).or_default().push(event.clone());
        }
    }
    buckets
}

/// Monday of the week containing `anchor`.
pub fn week_start(anchor: NaiveDate) -> NaiveDate {
    let back = match anchor.weekday() {
        Weekday::Sun => 6,
        other => other.num_days_from_monday() as i64,
    };
    anchor - Duration::days(back)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekDay {
    pub date: NaiveDate,
    pub events: Vec<CalendarEvent>,
}

pub fn bucket_by_week<Tz: TimeZone>(
    events: &[CalendarEvent],
    anchor: NaiveDate,
    tz: &Tz,
) -> [WeekDay; 7] {
    let monday = week_start(anchor);
    std::array::from_fn(|offset| {
        let date = monday + Duration::days(offset as i64);
        WeekDay {
            date,
            events: events_on(events, date, tz),
        }
    })
}

/// Every event on `date`, uncapped.
pub fn events_on<Tz: TimeZone>(
    events: &[CalendarEvent],
    date: NaiveDate,
    tz: &Tz,
) -> Vec<CalendarEvent> {
    events
        .iter()
        .filter(|e| e.local_date(tz) == date)
        .cloned()
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayCell {
    pub date: NaiveDate,
    pub in_month: bool,
    pub inline: Vec<CalendarEvent>,
    pub more: usize,
    pub more_label: Option<String>,
    pub total: usize,
}

impl DayCell {
    pub fn new(date: NaiveDate, in_month: bool, events: Vec<CalendarEvent>) -> Self {
        let total = events.len();
        let more = total.saturating_sub(INLINE_LIMIT);
        let inline = events.into_iter().take(INLINE_LIMIT).collect();
        DayCell {
            date,
            in_month,
            inline,
            more,
            more_label: (more > 0).then(|| format!("{} more", more)),
            total,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthGrid {
    pub year: i32,
    pub month: u32,
    pub weeks: Vec<[DayCell; 7]>,
}

/// Monday-aligned weeks covering the whole month, padded with adjacent days.
pub fn month_grid<Tz: TimeZone>(
    events: &[CalendarEvent],
    year: i32,
    month: u32,
    tz: &Tz,
) -> Option<MonthGrid> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let last = last_day_of_month(first)?;

    let mut by_date: BTreeMap<NaiveDate, Vec<CalendarEvent>> = BTreeMap::new();
    for event in events {
        by_date.entry(event.local_date(tz)).or_default().push(event.clone());
    }

    let mut weeks = Vec::new();
    let mut monday = week_start(first);
    while monday <= last {
        let week: [DayCell; 7] = std::array::from_fn(|offset| {
            let date = monday + Duration::days(offset as i64);
            let day_events = by_date.get(&date).cloned().unwrap_or_default();
            DayCell::new(date, date.month() == month, day_events)
        });
        weeks.push(week);
        monday += Duration::days(7);
    }

    Some(MonthGrid { year, month, weeks })
}

fn last_day_of_month(first: NaiveDate) -> Option<NaiveDate> {
    let (y, m) = if first.month() == 12 {
        (first.year() + 1, 1)
    } else {
        (first.year(), first.month() + 1)
    };
    NaiveDate::from_ymd_opt(y, m, 1)?.pred_opt()
}
