//! Live match tracking.
//!
//! A single background task decides which fixture is live, keeps that
//! fixture's event list and publishes a [`LiveSnapshot`] through a watch
//! channel. Readers turn the snapshot into a clock display with their own
//! `now`, so the displayed time moves between polls without refetching.

use std::sync::{Arc, Mutex};
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::Serialize;
use tokio::sync::{watch, Notify};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::errors::Result;
use crate::models::fixture::Fixture;
use crate::models::match_event::MatchEvent;
use crate::services::timeline::{self, LogEntry, MatchState, Score};

pub const LIVE_WINDOW_MINUTES: i64 = 120;

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to.
pub struct FixedClock(Mutex<DateTime<Utc>>);

impl FixedClock {
    pub fn new(at: DateTime<Utc>) -> Self {
        FixedClock(Mutex::new(at))
    }

    pub fn set(&self, at: DateTime<Utc>) {
        *self.0.lock().unwrap_or_else(|e| e.into_inner()) = at;
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.0.lock().unwrap_or_else(|e| e.into_inner());
        *now += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.0.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
pub trait EventSource: Send + Sync {
    async fn fetch_events(&self, match_id: &str) -> Result<Vec<MatchEvent>>;
    async fn fetch_fixtures(&self) -> Result<Vec<Fixture>>;
}

pub fn is_live(kickoff: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    now >= kickoff && now <= kickoff + Duration::minutes(LIVE_WINDOW_MINUTES)
}

/// The live fixture: earliest kickoff among those in their window, source order on ties.
pub fn select_live<'a, Tz: TimeZone>(
    fixtures: &'a [Fixture],
    now: DateTime<Utc>,
    tz: &Tz,
) -> Option<(&'a Fixture, DateTime<Utc>)> {
    fixtures
        .iter()
        .filter_map(|f| f.kickoff_in(tz).map(|k| (f, k)))
        .filter(|(_, kickoff)| is_live(*kickoff, now))
        .fold(None, |best, candidate| match best {
            Some((_, k)) if k <= candidate.1 => best,
            _ => Some(candidate),
        })
}

/// Nearest fixture kicking off strictly after `now`.
pub fn next_fixture<'a, Tz: TimeZone>(
    fixtures: &'a [Fixture],
    now: DateTime<Utc>,
    tz: &Tz,
) -> Option<(&'a Fixture, DateTime<Utc>)> {
    fixtures
        .iter()
        .filter_map(|f| f.kickoff_in(tz).map(|k| (f, k)))
        .filter(|(_, kickoff)| *kickoff > now)
        .fold(None, |best, candidate| match best {
            Some((_, k)) if k <= candidate.1 => best,
            _ => Some(candidate),
        })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackedMatch {
    pub fixture: Fixture,
    pub kickoff: DateTime<Utc>,
    pub events: Vec<MatchEvent>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpcomingMatch {
    pub fixture: Fixture,
    pub kickoff: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LiveSnapshot {
    pub live: Option<TrackedMatch>,
    pub next_match: Option<UpcomingMatch>,
    pub refreshed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LiveMatchView {
    pub fixture: Fixture,
    pub kickoff: DateTime<Utc>,
    pub state: MatchState,
    pub score: Score,
    pub log: Vec<LogEntry>,
    pub events: Vec<MatchEvent>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LiveView {
    pub now: DateTime<Utc>,
    pub live: Option<LiveMatchView>,
    pub next_match: Option<UpcomingMatch>,
    pub refreshed_at: Option<DateTime<Utc>>,
}

impl LiveSnapshot {
    /// Derive the clock and log for display at `now`.
    pub fn view(&self, now: DateTime<Utc>) -> LiveView {
        let live = self.live.as_ref().map(|tracked| LiveMatchView {
            fixture: tracked.fixture.clone(),
            kickoff: tracked.kickoff,
            state: timeline::compute_elapsed(&tracked.events, tracked.kickoff, now),
            score: timeline::score(&tracked.events),
            log: timeline::event_log(&tracked.events),
            events: tracked.events.clone(),
        });

        LiveView {
            now,
            live,
            next_match: self.next_match.clone(),
            refreshed_at: self.refreshed_at,
        }
    }
}

/// What request handlers hold: the latest snapshot and a way to ask for a refetch.
#[derive(Clone)]
pub struct LiveHandle {
    snapshot: watch::Receiver<LiveSnapshot>,
    refresh: Arc<Notify>,
}

impl LiveHandle {
    pub fn snapshot(&self) -> LiveSnapshot {
        self.snapshot.borrow().clone()
    }

    /// Ask the poller to run now and refetch the live match's events.
    pub fn request_refresh(&self) {
        self.refresh.notify_one();
    }

    pub async fn changed(&mut self) -> bool {
        self.snapshot.changed().await.is_ok()
    }
}

pub struct LivePoller<Tz: TimeZone> {
    source: Arc<dyn EventSource>,
    clock: Arc<dyn Clock>,
    tz: Tz,
    fixtures: Vec<Fixture>,
    current: Option<TrackedMatch>,
    tx: watch::Sender<LiveSnapshot>,
    refresh: Arc<Notify>,
}

impl<Tz> LivePoller<Tz>
where
    Tz: TimeZone + Send + Sync + 'static,
    Tz::Offset: Send + Sync,
{
    pub fn new(source: Arc<dyn EventSource>, clock: Arc<dyn Clock>, tz: Tz) -> (Self, LiveHandle) {
        let (tx, rx) = watch::channel(LiveSnapshot::default());
        let refresh = Arc::new(Notify::new());
        let poller = LivePoller {
            source,
            clock,
            tz,
            fixtures: Vec::new(),
            current: None,
            tx,
            refresh: refresh.clone(),
        };
        (
            poller,
            LiveHandle {
                snapshot: rx,
                refresh,
            },
        )
    }

    /// One poll: refresh fixtures, pick the live one, fetch events if the pick changed.
    ///
    /// `force` refetches events even when the live match is unchanged.
    pub async fn tick(&mut self, force: bool) -> LiveSnapshot {
        match self.source.fetch_fixtures().await {
            Ok(fixtures) => self.fixtures = fixtures,
            Err(e) => tracing::warn!("Fixture refresh failed, keeping {} known: {}", self.fixtures.len(), e),
        }

        let now = self.clock.now();
        let selected = select_live(&self.fixtures, now, &self.tz).map(|(f, k)| (f.clone(), k));

        self.current = match selected {
            Some((fixture, kickoff)) => {
                let previous = self
                    .current
                    .take()
                    .filter(|t| t.fixture.match_id == fixture.match_id);

                let mut events = match previous {
                    Some(tracked) if !force => tracked.events,
                    _ => {
                        tracing::info!("🔴 Fetching events for live match {}", fixture.match_id);
                        self.source
                            .fetch_events(&fixture.match_id)
                            .await
                            .unwrap_or_else(|e| {
                                tracing::warn!("Event fetch for {} failed: {}", fixture.match_id, e);
                                Vec::new()
                            })
                    }
                };
                events.sort_by_key(|e| e.timestamp);

                Some(TrackedMatch {
                    fixture,
                    kickoff,
                    events,
                })
            }
            None => None,
        };

        let next_match = if self.current.is_none() {
            next_fixture(&self.fixtures, now, &self.tz).map(|(f, k)| UpcomingMatch {
                fixture: f.clone(),
                kickoff: k,
            })
        } else {
            None
        };

        let snapshot = LiveSnapshot {
            live: self.current.clone(),
            next_match,
            refreshed_at: Some(now),
        };
        self.tx.send_replace(snapshot.clone());
        snapshot
    }

    /// Poll once immediately, then every `interval`, until `cancel` fires.
    pub async fn run(mut self, interval: StdDuration, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let refresh = self.refresh.clone();

        tracing::info!("Live poller started ({}s interval)", interval.as_secs());
        loop {
            let force = tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => false,
                _ = refresh.notified() => true,
            };
            self.tick(force).await;
        }
        tracing::info!("Live poller stopped");
    }
}
