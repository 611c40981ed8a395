// config.rs
use std::env;
use std::time::Duration;

use chrono::{FixedOffset, Offset, Utc};

use crate::errors::{AppError, Result};

/// Each proxied area forwards to exactly one external workflow URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Matchday,
    Squad,
    Result,
    UpNext,
    Custom,
    Assets,
    Fixtures,
    LiveEvents,
    Scheduler,
    AppData,
}

impl Endpoint {
    pub const ALL: [Endpoint; 10] = [
        Endpoint::Matchday,
        Endpoint::Squad,
        Endpoint::Result,
        Endpoint::UpNext,
        Endpoint::Custom,
        Endpoint::Assets,
        Endpoint::Fixtures,
        Endpoint::LiveEvents,
        Endpoint::Scheduler,
        Endpoint::AppData,
    ];

    pub fn env_var(&self) -> &'static str {
        match self {
            Endpoint::Matchday => "MATCHDAY_WEBHOOK_URL",
            Endpoint::Squad => "SQUAD_WEBHOOK_URL",
            Endpoint::Result => "RESULT_WEBHOOK_URL",
            Endpoint::UpNext => "UPNEXT_WEBHOOK_URL",
            Endpoint::Custom => "CUSTOM_WEBHOOK_URL",
            Endpoint::Assets => "ASSETS_WEBHOOK_URL",
            Endpoint::Fixtures => "FIXTURES_WEBHOOK_URL",
            Endpoint::LiveEvents => "LIVE_EVENTS_WEBHOOK_URL",
            Endpoint::Scheduler => "SCHEDULER_WEBHOOK_URL",
            Endpoint::AppData => "APP_DATA_WEBHOOK_URL",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct WebhookUrls {
    pub matchday: Option<String>,
    pub squad: Option<String>,
    pub result: Option<String>,
    pub up_next: Option<String>,
    pub custom: Option<String>,
    pub assets: Option<String>,
    pub fixtures: Option<String>,
    pub live_events: Option<String>,
    pub scheduler: Option<String>,
    pub app_data: Option<String>,
}

impl WebhookUrls {
    fn slot(&mut self, endpoint: Endpoint) -> &mut Option<String> {
        match endpoint {
            Endpoint::Matchday => &mut self.matchday,
            Endpoint::Squad => &mut self.squad,
            Endpoint::Result => &mut self.result,
            Endpoint::UpNext => &mut self.up_next,
            Endpoint::Custom => &mut self.custom,
            Endpoint::Assets => &mut self.assets,
            Endpoint::Fixtures => &mut self.fixtures,
            Endpoint::LiveEvents => &mut self.live_events,
            Endpoint::Scheduler => &mut self.scheduler,
            Endpoint::AppData => &mut self.app_data,
        }
    }

    pub fn get(&self, endpoint: Endpoint) -> Option<&str> {
        let url = match endpoint {
            Endpoint::Matchday => &self.matchday,
            Endpoint::Squad => &self.squad,
            Endpoint::Result => &self.result,
            Endpoint::UpNext => &self.up_next,
            Endpoint::Custom => &self.custom,
            Endpoint::Assets => &self.assets,
            Endpoint::Fixtures => &self.fixtures,
            Endpoint::LiveEvents => &self.live_events,
            Endpoint::Scheduler => &self.scheduler,
            Endpoint::AppData => &self.app_data,
        };
        url.as_deref()
    }

    pub fn set(&mut self, endpoint: Endpoint, url: impl Into<String>) {
        *self.slot(endpoint) = Some(url.into());
    }

    /// Resolve the URL for `endpoint`, failing before any network call when unset.
    pub fn require(&self, endpoint: Endpoint) -> Result<&str> {
        self.get(endpoint).ok_or_else(|| {
            AppError::configuration(format!("{} is not set", endpoint.env_var()))
        })
    }

    fn from_env() -> Self {
        let mut urls = WebhookUrls::default();
        for endpoint in Endpoint::ALL {
            if let Some(url) = non_empty_var(endpoint.env_var()) {
                urls.set(endpoint, url);
            }
        }
        urls
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub auth_secret: Option<String>,
    pub webhooks: WebhookUrls,
    pub live_poll_interval: Duration,
    pub http_timeout: Duration,
    /// Offset used to read fixture wall-clock times and to group calendar days.
    pub club_tz: FixedOffset,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            host: "0.0.0.0".to_string(),
            port: 10000,
            auth_secret: None,
            webhooks: WebhookUrls::default(),
            live_poll_interval: Duration::from_secs(30),
            http_timeout: Duration::from_secs(60),
            club_tz: Utc.fix(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_env_only()
    }

    /// Read configuration from the process environment without loading `.env`.
    pub fn from_env_only() -> Result<Self> {
        let defaults = AppConfig::default();

        let port = match non_empty_var("PORT") {
            Some(raw) => raw.parse::<u16>()?,
            None => defaults.port,
        };

        let live_poll_secs = match non_empty_var("LIVE_POLL_SECS") {
            Some(raw) => raw.parse::<u64>()?.max(5),
            None => defaults.live_poll_interval.as_secs(),
        };

        let http_timeout_secs = match non_empty_var("APP_HTTP_TIMEOUT_SECS") {
            Some(raw) => raw.parse::<u64>()?.max(1),
            None => defaults.http_timeout.as_secs(),
        };

        let club_tz = match non_empty_var("CLUB_TZ") {
            Some(raw) => parse_club_tz(&raw)?,
            None => defaults.club_tz,
        };

        let config = AppConfig {
            host: non_empty_var("HOST").unwrap_or(defaults.host),
            port,
            auth_secret: non_empty_var("APP_AUTH_SECRET"),
            webhooks: WebhookUrls::from_env(),
            live_poll_interval: Duration::from_secs(live_poll_secs),
            http_timeout: Duration::from_secs(http_timeout_secs),
            club_tz,
        };

        if config.auth_secret.is_none() {
            tracing::warn!("APP_AUTH_SECRET is not set; every protected route will answer 500");
        }
        for endpoint in Endpoint::ALL {
            if config.webhooks.get(endpoint).is_none() {
                tracing::warn!("{} is not set", endpoint.env_var());
            }
        }

        Ok(config)
    }

    pub fn require_secret(&self) -> Result<&str> {
        self.auth_secret
            .as_deref()
            .ok_or_else(|| AppError::configuration("APP_AUTH_SECRET is not set"))
    }

    pub fn get_config_info(&self) -> serde_json::Value {
        let webhooks: serde_json::Map<String, serde_json::Value> = Endpoint::ALL
            .iter()
            .map(|e| (e.env_var().to_string(), self.webhooks.get(*e).is_some().into()))
            .collect();

        serde_json::json!({
            "host": self.host,
            "port": self.port,
            "auth_secret_set": self.auth_secret.is_some(),
            "webhooks": webhooks,
            "live_poll_secs": self.live_poll_interval.as_secs(),
            "club_tz": self.club_tz.to_string(),
        })
    }
}

/// `UTC`, `Z` or a signed offset such as `+01:00`.
pub fn parse_club_tz(raw: &str) -> Result<FixedOffset> {
    match raw.trim() {
        "UTC" | "utc" | "Z" => Ok(Utc.fix()),
        offset => Ok(offset.parse::<FixedOffset>()?),
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}
