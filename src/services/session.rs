use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;

use crate::errors::Result;
use crate::models::app_data::AppData;
use crate::models::fixture::Fixture;
use crate::models::scheduled_post::ScheduledPost;
use crate::services::webhook::WebhookClient;
use crate::services::live::EventSource;

/// The last dataset fetched for the scheduling hub.
#[derive(Debug, Clone, Serialize)]
pub struct Dataset {
    pub posts: Vec<ScheduledPost>,
    pub fixtures: Vec<Fixture>,
    pub players: usize,
    pub assets: usize,
    pub fetched_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct Slot {
    token: Option<String>,
    dataset: Option<Dataset>,
}

/// Process-wide cache of the token that last refreshed and the data it fetched.
///
/// A refresh replaces the whole slot; concurrent refreshes resolve as last
/// write wins.
#[derive(Debug, Default)]
pub struct Session {
    slot: RwLock<Slot>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionStatus {
    pub authenticated: bool,
    pub fetched_at: Option<DateTime<Utc>>,
    pub posts: usize,
    pub fixtures: usize,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch app data and fixtures, then overwrite the cached slot.
    pub async fn refresh(&self, token: &str, client: &WebhookClient) -> Result<Dataset> {
        let (app_data, fixtures) =
            futures::future::join(client.fetch_app_data(), client.fetch_fixtures()).await;
        let app_data: AppData = app_data?;

        // Fixtures come from the match hub when it answers, else from the app data.
        let fixtures = match fixtures {
            Ok(list) if !list.is_empty() => list,
            Ok(_) => app_data.fixtures.clone(),
            Err(e) => {
                tracing::warn!("Fixture fetch failed during refresh: {}", e);
                app_data.fixtures.clone()
            }
        };

        let dataset = Dataset {
            posts: app_data.scheduled_posts,
            fixtures,
            players: app_data.players.len(),
            assets: app_data.assets.len(),
            fetched_at: Utc::now(),
        };

        self.store(token, dataset.clone()).await;
        tracing::info!(
            "Session refreshed: {} posts, {} fixtures",
            dataset.posts.len(),
            dataset.fixtures.len()
        );
        Ok(dataset)
    }

    pub async fn store(&self, token: &str, dataset: Dataset) {
        let mut slot = self.slot.write().await;
        *slot = Slot {
            token: Some(token.to_string()),
            dataset: Some(dataset),
        };
    }

    pub async fn invalidate(&self) {
        *self.slot.write().await = Slot::default();
        tracing::info!("Session invalidated");
    }

    pub async fn dataset(&self) -> Option<Dataset> {
        self.slot.read().await.dataset.clone()
    }

    pub async fn status(&self) -> SessionStatus {
        let slot = self.slot.read().await;
        SessionStatus {
            authenticated: slot.token.is_some(),
            fetched_at: slot.dataset.as_ref().map(|d| d.fetched_at),
            posts: slot.dataset.as_ref().map(|d| d.posts.len()).unwrap_or(0),
            fixtures: slot.dataset.as_ref().map(|d| d.fixtures.len()).unwrap_or(0),
        }
    }
}
