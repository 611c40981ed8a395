use std::sync::Arc;

use reqwest::Client;

use crate::config::AppConfig;
use crate::errors::{AppError, Result};
use crate::services::live::{Clock, LiveHandle};
use crate::services::session::Session;
use crate::services::webhook::WebhookClient;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub webhooks: WebhookClient,
    pub session: Arc<Session>,
    pub live: LiveHandle,
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        webhooks: WebhookClient,
        live: LiveHandle,
        clock: Arc<dyn Clock>,
    ) -> Self {
        AppState {
            config: Arc::new(config),
            webhooks,
            session: Arc::new(Session::new()),
            live,
            clock,
        }
    }
}

pub fn build_http_client(config: &AppConfig) -> Result<Client> {
    Client::builder()
        .timeout(config.http_timeout)
        .build()
        .map_err(|e| AppError::configuration(format!("HTTP client: {}", e)))
}
