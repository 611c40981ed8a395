use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tokio_util::sync::CancellationToken;

use matchday_hub::config::AppConfig;
use matchday_hub::services::live::{Clock, LivePoller, SystemClock};
use matchday_hub::services::webhook::WebhookClient;
use matchday_hub::state::{build_http_client, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let config = AppConfig::from_env()?;
    tracing::info!("✅ Config loaded: {}", config.get_config_info());

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let poll_interval = config.live_poll_interval;
    let club_tz = config.club_tz;

    let http = build_http_client(&config)?;
    let webhooks = WebhookClient::new(http, config.webhooks.clone());
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let (poller, live) = LivePoller::new(Arc::new(webhooks.clone()), clock.clone(), club_tz);
    let cancel = CancellationToken::new();
    let poller_task = tokio::spawn(poller.run(poll_interval, cancel.clone()));

    let app_state = AppState::new(config, webhooks, live, clock);
    let app = matchday_hub::build_router(app_state);

    start_server(app, addr, cancel.clone()).await?;

    cancel.cancel();
    if let Err(e) = poller_task.await {
        tracing::error!("Live poller task failed: {}", e);
    }
    Ok(())
}

async fn start_server(app: Router, addr: SocketAddr, cancel: CancellationToken) -> anyhow::Result<()> {
    tracing::info!("🚀 Server starting on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.map_err(|e| {
        tracing::error!("Failed to bind to {}: {}", addr, e);
        e
    })?;

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for shutdown signal: {}", e);
            }
            tracing::info!("Shutting down");
            cancel.cancel();
        })
        .await?;

    Ok(())
}
