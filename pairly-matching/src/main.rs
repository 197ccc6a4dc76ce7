use std::sync::Arc;
use std::time::Duration;

use pairly_matching::config::AppConfig;
use pairly_matching::notify::{LogTransport, Transport};
use pairly_matching::services::Matchmaker;
use pairly_matching::{routes, store, AppState};
use pairly_shared::clients::db::create_pool;
use pairly_shared::clients::telegram::TelegramClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    pairly_shared::middleware::init_tracing("pairly-matching");

    let config = AppConfig::load()?;
    let port = config.port;

    // Database pool and schema
    let pool = create_pool(&config.database_url, config.db_pool_size)?;
    store::migrate(&pool)?;

    // Messaging transport
    let transport: Arc<dyn Transport> = match config.telegram_bot_token.as_deref() {
        Some(token) => {
            tracing::info!(api_url = %config.telegram_api_url, "using telegram transport");
            Arc::new(TelegramClient::new(&config.telegram_api_url, token))
        }
        None => {
            tracing::warn!("no bot token configured, notifications are only logged");
            Arc::new(LogTransport)
        }
    };

    // Prometheus metrics
    let metrics_handle = pairly_shared::middleware::init_metrics()?;
    pairly_matching::services::describe_metrics();

    let state = Arc::new(AppState {
        matchmaker: Matchmaker::new(pool, transport, config.matching()),
        metrics_handle: Some(metrics_handle),
        config,
    });

    // Stale session sweeper
    let sweep_state = state.clone();
    let sweep_every = Duration::from_secs(state.config.session_sweep_interval_secs.max(1));
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(sweep_every);
        loop {
            interval.tick().await;
            if let Err(e) = sweep_state.matchmaker.expire_stale_sessions(store::now()) {
                tracing::error!(error = %e, "session sweep failed");
            }
        }
    });

    let app = routes::build_router(state);

    let addr = format!("0.0.0.0:{port}");
    tracing::info!(addr = %addr, "pairly-matching starting");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
