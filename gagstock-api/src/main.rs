//! Grow A Garden Stock Tracker API Server
//!
//! Serves the read-only stock endpoints and, when a bot token is configured,
//! runs the Discord bot that drives per-user tracking sessions.

mod routes;

use axum::{
    http::{header, Method},
    Router,
};
use gagstock_providers::{ProviderEndpoints, UpstreamClient};
use gagstock_services::{SessionRegistry, TrackerConfig};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub upstream: Arc<UpstreamClient>,
    pub database_path: Arc<PathBuf>,
    /// Tracking sessions, present only while the Discord bot runs
    pub registry: Option<Arc<SessionRegistry>>,
}

/// Build the HTTP router for the given state
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .nest("/api", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env.local file
    if let Err(e) = dotenvy::from_filename(".env.local") {
        if !matches!(e, dotenvy::Error::Io(_)) {
            eprintln!("Warning: Failed to load .env.local: {}", e);
        }
    }

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                EnvFilter::new("info,gagstock_api=debug,gagstock_services=debug")
            }),
        )
        .init();

    info!("Starting Grow A Garden Stock Tracker");

    let config = TrackerConfig::from_env()?;
    let endpoints = ProviderEndpoints::from_env()?;
    let upstream = Arc::new(UpstreamClient::from_env());
    info!("Using upstream stock site at {}", upstream.base_url());

    let database_path =
        std::env::var("DATABASE_PATH").unwrap_or_else(|_| "data/Database.json".to_string());
    info!("Serving stock database from: {}", database_path);

    let registry = start_discord_bot(&config, endpoints);

    let state = AppState {
        upstream,
        database_path: Arc::new(PathBuf::from(database_path)),
        registry: registry.clone(),
    };
    let app = build_router(state);

    let port = std::env::var("SERVER_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(3001);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(registry) = registry {
        registry.shutdown();
    }
    info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

#[cfg(feature = "discord")]
fn start_discord_bot(
    config: &TrackerConfig,
    endpoints: ProviderEndpoints,
) -> Option<Arc<SessionRegistry>> {
    use gagstock_providers::discord::DiscordClient;
    use gagstock_providers::StockFetcher;
    use gagstock_services::discord::{DiscordBot, DiscordNotifier};
    use gagstock_services::{CommandHandler, TokioScheduler, TrackerContext};

    let Some(token) = config.discord_token.clone() else {
        info!("Discord bot not configured (DISCORD_BOT_TOKEN not set)");
        return None;
    };

    let client = DiscordClient::new(token.clone());
    let context = TrackerContext::new(
        Arc::new(StockFetcher::new(endpoints)),
        Arc::new(DiscordNotifier::new(client.clone())),
    )
    .with_zone(config.zone);
    let registry = Arc::new(SessionRegistry::new(
        context,
        Arc::new(TokioScheduler),
        config.tick_interval,
    ));

    let commands = CommandHandler::new(Arc::clone(&registry), config.command_prefix.clone());
    let bot = Arc::new(DiscordBot::new(token, client, commands));
    tokio::spawn(async move {
        bot.start().await;
    });

    info!(
        "Discord bot enabled, polling every {:?}",
        config.tick_interval
    );
    Some(registry)
}

#[cfg(not(feature = "discord"))]
fn start_discord_bot(
    config: &TrackerConfig,
    _endpoints: ProviderEndpoints,
) -> Option<Arc<SessionRegistry>> {
    if config.discord_token.is_some() {
        warn!("DISCORD_BOT_TOKEN is set but this build has no Discord support");
    }
    None
}
