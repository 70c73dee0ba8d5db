//! ts-activity - TeamSpeak presence bridge

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use ts_activity::bridge::Bridge;
use ts_activity::config::Config;
use ts_activity::dispatch::EffectDispatcher;
use ts_activity::query::{QueryClient, QueryResolver, ServerBanner, spawn_keepalive};
use ts_activity::roster::Roster;
use ts_activity::webhook::DiscordWebhook;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    // Load configuration: optional TOML path, then TS_* environment
    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = Config::load(config_path.as_deref()).map_err(|e| {
        error!(path = ?config_path, error = %e, "Failed to load config");
        e
    })?;

    // Validation already rejected bad templates, so this only distinguishes on/off
    let template = config.banner.template()?;
    let slots = config.banner.slot_table();

    info!(
        address = %config.query.address,
        server_id = config.query.server_id,
        banner = template.is_some(),
        slots = slots.len(),
        on_resolve_failure = ?config.query.on_resolve_failure,
        "Starting ts-activity"
    );

    // Metrics endpoint
    if let Some(port) = config.metrics.enabled_port() {
        ts_activity::metrics::init();
        let listener = TcpListener::bind(SocketAddr::from(([0, 0, 0, 0], port)))
            .await
            .with_context(|| format!("failed to bind metrics endpoint on port {port}"))?;
        tokio::spawn(async move {
            if let Err(e) = ts_activity::http::serve_metrics(listener).await {
                error!(error = %e, "Metrics endpoint stopped");
            }
        });
    }

    // Connect and authenticate
    let (client, mut notifications) =
        QueryClient::connect(&config.query.address, config.query.command_timeout())
            .await
            .context("failed to connect to ServerQuery")?;
    let client = Arc::new(client);

    client
        .login(&config.query.user, &config.query.password)
        .await
        .context("ServerQuery login failed")?;
    client
        .use_server(config.query.server_id)
        .await
        .with_context(|| format!("failed to select virtual server {}", config.query.server_id))?;

    let me = client.whoami().await.context("whoami failed")?;
    info!(
        client_id = me.get("client_id").unwrap_or("?"),
        nickname = me.get("client_nickname").unwrap_or("?"),
        "Logged in"
    );

    client
        .register_server_events()
        .await
        .context("failed to register for server events")?;
    let _keepalive = spawn_keepalive(client.clone(), config.query.keepalive_interval());

    // Assemble the bridge
    let resolver = QueryResolver::new(client.clone(), client.command_timeout());
    let roster = Roster::new(resolver, config.query.on_resolve_failure);
    let notifier = DiscordWebhook::new(
        config.discord.webhook.clone(),
        config.discord.username.clone(),
        config.discord.avatar.clone(),
    );
    let banner = template.map(|t| (t, ServerBanner::new(client.clone())));
    let mut bridge = Bridge::new(roster, slots, EffectDispatcher::new(notifier, banner));

    let snapshot = client.client_list().await.context("clientlist failed")?;
    bridge.bootstrap(snapshot).await?;

    info!("Listening for client events");
    if let Err(e) = bridge.run(&mut notifications).await {
        error!(error = %e, "Bridge stopped");
        return Err(e.into());
    }

    Ok(())
}
