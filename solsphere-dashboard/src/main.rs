/**
 * SOLSPHERE DASHBOARD - Point d'entrée du service de vues
 *
 * RÔLE : Bootstrap config, client backend, store partagé, boucles de
 * rafraîchissement puis API HTTP.
 */

use anyhow::{Context, Result};
use solsphere_core::FleetStore;
use solsphere_dashboard::{
    build_router, load_config, refresh_all, spawn_refresh_loops, AppState, BackendClient, FleetLoader,
    RefreshTracker,
};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // .env optionnel
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("solsphere_dashboard=info,solsphere_core=info")),
        )
        .init();

    let config = load_config().await;
    info!(placeholder = config.placeholder_on_failure, listen = %config.listen, "configuration loaded");

    let client = BackendClient::new(&config.api_base_url, config.request_timeout())
        .context("failed to build backend client")?;
    let loader = FleetLoader::new(client, config.placeholder_on_failure);
    info!(backend = %loader.client().base_url(), "backend client ready");

    let store = FleetStore::new();
    let tracker = RefreshTracker::new();

    // premier chargement avant d'ouvrir l'API
    refresh_all(&loader, &store, &tracker).await;
    let _loops = spawn_refresh_loops(loader, store.clone(), tracker.clone(), &config.refresh);

    let app = build_router(AppState::new(store, tracker));

    let listener = TcpListener::bind(config.listen)
        .await
        .with_context(|| format!("failed to bind {}", config.listen))?;
    info!("listening on http://{}", config.listen);
    axum::serve(listener, app).await.context("http server stopped")?;
    Ok(())
}
