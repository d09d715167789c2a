/**
 * INVENTORY BRIDGE - Pont inventaire CMDB -> orchestrateur
 *
 * RÔLE : Interroge la CMDB (API compatible PuppetDB v3) pour les nœuds et
 * leurs facts, fusionne le tout en un inventaire par hôte, met le résultat
 * en cache pour l'intervalle configuré et le sert en YAML sur HTTP.
 *
 * ARCHITECTURE : UpstreamClient (fetch JSON) + TimedCache (péremption) +
 * InventoryAggregator (fusion) derrière un serveur Axum. Aucune tâche de
 * fond : les rafraîchissements sont déclenchés paresseusement par la
 * première lecture après expiration.
 */

mod cache;
mod config;
mod health;
mod http;
mod inventory;
mod models;
mod upstream;

use crate::health::HealthTracker;
use crate::http::AppState;
use crate::inventory::InventoryAggregator;
use crate::upstream::UpstreamClient;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Charger les variables d'environnement depuis .env (si présent)
    dotenvy::dotenv().ok();

    let cfg = config::load_config().await;
    println!(
        "[bridge] upstream CMDB: {} (cache {}s, timeout {}s)",
        cfg.cmdb_url, cfg.cache_seconds, cfg.upstream_timeout_seconds
    );

    let client = match UpstreamClient::new(
        &cfg.cmdb_url,
        Duration::from_secs(cfg.upstream_timeout_seconds),
    ) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("[bridge] failed to build upstream HTTP client: {e}");
            std::process::exit(1);
        }
    };

    let health_tracker = HealthTracker::new();
    let aggregator = Arc::new(InventoryAggregator::new(
        client,
        Duration::from_secs(cfg.cache_seconds),
        health_tracker.clone(),
    ));

    // fabrique l'état unique pour Axum
    let app_state = AppState {
        aggregator,
        health_tracker,
        cache_ttl_seconds: cfg.cache_seconds,
    };
    let app = http::build_router(app_state);

    let addr: SocketAddr = cfg.bind.parse()?;
    println!("[bridge] listening on http://{addr}");
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
