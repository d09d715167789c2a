/**
 * API HTTP BRIDGE - Frontière servie du bridge inventaire
 *
 * RÔLE : Expose l'inventaire fusionné à l'orchestrateur.
 *
 * ROUTES :
 * - GET /              -> snapshot courant sérialisé en YAML (application/yaml)
 * - GET /health        -> liveness simple
 * - GET /system/health -> état opérationnel JSON (uptime, compteurs, erreurs)
 *
 * ERREURS : un échec d'agrégation est rendu en 502 (l'upstream est en cause),
 * enregistré sur le tracker et loggé ; le snapshot précédent reste en cache.
 */

use crate::health::{BridgeHealth, HealthTracker};
use crate::inventory::InventoryAggregator;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use std::sync::Arc;
use std::time::Instant;

#[derive(Clone)]
pub struct AppState {
    pub aggregator: Arc<InventoryAggregator>,
    pub health_tracker: HealthTracker,
    pub cache_ttl_seconds: u64,
}

pub fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(get_inventory))
        .route("/health", get(|| async { "ok" }))
        .route("/system/health", get(get_system_health))
        .with_state(app_state)
}

// GET / (inventaire YAML pour l'orchestrateur)
async fn get_inventory(State(app): State<AppState>) -> Response {
    match app.aggregator.snapshot(Instant::now()).await {
        Ok(snapshot) => match serde_yaml::to_string(&snapshot) {
            Ok(body) => ([(header::CONTENT_TYPE, "application/yaml")], body).into_response(),
            Err(e) => {
                eprintln!("[bridge] YAML serialization failed: {e}");
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
            }
        },
        Err(e) => {
            eprintln!("[bridge] snapshot refresh failed: {e}");
            app.health_tracker.record_error(e.to_string());
            (StatusCode::BAD_GATEWAY, e.to_string()).into_response()
        }
    }
}

// GET /system/health (état opérationnel)
async fn get_system_health(State(app): State<AppState>) -> Json<BridgeHealth> {
    let age = app.aggregator.snapshot_age(Instant::now()).await;
    Json(app.health_tracker.get_health(app.cache_ttl_seconds, age))
}
