pub mod audit;
pub mod db;
pub mod error;
pub mod health;
pub mod models;
pub mod observability;
pub mod registry;
pub mod session;
pub mod store;
pub mod streaks;
pub mod handlers {
    pub mod audits;
    pub mod bots;
    pub mod sessions;
}

use std::sync::Arc;

use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use db::Db;
pub use error::{RegistryError, StoreError};
pub use models::*;
pub use observability::MetricsCollector;

use audit::AuditTrail;
use registry::BotRegistry;
use session::SessionPublisher;
use store::{AuditStore, MirrorStore, PgAuditStore, PgRecordStore, RecordStore};

/// Application state shared across handlers
pub struct AppState {
    pub db: Db,
    pub registry: BotRegistry,
    pub sessions: SessionPublisher,
    pub audits: AuditTrail,
    pub metrics: MetricsCollector,
}

impl AppState {
    /// Wires the Postgres-backed record and audit stores to the supplied
    /// mirror. Stores are constructed here, once, and injected by reference;
    /// nothing is lazily global.
    pub fn new(db: Db, mirror: Arc<dyn MirrorStore>) -> Self {
        let metrics = MetricsCollector::new();
        let records: Arc<dyn RecordStore> = Arc::new(PgRecordStore::new(db.clone()));
        let audit_store: Arc<dyn AuditStore> = Arc::new(PgAuditStore::new(db.clone()));

        Self {
            registry: BotRegistry::new(records, mirror.clone(), metrics.clone()),
            sessions: SessionPublisher::new(mirror, metrics.clone()),
            audits: AuditTrail::new(audit_store, metrics.clone()),
            metrics,
            db,
        }
    }
}

/// Build the API router
pub fn app(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route(
            "/users/{owner_id}/bots",
            get(handlers::bots::list_bots).post(handlers::bots::create_bot),
        )
        .route(
            "/users/{owner_id}/bots/{bot_id}",
            get(handlers::bots::get_bot)
                .patch(handlers::bots::update_bot)
                .delete(handlers::bots::delete_bot),
        )
        .route("/bots/{bot_id}/status", get(handlers::bots::get_display_status))
        .route(
            "/bots/{bot_id}/session",
            put(handlers::sessions::publish_session).get(handlers::sessions::get_session),
        )
        .route(
            "/audits",
            post(handlers::audits::append_audit).get(handlers::audits::query_audits),
        )
        .route("/audits/streaks", get(handlers::audits::get_streaks))
        .with_state(state.clone());

    let health_routes = Router::new()
        .route("/healthz", get(health::healthz))
        .route("/readyz", get(health::readyz))
        .route("/health", get(health::health_detail))
        .with_state(state);

    Router::new()
        .nest("/v1", api_routes)
        .merge(health_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
