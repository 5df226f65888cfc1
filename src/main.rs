mod config;
mod db;
mod frame;
mod notify;
mod routes;
mod services;
mod state;
mod store;
mod wheel;

use std::sync::Arc;

use crate::store::{MemoryStore, PeopleStore, PgStore};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = config::AppConfig::from_env().expect("invalid configuration");

    let store: Arc<dyn PeopleStore> = match &config.database_url {
        Some(database_url) => {
            let pool = db::init_pool(database_url, config.db_max_connections)
                .await
                .expect("database init failed");
            let store = PgStore::connect(pool).await.expect("failed to load people");
            let _listener = store.spawn_listener();
            Arc::new(store)
        }
        None => {
            tracing::warn!("DATABASE_URL not set; using in-memory store (draws are lost on restart)");
            Arc::new(MemoryStore::new())
        }
    };

    if !config.seed_people.is_empty() {
        let created = store.seed(&config.seed_people).await.expect("seeding failed");
        tracing::info!(created, requested = config.seed_people.len(), "seeded people");
    }

    let state = state::AppState::new(store, config.wheel);
    let app = routes::app(state, config.static_dir.as_deref());
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port))
        .await
        .expect("failed to bind");

    tracing::info!(port = config.port, "santa-wheel listening");
    axum::serve(listener, app).await.expect("server failed");
}
