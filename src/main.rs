use actix_web::{web, App, HttpServer};
use dotenv::dotenv;
use env_logger::Env;
use std::sync::Arc;

use video_catalog::config::{AppConfig, StoreBackend};
use video_catalog::services::mode_selector::HttpModeConfigSource;
use video_catalog::services::session::SessionRegistry;
use video_catalog::store::{MemoryVideoStore, PgVideoStore, VideoStore};
use video_catalog::{api, db, AppState};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if it exists
    dotenv().ok();

    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let config = AppConfig::new()?;

    let store: Arc<dyn VideoStore> = match config.store.backend {
        StoreBackend::Postgres => {
            let pool = db::create_pool(&config.database.url, config.database.max_connections)?;
            Arc::new(PgVideoStore::new(pool).await?)
        }
        StoreBackend::Memory => {
            log::warn!("Using in-memory video store, entries are lost on restart");
            Arc::new(MemoryVideoStore::new())
        }
    };

    if config.remote_config.url.is_none() {
        log::warn!("No remote mode config url set, high traffic mode is unavailable");
    }
    let mode_source = Arc::new(HttpModeConfigSource::new(config.remote_config.url.clone()));

    let sessions = SessionRegistry::with_limits(
        chrono::Duration::seconds(config.session.ttl_secs),
        config.session.max_sessions,
    );
    let state = web::Data::new(
        AppState::new(store, mode_source, config.embed.default_provider).with_sessions(sessions),
    );

    log::info!(
        "Starting server on {}:{}",
        config.server.host,
        config.server.port
    );

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(actix_cors::Cors::permissive()) // Configure properly in production
            .configure(api::configure)
    })
    .bind((config.server.host.clone(), config.server.port))?
    .run()
    .await?;

    Ok(())
}
