use std::sync::Arc;

use studyworks_server::config::Config;
use studyworks_server::store::{MemoryStore, PgStore, Store};
use studyworks_server::token::TokenService;
use studyworks_server::{router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let config = Config::from_env()?;

    let store: Arc<dyn Store> = match &config.database_url {
        Some(url) => Arc::new(PgStore::connect(url, config.db_max_connections).await?),
        None => {
            log::warn!("DATABASE_URL is not set, keeping data in memory");
            Arc::new(MemoryStore::new())
        }
    };

    let tokens = TokenService::new(&config.secret_key, config.token_ttl);
    let app = router(AppState::new(store.clone(), tokens));

    log::info!("Starting StudyWorks HTTP Server on http://{}", config.bind_addr);
    let served = axum::Server::bind(&config.bind_addr)
        .serve(app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await;

    store.close().await;
    log::info!("Server stopped");
    served?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        log::error!("Could not listen for shutdown signal: {}", err);
        std::future::pending::<()>().await;
    }
    log::info!("Shutdown signal received");
}
