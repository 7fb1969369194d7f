use geojob_backend::{
    config::{get_config, init_config, StoreBackend},
    database::{
        memory::MemoryStore,
        pool::{create_pool, run_migrations},
        postgres::PgStore,
        Store,
    },
    error::Error,
    routes,
    services::geocoding_service::{Geocoder, GoogleGeocoder},
    AppState,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("geojob_backend=info,tower_http=info")),
        )
        .init();

    init_config()?;
    let config = get_config()?;

    let store: Arc<dyn Store> = match config.store_backend {
        StoreBackend::Postgres => {
            let url = config.database_url.as_deref().ok_or_else(|| {
                Error::Config("DATABASE_URL is required when STORE_BACKEND=postgres".to_string())
            })?;
            let pool = create_pool(url, config.database_max_connections).await?;
            run_migrations(&pool).await?;
            info!("Using PostgreSQL store");
            Arc::new(PgStore::new(pool))
        }
        StoreBackend::Memory => {
            info!("Using in-memory store; data is lost on restart");
            Arc::new(MemoryStore::new())
        }
    };

    let geocoder: Arc<dyn Geocoder> = Arc::new(GoogleGeocoder::new(
        config.geocoder_api_key.clone(),
        config.geocoder_url.clone(),
        Duration::from_secs(config.geocoder_timeout_secs),
    )?);

    let app_state = AppState::new(store, geocoder, &config.jwt_secret);
    let app = routes::router(app_state);

    let addr: SocketAddr = config.server_address.parse()?;
    info!("Listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}
