use std::error::Error;

use tracing::info;
use tracing_subscriber::EnvFilter;

use velo_server::cache::{CacheConfig, CachedGbfsClient};
use velo_server::cities::CityRegistry;
use velo_server::config::ServerConfig;
use velo_server::gbfs::{GbfsClient, GbfsClientConfig};
use velo_server::web::{AppState, create_router};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("velo_server=info,tower_http=info")),
        )
        .init();

    let config = ServerConfig::from_env()?;

    let cities = match &config.cities_file {
        Some(path) => CityRegistry::from_json_file(path)?,
        None => CityRegistry::default(),
    };
    info!(cities = cities.len(), "loaded city list");

    let client = GbfsClient::new(GbfsClientConfig::new().with_timeout(config.timeout_secs))?;
    let cache_config = CacheConfig::default().with_ttl(config.cache_ttl);
    let gbfs = CachedGbfsClient::new(client, &cache_config);

    let state = AppState::new(gbfs, cities, config.language.clone());
    let app = create_router(state, &config.static_dir);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!(
        addr = %config.bind_addr,
        language = config.language.as_deref().unwrap_or("(publisher default)"),
        "listening"
    );
    println!("Open http://{} in your browser.", config.bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}
