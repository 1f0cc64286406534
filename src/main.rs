use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

use gamerec_api::{
    api::{create_router, AppState},
    config::Config,
    services::{
        group_cache::GroupCache,
        providers::{steam::SteamProvider, UsageFetcher},
        recommender::RecommendationService,
        roster::FileRoster,
    },
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env()?;

    // Wire up the pipeline: Steam fetcher, roster file, peer-group cache.
    let fetcher: Arc<dyn UsageFetcher> = Arc::new(SteamProvider::new(
        config.steam_api_key.clone(),
        config.steam_api_url.clone(),
        Duration::from_secs(config.fetch_timeout_secs),
    )?);
    let roster = Arc::new(FileRoster::new(config.roster_path.clone()));
    let cache = Arc::new(GroupCache::new(
        fetcher.clone(),
        roster.clone(),
        Duration::from_secs(config.cache_ttl_secs),
        Duration::from_millis(config.fetch_delay_ms),
    ));
    let recommender = Arc::new(RecommendationService::new(roster, cache, fetcher));

    let state = AppState::new(recommender, config.default_top_n);
    let app = create_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, "Server running");
    axum::serve(listener, app).await?;

    Ok(())
}
