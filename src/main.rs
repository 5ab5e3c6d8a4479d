use std::sync::Arc;

use tokio::sync::broadcast;

use alphatape::config::AppConfig;
use alphatape::feed::{DataClient, GammaClient};
use alphatape::metrics::init_metrics;
use alphatape::proxy::create_router;
use alphatape::services::radar::{run_radar, spawn_market_radar_poller, spawn_wallet_radar_poller};
use alphatape::services::tape::{run_tape, spawn_tape_poller};
use alphatape::services::top_wallets::{run_top_wallets, spawn_ranking_poller};
use alphatape::services::trending::{run_trending, spawn_markets_poller};
use alphatape::services::TapeUpdate;
use alphatape::store::{JsonFileStore, MemoryStore, TapeStore};
use alphatape::tier::TierPolicy;
use alphatape::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = AppConfig::from_env()?;
    let addr = format!("{}:{}", config.host, config.port);
    let metrics_handle = init_metrics();

    let http = reqwest::Client::builder()
        .timeout(config.feed_timeout)
        .build()?;
    let data_client = DataClient::new(http.clone()).with_base_url(&config.data_api_base);

    // --- Tier + watchlist store ---
    let store: Arc<dyn TapeStore> = match &config.store_path {
        Some(path) => {
            tracing::info!(path = %path, "Using JSON store");
            Arc::new(JsonFileStore::open(path))
        }
        None => Arc::new(MemoryStore::new()),
    };
    if let Some(tier) = config.tier_override {
        store.set_tier(tier);
    }
    let tier = store.tier();
    let policy = TierPolicy::for_tier(tier);
    tracing::info!(tier = %tier, "Analytics engine starting");

    // --- Dashboard broadcast channel ---
    let (update_tx, _) = broadcast::channel::<TapeUpdate>(256);

    // --- Live tape ---
    let tape_poller = Arc::new(spawn_tape_poller(data_client.clone(), &policy));
    tokio::spawn(run_tape(
        Arc::clone(&tape_poller),
        policy,
        update_tx.clone(),
    ));

    // --- Hot-markets + whale-wallets radar ---
    let market_poller = Arc::new(spawn_market_radar_poller(data_client.clone(), &policy));
    let wallet_poller = Arc::new(spawn_wallet_radar_poller(data_client.clone(), &policy));
    tokio::spawn(run_radar(
        market_poller,
        wallet_poller,
        policy,
        update_tx.clone(),
    ));

    // --- Trending markets ---
    let gamma_client = GammaClient::new(http.clone()).with_base_url(&config.gamma_api_base);
    let markets_poller = Arc::new(spawn_markets_poller(gamma_client));
    tokio::spawn(run_trending(markets_poller, update_tx.clone()));

    // --- Top profitable wallets (paid tiers) ---
    let ranking_poller = Arc::new(spawn_ranking_poller(data_client.clone(), &policy));
    tokio::spawn(run_top_wallets(
        data_client,
        ranking_poller,
        policy,
        config.ranking_window,
        update_tx.clone(),
    ));

    // --- Feed proxy ---
    let state = AppState {
        config,
        http,
        metrics_handle,
    };
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Proxy listening on {addr}");
    axum::serve(listener, router).await?;

    Ok(())
}

fn init_tracing() {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer())
        .init();
}
