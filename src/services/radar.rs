use std::sync::Arc;

use tokio::sync::broadcast;

use crate::cache::{cache_key, PollConfig, Poller};
use crate::engine::format::{format_usd, short_addr};
use crate::engine::{group_by_market, group_by_wallet};
use crate::feed::{AmountFilter, ApiTrade, DataClient, TradeQuery};
use crate::tier::TierPolicy;

use super::TapeUpdate;

fn radar_poller(client: DataClient, policy: &TierPolicy, limit: u32) -> Poller<Vec<ApiTrade>> {
    let query = TradeQuery {
        limit: Some(limit),
        filter_type: Some(AmountFilter::Cash),
        filter_amount: Some(policy.min_notional),
        ..TradeQuery::default()
    };
    let key = cache_key("trades", &query.query_pairs());
    let cfg = PollConfig {
        stale_time: policy.stale_time,
        refetch_interval: policy.radar_refresh,
    };
    Poller::spawn(key, cfg, move || {
        let client = client.clone();
        let query = query.clone();
        async move { client.get_trades(&query).await }
    })
}

/// Hot-markets radar poller: a wider tape slice than the live tape.
pub fn spawn_market_radar_poller(client: DataClient, policy: &TierPolicy) -> Poller<Vec<ApiTrade>> {
    radar_poller(client, policy, policy.radar_market_limit)
}

/// Whale-wallet radar poller.
pub fn spawn_wallet_radar_poller(client: DataClient, policy: &TierPolicy) -> Poller<Vec<ApiTrade>> {
    radar_poller(client, policy, policy.radar_wallet_limit)
}

/// Run both radars: re-aggregate whenever either poller publishes a fresh
/// batch, and push ranked rows to subscribers. Rows are rebuilt from
/// scratch per batch; staleness is bounded by one refresh interval.
pub async fn run_radar(
    market_poller: Arc<Poller<Vec<ApiTrade>>>,
    wallet_poller: Arc<Poller<Vec<ApiTrade>>>,
    policy: TierPolicy,
    update_tx: broadcast::Sender<TapeUpdate>,
) {
    tracing::info!(
        market_limit = policy.radar_market_limit,
        wallet_limit = policy.radar_wallet_limit,
        refresh_secs = policy.radar_refresh.as_secs(),
        "Radar service started"
    );

    let mut market_rx = market_poller.subscribe();
    let mut wallet_rx = wallet_poller.subscribe();

    loop {
        tokio::select! {
            changed = market_rx.changed() => {
                if changed.is_err() {
                    tracing::warn!("Market radar poller gone; stopping radar service");
                    return;
                }
                let state = market_rx.borrow_and_update().clone();
                if let Some(error) = &state.error {
                    tracing::warn!(error = %error, "Hot-markets refresh failed; keeping last rows");
                }
                let Some(trades) = state.data else { continue };

                let rows = group_by_market(&trades, policy.visible_rows);
                if let Some(top) = rows.first() {
                    tracing::info!(
                        markets = rows.len(),
                        top = top.title.as_deref().unwrap_or(&top.condition_id),
                        flow = %format_usd(top.total_notional),
                        "Hot markets refreshed"
                    );
                }
                let _ = update_tx.send(TapeUpdate::HotMarkets(Arc::new(rows)));
            }
            changed = wallet_rx.changed() => {
                if changed.is_err() {
                    tracing::warn!("Wallet radar poller gone; stopping radar service");
                    return;
                }
                let state = wallet_rx.borrow_and_update().clone();
                if let Some(error) = &state.error {
                    tracing::warn!(error = %error, "Whale-wallets refresh failed; keeping last rows");
                }
                let Some(trades) = state.data else { continue };

                let rows = group_by_wallet(&trades, policy.visible_rows);
                if let Some(top) = rows.first() {
                    tracing::info!(
                        wallets = rows.len(),
                        top = %short_addr(&top.wallet, 5),
                        flow = %format_usd(top.total_notional),
                        "Whale wallets refreshed"
                    );
                }
                let _ = update_tx.send(TapeUpdate::WhaleWallets(Arc::new(rows)));
            }
        }
    }
}
