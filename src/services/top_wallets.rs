use std::sync::Arc;

use chrono::Utc;
use tokio::sync::broadcast;
use tokio::time::interval;

use crate::cache::{cache_key, PollConfig, Poller};
use crate::engine::format::{format_usd_signed, short_addr};
use crate::engine::{rank_top_wallets, Window};
use crate::feed::{AmountFilter, ApiTrade, DataClient, TradeQuery};
use crate::tier::TierPolicy;

use super::TapeUpdate;

/// Phase-1 poller: the wide tape slice candidates are drawn from.
pub fn spawn_ranking_poller(client: DataClient, policy: &TierPolicy) -> Poller<Vec<ApiTrade>> {
    let query = TradeQuery {
        limit: Some(policy.ranking_scan_limit),
        filter_type: Some(AmountFilter::Cash),
        filter_amount: Some(policy.min_notional),
        ..TradeQuery::default()
    };
    let key = cache_key("trades", &query.query_pairs());
    let cfg = PollConfig {
        stale_time: policy.stale_time,
        refetch_interval: policy.ranking_refresh,
    };
    Poller::spawn(key, cfg, move || {
        let client = client.clone();
        let query = query.clone();
        async move { client.get_trades(&query).await }
    })
}

/// Run the top-profitable-wallets ranking loop.
///
/// Phase 1 reads the shared ranking poller's tape slice; phase 2 fans out
/// one positions fetch per candidate. Tiers with no candidate budget skip
/// the service entirely.
pub async fn run_top_wallets(
    client: DataClient,
    poller: Arc<Poller<Vec<ApiTrade>>>,
    policy: TierPolicy,
    window: Window,
    update_tx: broadcast::Sender<TapeUpdate>,
) {
    if policy.candidate_wallets == 0 {
        tracing::info!("Top-wallets ranking disabled for this tier");
        return;
    }

    tracing::info!(
        window = window.as_str(),
        candidates = policy.candidate_wallets,
        refresh_secs = policy.ranking_refresh.as_secs(),
        "Top-wallets service started"
    );

    let mut ticker = interval(policy.ranking_refresh);
    loop {
        ticker.tick().await;

        let state = poller.read();
        let Some(trades) = state.data else {
            tracing::debug!("Top-wallets: no tape batch yet");
            continue;
        };

        let now = Utc::now().timestamp();
        let rows = rank_top_wallets(&client, &trades, now, window, &policy).await;

        if let Some(top) = rows.first() {
            tracing::info!(
                window = window.as_str(),
                wallets = rows.len(),
                top = %short_addr(&top.wallet, 5),
                cash_pnl = %format_usd_signed(top.cash_pnl),
                "Top wallets ranked"
            );
        } else {
            tracing::debug!(window = window.as_str(), "Top-wallets: no candidates in window");
        }

        let _ = update_tx.send(TapeUpdate::TopWallets {
            window,
            rows: Arc::new(rows),
        });
    }
}
