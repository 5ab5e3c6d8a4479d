use std::sync::Arc;

use metrics::counter;
use tokio::sync::broadcast;

use crate::cache::{cache_key, PollConfig, Poller};
use crate::engine::flow::notional;
use crate::engine::format::{format_usd, short_addr};
use crate::engine::pattern_tag;
use crate::feed::{AmountFilter, ApiTrade, DataClient, TradeQuery};
use crate::tier::TierPolicy;

use super::TapeUpdate;

/// Tape query for the active tier: a CASH-filtered slice of the public feed.
pub fn tape_query(policy: &TierPolicy) -> TradeQuery {
    TradeQuery {
        limit: Some(policy.tape_limit),
        filter_type: Some(AmountFilter::Cash),
        filter_amount: Some(policy.min_notional),
        ..TradeQuery::default()
    }
}

/// Start the shared tape poller for a tier.
pub fn spawn_tape_poller(client: DataClient, policy: &TierPolicy) -> Poller<Vec<ApiTrade>> {
    let query = tape_query(policy);
    let key = cache_key("trades", &query.query_pairs());
    let cfg = PollConfig {
        stale_time: policy.stale_time,
        refetch_interval: policy.tape_refresh,
    };
    Poller::spawn(key, cfg, move || {
        let client = client.clone();
        let query = query.clone();
        async move { client.get_trades(&query).await }
    })
}

/// Run the live tape loop: log each refreshed batch and republish it to
/// dashboard subscribers. Pattern tags are a paid-tier annotation.
pub async fn run_tape(
    poller: Arc<Poller<Vec<ApiTrade>>>,
    policy: TierPolicy,
    update_tx: broadcast::Sender<TapeUpdate>,
) {
    tracing::info!(
        limit = policy.tape_limit,
        min_notional = policy.min_notional,
        refresh_secs = policy.tape_refresh.as_secs(),
        "Tape service started"
    );

    let mut rx = poller.subscribe();
    loop {
        if rx.changed().await.is_err() {
            tracing::warn!("Tape poller gone; stopping tape service");
            return;
        }
        let state = rx.borrow_and_update().clone();

        if let Some(error) = &state.error {
            tracing::warn!(error = %error, "Tape refresh failed; showing stale batch");
        }
        let Some(trades) = state.data else { continue };

        counter!("tape_trades_total").increment(trades.len() as u64);

        for trade in trades.iter() {
            let tag = policy
                .flags
                .leaderboards
                .then(|| pattern_tag(trade))
                .flatten();
            tracing::debug!(
                side = %trade.side,
                wallet = %short_addr(&trade.proxy_wallet, 4),
                notional = %format_usd(notional(trade)),
                price = trade.price,
                tag = tag.map(|t| t.label()).unwrap_or("-"),
                "Tape entry"
            );
        }

        tracing::info!(trades = trades.len(), "Tape batch refreshed");
        let _ = update_tx.send(TapeUpdate::Tape(Arc::clone(&trades)));
    }
}

// ---------------------------------------------------------------------------
// CSV export
// ---------------------------------------------------------------------------

/// Render a tape batch as CSV. String fields are JSON-quoted; zero/invalid
/// notionals export as an empty cell.
pub fn to_csv(trades: &[ApiTrade]) -> String {
    let mut lines = vec![
        "timestamp,side,title,outcome,price,size,notional_usd,wallet,tx".to_string(),
    ];

    for trade in trades {
        let value = notional(trade);
        let notional_cell = if value == 0.0 {
            String::new()
        } else {
            value.to_string()
        };
        lines.push(
            [
                trade.timestamp.to_string(),
                json_quote(&trade.side),
                json_quote(trade.title.as_deref().unwrap_or("")),
                json_quote(trade.outcome.as_deref().unwrap_or("")),
                trade.price.to_string(),
                trade.size.to_string(),
                notional_cell,
                json_quote(&trade.proxy_wallet),
                json_quote(trade.transaction_hash.as_deref().unwrap_or("")),
            ]
            .join(","),
        );
    }

    lines.join("\n")
}

fn json_quote(s: &str) -> String {
    serde_json::to_string(s).unwrap_or_else(|_| "\"\"".to_string())
}
