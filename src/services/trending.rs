use std::sync::Arc;
use std::time::Duration;

use rust_decimal::prelude::ToPrimitive;
use tokio::sync::broadcast;

use crate::cache::{cache_key, PollConfig, Poller};
use crate::engine::format::format_usd;
use crate::feed::{GammaClient, GammaMarket, MarketQuery};

use super::TapeUpdate;

const MARKETS_LIMIT: u32 = 30;
const VISIBLE_MARKETS: usize = 12;

// The markets surface is not tier-gated; it refreshes on its own cadence.
const MARKETS_STALE: Duration = Duration::from_secs(60);
const MARKETS_REFRESH: Duration = Duration::from_secs(120);

/// Sort markets by total volume descending and keep the busiest. Volume is
/// served as a string; unparseable values rank as zero.
pub fn rank_by_volume(markets: &[GammaMarket], top_n: usize) -> Vec<GammaMarket> {
    let mut ranked = markets.to_vec();
    ranked.sort_by(|a, b| b.volume_decimal().cmp(&a.volume_decimal()));
    ranked.truncate(top_n);
    ranked
}

/// Poller over active, open markets.
pub fn spawn_markets_poller(client: GammaClient) -> Poller<Vec<GammaMarket>> {
    let query = MarketQuery {
        limit: Some(MARKETS_LIMIT),
        active: Some(true),
        closed: Some(false),
        ..MarketQuery::default()
    };
    let key = cache_key("markets", &query.query_pairs());
    let cfg = PollConfig {
        stale_time: MARKETS_STALE,
        refetch_interval: MARKETS_REFRESH,
    };
    Poller::spawn(key, cfg, move || {
        let client = client.clone();
        let query = query.clone();
        async move { client.get_markets(&query).await }
    })
}

/// Run the trending-markets loop: rank each fresh batch by volume and
/// republish.
pub async fn run_trending(
    poller: Arc<Poller<Vec<GammaMarket>>>,
    update_tx: broadcast::Sender<TapeUpdate>,
) {
    tracing::info!(
        limit = MARKETS_LIMIT,
        refresh_secs = MARKETS_REFRESH.as_secs(),
        "Trending-markets service started"
    );

    let mut rx = poller.subscribe();
    loop {
        if rx.changed().await.is_err() {
            tracing::warn!("Markets poller gone; stopping trending service");
            return;
        }
        let state = rx.borrow_and_update().clone();

        if let Some(error) = &state.error {
            tracing::warn!(error = %error, "Markets refresh failed; keeping last rows");
        }
        let Some(markets) = state.data else { continue };

        let ranked = rank_by_volume(&markets, VISIBLE_MARKETS);
        if let Some(top) = ranked.first() {
            tracing::info!(
                markets = ranked.len(),
                top = %top.question,
                volume = %format_usd(top.volume_decimal().to_f64().unwrap_or(0.0)),
                "Trending markets refreshed"
            );
        }
        let _ = update_tx.send(TapeUpdate::TrendingMarkets(Arc::new(ranked)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_market(condition_id: &str, volume: &str) -> GammaMarket {
        GammaMarket {
            condition_id: condition_id.to_string(),
            question: format!("Question {condition_id}?"),
            volume: Some(volume.to_string()),
            active: Some(true),
            closed: Some(false),
            ..GammaMarket::default()
        }
    }

    #[test]
    fn test_rank_by_volume_descending() {
        let markets = vec![
            make_market("a", "100.5"),
            make_market("b", "90000"),
            make_market("c", "2500"),
        ];
        let ranked = rank_by_volume(&markets, 10);
        let ids: Vec<_> = ranked.iter().map(|m| m.condition_id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c", "a"]);
    }

    #[test]
    fn test_rank_by_volume_unparseable_sinks_to_zero() {
        let markets = vec![make_market("a", "n/a"), make_market("b", "10")];
        let ranked = rank_by_volume(&markets, 10);
        assert_eq!(ranked[0].condition_id, "b");
    }

    #[test]
    fn test_rank_truncates() {
        let markets: Vec<_> = (0..20)
            .map(|i| make_market(&format!("m{i}"), &format!("{}", i * 10)))
            .collect();
        assert_eq!(rank_by_volume(&markets, 12).len(), 12);
    }
}
