use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time::{sleep, timeout};

use alphatape::cache::{PollConfig, Poller};
use alphatape::engine::format::format_usd;
use alphatape::engine::{candidate_wallets, enrich_candidates, group_by_market, Window};
use alphatape::feed::{ApiPosition, ApiTrade, FeedError};
use alphatape::models::Tier;
use alphatape::services::tape::run_tape;
use alphatape::services::watchlist::copy_positions_to_watchlist;
use alphatape::services::TapeUpdate;
use alphatape::store::{MemoryStore, TapeStore};
use alphatape::tier::TierPolicy;

fn make_trade(market: &str, wallet: &str, size: f64, price: f64, ts: i64) -> ApiTrade {
    ApiTrade {
        proxy_wallet: wallet.to_string(),
        side: "BUY".to_string(),
        condition_id: market.to_string(),
        title: Some(format!("Market {market}")),
        slug: Some(format!("market-{market}")),
        size,
        price,
        timestamp: ts,
        ..ApiTrade::default()
    }
}

fn make_position(condition_id: &str, cash_pnl: f64) -> ApiPosition {
    ApiPosition {
        condition_id: condition_id.to_string(),
        slug: Some(format!("market-{condition_id}")),
        title: Some(format!("Question {condition_id}?")),
        cash_pnl,
        realized_pnl: cash_pnl / 2.0,
        initial_value: 100.0,
        ..ApiPosition::default()
    }
}

#[test]
fn test_radar_rows_format_like_the_dashboard() {
    let trades = vec![
        make_trade("A", "0x1", 1000.0, 0.5, 100),
        make_trade("A", "0x2", 500.0, 0.4, 99),
        make_trade("B", "0x3", 200.0, 0.9, 98),
    ];

    let rows = group_by_market(&trades, 10);
    assert_eq!(rows[0].condition_id, "A");
    assert_eq!(rows[0].trades, 2);
    assert_eq!(format_usd(rows[0].total_notional), "$700");
    assert_eq!(rows[1].condition_id, "B");
    assert_eq!(format_usd(rows[1].total_notional), "$180");
}

#[tokio::test]
async fn test_two_phase_ranking_with_window_and_partial_failure() {
    let now = 1_000_000;
    let policy = TierPolicy::for_tier(Tier::Pro);

    // 0xstale is outside the day window; 0xflaky fails enrichment.
    let trades = vec![
        make_trade("A", "0xbig", 5000.0, 0.5, now - 10),
        make_trade("A", "0xflaky", 4000.0, 0.5, now - 20),
        make_trade("B", "0xsmall", 100.0, 0.5, now - Window::Day.secs()),
        make_trade("B", "0xstale", 9999.0, 0.9, now - Window::Day.secs() - 1),
    ];

    let candidates = candidate_wallets(&trades, now - Window::Day.secs(), policy.candidate_wallets);
    let wallets: Vec<_> = candidates.iter().map(|c| c.wallet.as_str()).collect();
    assert_eq!(wallets, vec!["0xbig", "0xflaky", "0xsmall"]);

    let rows = enrich_candidates(
        candidates,
        |wallet| async move {
            match wallet.as_str() {
                "0xflaky" => Err(FeedError::Status {
                    status: 502,
                    body: "bad upstream".into(),
                }),
                "0xbig" => Ok(vec![make_position("m1", 40.0), make_position("m2", 10.0)]),
                _ => Ok(vec![make_position("m3", 75.0)]),
            }
        },
        policy.visible_rows,
    )
    .await;

    let ranked: Vec<_> = rows.iter().map(|r| (r.wallet.as_str(), r.cash_pnl)).collect();
    assert_eq!(ranked, vec![("0xsmall", 75.0), ("0xbig", 50.0)]);
    assert_eq!(rows[0].rank, 1);
}

#[tokio::test]
async fn test_tape_service_publishes_batches() {
    let trades = vec![make_trade("A", "0x1", 100.0, 0.5, 42)];
    let served = trades.clone();

    let cfg = PollConfig {
        stale_time: Duration::from_secs(60),
        refetch_interval: Duration::from_secs(3600),
    };
    let poller = Arc::new(Poller::spawn("trades&test", cfg, move || {
        let batch = served.clone();
        async move { Ok::<_, String>(batch) }
    }));

    let (update_tx, mut update_rx) = broadcast::channel::<TapeUpdate>(16);
    let policy = TierPolicy::for_tier(Tier::Free);
    tokio::spawn(run_tape(Arc::clone(&poller), policy, update_tx));

    // Let the service reach its subscription point, then force a refresh.
    sleep(Duration::from_millis(20)).await;
    poller.refetch().await;

    let update = timeout(Duration::from_secs(2), update_rx.recv())
        .await
        .expect("tape service should publish within the timeout")
        .expect("channel open");

    match update {
        TapeUpdate::Tape(batch) => {
            assert_eq!(batch.len(), 1);
            assert_eq!(batch[0].condition_id, "A");
        }
        other => panic!("expected a tape batch, got {other:?}"),
    }
}

#[test]
fn test_team_copy_flow_lands_in_watchlist() {
    let store = MemoryStore::with_tier(Tier::Team);
    assert!(TierPolicy::for_tier(store.tier()).flags.copy_to_watchlist);

    let positions = vec![
        make_position("0xaaa", 10.0),
        make_position("0xbbb", -5.0),
        make_position("0xaaa", 10.0),
    ];
    let added = copy_positions_to_watchlist(&store, &positions);
    assert_eq!(added, 2);

    let list = store.watchlist();
    assert_eq!(list.len(), 2);
    assert_eq!(list[0].condition_id, "0xbbb");
    assert!(store.is_watched("0xaaa"));
}
