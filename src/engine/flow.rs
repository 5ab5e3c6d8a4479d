use std::cmp::Ordering;
use std::collections::HashMap;

use serde::Serialize;

use crate::feed::ApiTrade;

/// USD notional moved by one fill: `size * price`. A non-finite operand
/// contributes zero instead of poisoning downstream sums; the trade itself
/// still counts toward trade-count metrics.
pub fn notional(trade: &ApiTrade) -> f64 {
    let v = trade.size * trade.price;
    if v.is_finite() {
        v
    } else {
        0.0
    }
}

// ---------------------------------------------------------------------------
// Flow rows
// ---------------------------------------------------------------------------

/// Per-market rollup of one tape batch (the hot-markets radar).
#[derive(Debug, Clone, Serialize)]
pub struct MarketFlowRow {
    pub condition_id: String,
    pub slug: Option<String>,
    pub title: Option<String>,
    pub trades: u32,
    pub total_notional: f64,
    /// Captured from the first trade seen per market; batches arrive
    /// newest-first, so this is the most recent fill.
    pub last_price: Option<f64>,
    pub last_side: Option<String>,
    /// 1-based position after ranking.
    pub rank: usize,
}

/// Per-wallet rollup of one tape batch (the whale-wallet radar).
#[derive(Debug, Clone, Serialize)]
pub struct WalletFlowRow {
    pub wallet: String,
    pub trades: u32,
    pub total_notional: f64,
    pub last_ts: Option<i64>,
    pub rank: usize,
}

// ---------------------------------------------------------------------------
// Grouping passes
// ---------------------------------------------------------------------------

/// Group a tape batch by market id and rank by total notional.
///
/// Rows are built fresh on every call, with no cross-batch memory. The sort is
/// stable over encounter order, so exact-notional ties keep the order the
/// markets first appeared in the batch.
pub fn group_by_market(trades: &[ApiTrade], top_n: usize) -> Vec<MarketFlowRow> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut rows: Vec<MarketFlowRow> = Vec::new();

    for trade in trades {
        if trade.condition_id.is_empty() {
            continue;
        }
        let i = *index.entry(trade.condition_id.as_str()).or_insert_with(|| {
            rows.push(MarketFlowRow {
                condition_id: trade.condition_id.clone(),
                slug: trade.slug.clone(),
                title: trade.title.clone(),
                trades: 0,
                total_notional: 0.0,
                last_price: trade.price.is_finite().then_some(trade.price),
                last_side: Some(trade.side.clone()).filter(|s| !s.is_empty()),
                rank: 0,
            });
            rows.len() - 1
        });

        let row = &mut rows[i];
        row.trades += 1;
        row.total_notional += notional(trade);
        if row.slug.is_none() {
            row.slug = trade.slug.clone();
        }
        if row.title.is_none() {
            row.title = trade.title.clone();
        }
    }

    sort_and_rank(&mut rows, |r| r.total_notional, |r, rank| r.rank = rank);
    rows.truncate(top_n);
    rows
}

/// Group a tape batch by wallet and rank by total notional. Trades without
/// a wallet are skipped.
pub fn group_by_wallet(trades: &[ApiTrade], top_n: usize) -> Vec<WalletFlowRow> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut rows: Vec<WalletFlowRow> = Vec::new();

    for trade in trades {
        if trade.proxy_wallet.is_empty() {
            continue;
        }
        let i = *index.entry(trade.proxy_wallet.as_str()).or_insert_with(|| {
            rows.push(WalletFlowRow {
                wallet: trade.proxy_wallet.clone(),
                trades: 0,
                total_notional: 0.0,
                last_ts: (trade.timestamp != 0).then_some(trade.timestamp),
                rank: 0,
            });
            rows.len() - 1
        });

        let row = &mut rows[i];
        row.trades += 1;
        row.total_notional += notional(trade);
    }

    sort_and_rank(&mut rows, |r| r.total_notional, |r, rank| r.rank = rank);
    rows.truncate(top_n);
    rows
}

/// Stable descending sort plus 1-based rank assignment.
fn sort_and_rank<R>(rows: &mut [R], metric: impl Fn(&R) -> f64, set_rank: impl Fn(&mut R, usize)) {
    rows.sort_by(|a, b| {
        metric(b)
            .partial_cmp(&metric(a))
            .unwrap_or(Ordering::Equal)
    });
    for (i, row) in rows.iter_mut().enumerate() {
        set_rank(row, i + 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_trade(market: &str, wallet: &str, size: f64, price: f64) -> ApiTrade {
        ApiTrade {
            proxy_wallet: wallet.to_string(),
            side: "BUY".to_string(),
            condition_id: market.to_string(),
            size,
            price,
            timestamp: 1_700_000_000,
            ..ApiTrade::default()
        }
    }

    #[test]
    fn test_notional_is_size_times_price() {
        let t = make_trade("A", "0x1", 1000.0, 0.5);
        assert_eq!(notional(&t), 500.0);
    }

    #[test]
    fn test_notional_non_finite_is_zero() {
        let mut t = make_trade("A", "0x1", f64::NAN, 0.5);
        assert_eq!(notional(&t), 0.0);
        t.size = f64::INFINITY;
        assert_eq!(notional(&t), 0.0);
    }

    #[test]
    fn test_group_by_market_end_to_end() {
        let trades = vec![
            make_trade("A", "0x1", 1000.0, 0.5),
            make_trade("A", "0x2", 500.0, 0.4),
            make_trade("B", "0x3", 200.0, 0.9),
        ];

        let rows = group_by_market(&trades, 10);
        assert_eq!(rows.len(), 2);

        assert_eq!(rows[0].condition_id, "A");
        assert_eq!(rows[0].trades, 2);
        assert_eq!(rows[0].total_notional, 700.0);
        assert_eq!(rows[0].rank, 1);

        assert_eq!(rows[1].condition_id, "B");
        assert_eq!(rows[1].trades, 1);
        assert_eq!(rows[1].total_notional, 180.0);
        assert_eq!(rows[1].rank, 2);
    }

    #[test]
    fn test_group_by_market_first_seen_is_last_trade() {
        // Batch is newest-first; the first record per market carries the
        // freshest price and side.
        let mut newest = make_trade("A", "0x1", 10.0, 0.61);
        newest.side = "SELL".to_string();
        let older = make_trade("A", "0x2", 20.0, 0.55);

        let rows = group_by_market(&[newest, older], 10);
        assert_eq!(rows[0].last_price, Some(0.61));
        assert_eq!(rows[0].last_side.as_deref(), Some("SELL"));
    }

    #[test]
    fn test_group_by_market_skips_empty_key_counts_all_else() {
        let trades = vec![
            make_trade("", "0x1", 1000.0, 0.5),
            make_trade("A", "0x2", 10.0, f64::NAN),
        ];
        let rows = group_by_market(&trades, 10);
        assert_eq!(rows.len(), 1);
        // NaN notional contributes zero but the trade still counts.
        assert_eq!(rows[0].trades, 1);
        assert_eq!(rows[0].total_notional, 0.0);
    }

    #[test]
    fn test_grouping_is_order_stable_and_conserves_totals() {
        let trades: Vec<ApiTrade> = (0..20)
            .map(|i| make_trade(&format!("m{}", i % 7), &format!("0x{}", i % 5), 100.0, 0.5))
            .collect();

        let a = group_by_market(&trades, 100);
        let b = group_by_market(&trades, 100);
        let keys_a: Vec<_> = a.iter().map(|r| r.condition_id.clone()).collect();
        let keys_b: Vec<_> = b.iter().map(|r| r.condition_id.clone()).collect();
        assert_eq!(keys_a, keys_b, "same batch must yield identical row order");

        let total_trades: u32 = a.iter().map(|r| r.trades).sum();
        assert_eq!(total_trades as usize, trades.len());
        let total_notional: f64 = a.iter().map(|r| r.total_notional).sum();
        let expected: f64 = trades.iter().map(notional).sum();
        assert!((total_notional - expected).abs() < 1e-9);
    }

    #[test]
    fn test_exact_ties_keep_encounter_order() {
        // Same notional everywhere; first-grouped market wins.
        let trades = vec![
            make_trade("C", "0x1", 100.0, 0.5),
            make_trade("A", "0x2", 100.0, 0.5),
            make_trade("B", "0x3", 100.0, 0.5),
        ];
        let rows = group_by_market(&trades, 10);
        let keys: Vec<_> = rows.iter().map(|r| r.condition_id.as_str()).collect();
        assert_eq!(keys, vec!["C", "A", "B"]);
    }

    #[test]
    fn test_top_n_truncation_and_descending_order() {
        let trades: Vec<ApiTrade> = (0..15)
            .map(|i| make_trade(&format!("m{i}"), "0x1", (i as f64 + 1.0) * 10.0, 0.5))
            .collect();

        let rows = group_by_market(&trades, 10);
        assert_eq!(rows.len(), 10);
        for pair in rows.windows(2) {
            assert!(
                pair[0].total_notional >= pair[1].total_notional,
                "ranking must be descending with no inversions"
            );
        }
        assert_eq!(rows[0].rank, 1);
        assert_eq!(rows[9].rank, 10);
    }

    #[test]
    fn test_group_by_wallet_skips_empty_wallets() {
        let trades = vec![
            make_trade("A", "0xaaa", 1000.0, 0.5),
            make_trade("A", "", 9999.0, 0.9),
            make_trade("B", "0xaaa", 200.0, 0.5),
            make_trade("B", "0xbbb", 100.0, 0.5),
        ];

        let rows = group_by_wallet(&trades, 10);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].wallet, "0xaaa");
        assert_eq!(rows[0].trades, 2);
        assert_eq!(rows[0].total_notional, 600.0);
        assert_eq!(rows[1].wallet, "0xbbb");
    }

    #[test]
    fn test_empty_batch_yields_empty_result() {
        assert!(group_by_market(&[], 10).is_empty());
        assert!(group_by_wallet(&[], 10).is_empty());
    }
}
