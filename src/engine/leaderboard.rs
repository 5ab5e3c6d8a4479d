use std::cmp::Ordering;
use std::collections::HashMap;
use std::future::Future;

use futures_util::future::join_all;
use serde::Serialize;

use crate::feed::{ApiPosition, ApiTrade, DataClient, FeedError, PositionQuery, SortDirection};
use crate::tier::TierPolicy;

use super::flow::notional;

// ---------------------------------------------------------------------------
// Window
// ---------------------------------------------------------------------------

/// Activity window for the top-profitable-wallets ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Window {
    Day,
    Week,
    Month,
}

impl Window {
    pub fn secs(&self) -> i64 {
        match self {
            Window::Day => 24 * 3600,
            Window::Week => 7 * 24 * 3600,
            Window::Month => 30 * 24 * 3600,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Window::Day => "1d",
            Window::Week => "7d",
            Window::Month => "30d",
        }
    }

    /// Lenient parse; anything unrecognized falls back to the day window.
    pub fn from_str_lenient(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "7d" | "week" => Window::Week,
            "30d" | "month" => Window::Month,
            _ => Window::Day,
        }
    }
}

// ---------------------------------------------------------------------------
// Phase 1: candidates from the tape
// ---------------------------------------------------------------------------

/// A wallet surfaced by cheap tape aggregation, pending enrichment.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateWallet {
    pub wallet: String,
    pub flow_notional: f64,
}

/// Wallets active in `[cutoff, now]`, ranked by summed notional, truncated
/// to `max`. The cutoff bound is inclusive. Pure; no requests issued here.
pub fn candidate_wallets(trades: &[ApiTrade], cutoff: i64, max: usize) -> Vec<CandidateWallet> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut out: Vec<CandidateWallet> = Vec::new();

    for trade in trades {
        if trade.proxy_wallet.is_empty() || trade.timestamp < cutoff {
            continue;
        }
        let i = *index.entry(trade.proxy_wallet.as_str()).or_insert_with(|| {
            out.push(CandidateWallet {
                wallet: trade.proxy_wallet.clone(),
                flow_notional: 0.0,
            });
            out.len() - 1
        });
        out[i].flow_notional += notional(trade);
    }

    out.sort_by(|a, b| {
        b.flow_notional
            .partial_cmp(&a.flow_notional)
            .unwrap_or(Ordering::Equal)
    });
    out.truncate(max);
    out
}

// ---------------------------------------------------------------------------
// Phase 2: per-candidate enrichment
// ---------------------------------------------------------------------------

/// Final leaderboard row: tape flow plus PnL sums over the wallet's
/// position snapshots.
#[derive(Debug, Clone, Serialize)]
pub struct WalletPnlRow {
    pub wallet: String,
    pub flow_notional: f64,
    pub cash_pnl: f64,
    pub realized_pnl: f64,
    pub initial_value: f64,
    pub positions: usize,
    pub rank: usize,
}

fn finite_or_zero(v: f64) -> f64 {
    if v.is_finite() {
        v
    } else {
        0.0
    }
}

/// Fan out one positions fetch per candidate and fold the results into
/// ranked rows. A candidate whose fetch fails is dropped from the ranking;
/// the ranking itself never fails.
pub async fn enrich_candidates<F, Fut>(
    candidates: Vec<CandidateWallet>,
    fetch_positions: F,
    top_n: usize,
) -> Vec<WalletPnlRow>
where
    F: Fn(String) -> Fut,
    Fut: Future<Output = Result<Vec<ApiPosition>, FeedError>>,
{
    let lookups = candidates.into_iter().map(|candidate| {
        let fut = fetch_positions(candidate.wallet.clone());
        async move { (candidate, fut.await) }
    });

    let mut rows: Vec<WalletPnlRow> = join_all(lookups)
        .await
        .into_iter()
        .filter_map(|(candidate, result)| match result {
            Ok(positions) => Some(WalletPnlRow {
                wallet: candidate.wallet,
                flow_notional: candidate.flow_notional,
                cash_pnl: positions.iter().map(|p| finite_or_zero(p.cash_pnl)).sum(),
                realized_pnl: positions.iter().map(|p| finite_or_zero(p.realized_pnl)).sum(),
                initial_value: positions.iter().map(|p| finite_or_zero(p.initial_value)).sum(),
                positions: positions.len(),
                rank: 0,
            }),
            Err(e) => {
                tracing::warn!(
                    wallet = %candidate.wallet,
                    error = %e,
                    "Ranking: positions fetch failed; excluding candidate"
                );
                None
            }
        })
        .collect();

    rows.sort_by(|a, b| b.cash_pnl.partial_cmp(&a.cash_pnl).unwrap_or(Ordering::Equal));
    rows.truncate(top_n);
    for (i, row) in rows.iter_mut().enumerate() {
        row.rank = i + 1;
    }
    rows
}

/// Full two-phase ranking: narrow by tape activity in the window, then
/// enrich the narrowed candidates with one positions request each. Total
/// position fetches are bounded by the tier's candidate count, not the
/// wallet universe.
pub async fn rank_top_wallets(
    client: &DataClient,
    trades: &[ApiTrade],
    now: i64,
    window: Window,
    policy: &TierPolicy,
) -> Vec<WalletPnlRow> {
    let cutoff = now - window.secs();
    let candidates = candidate_wallets(trades, cutoff, policy.candidate_wallets);

    enrich_candidates(
        candidates,
        |wallet| async move {
            let query = PositionQuery {
                limit: Some(30),
                sort_by: Some("CASHPNL".to_string()),
                sort_direction: Some(SortDirection::Desc),
                size_threshold: Some(1),
                ..PositionQuery::for_user(wallet)
            };
            client.get_positions(&query).await
        },
        policy.visible_rows,
    )
    .await
}
