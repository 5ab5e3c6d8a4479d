pub mod lookup;
pub mod radar;
pub mod tape;
pub mod top_wallets;
pub mod trending;
pub mod watchlist;

use std::sync::Arc;

use crate::engine::{MarketFlowRow, WalletFlowRow, WalletPnlRow, Window};
use crate::feed::{ApiTrade, GammaMarket};

/// Messages broadcast to dashboard subscribers as each surface refreshes.
/// Batches travel behind `Arc` so a slow subscriber never forces a copy.
#[derive(Debug, Clone)]
pub enum TapeUpdate {
    Tape(Arc<Vec<ApiTrade>>),
    HotMarkets(Arc<Vec<MarketFlowRow>>),
    WhaleWallets(Arc<Vec<WalletFlowRow>>),
    TopWallets {
        window: Window,
        rows: Arc<Vec<WalletPnlRow>>,
    },
    TrendingMarkets(Arc<Vec<GammaMarket>>),
}
