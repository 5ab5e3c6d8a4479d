pub mod flow;
pub mod format;
pub mod leaderboard;
pub mod tag;

pub use flow::{group_by_market, group_by_wallet, notional, MarketFlowRow, WalletFlowRow};
pub use leaderboard::{
    candidate_wallets, enrich_candidates, rank_top_wallets, CandidateWallet, WalletPnlRow, Window,
};
pub use tag::{pattern_tag, PatternTag};
