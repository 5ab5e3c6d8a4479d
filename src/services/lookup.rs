use thiserror::Error;

use crate::feed::{
    ApiPosition, ApiTrade, DataClient, FeedError, PositionQuery, SortDirection, TradeQuery,
};

#[derive(Debug, Error)]
pub enum LookupError {
    #[error("not a valid EVM address: {0}")]
    InvalidAddress(String),

    #[error(transparent)]
    Feed(#[from] FeedError),
}

/// One wallet's current book and recent activity.
#[derive(Debug, Clone)]
pub struct WalletReport {
    pub address: String,
    pub positions: Vec<ApiPosition>,
    pub recent_trades: Vec<ApiTrade>,
}

/// `0x` followed by exactly 40 hex chars.
pub fn is_evm_address(v: &str) -> bool {
    let v = v.trim();
    v.len() == 42
        && v.starts_with("0x")
        && v[2..].chars().all(|c| c.is_ascii_hexdigit())
}

/// Inspect a single wallet: top positions by cash PnL plus its latest
/// fills. The address is validated before any request goes out.
pub async fn lookup_wallet(client: &DataClient, address: &str) -> Result<WalletReport, LookupError> {
    let address = address.trim();
    if !is_evm_address(address) {
        return Err(LookupError::InvalidAddress(address.to_string()));
    }

    let positions_query = PositionQuery {
        limit: Some(20),
        sort_by: Some("CASHPNL".to_string()),
        sort_direction: Some(SortDirection::Desc),
        size_threshold: Some(1),
        ..PositionQuery::for_user(address)
    };
    let trades_query = TradeQuery {
        user: Some(address.to_string()),
        limit: Some(12),
        ..TradeQuery::default()
    };

    let (positions, recent_trades) = tokio::try_join!(
        client.get_positions(&positions_query),
        client.get_trades(&trades_query),
    )?;

    Ok(WalletReport {
        address: address.to_string(),
        positions,
        recent_trades,
    })
}
