use thiserror::Error;

use crate::feed::{ApiPosition, DataClient, FeedError, PositionQuery, SortDirection};
use crate::store::{watch_item, TapeStore};
use crate::tier::TierPolicy;

#[derive(Debug, Error)]
pub enum WatchlistError {
    #[error("portfolio copy requires the team tier")]
    NotEntitled,

    #[error(transparent)]
    Feed(#[from] FeedError),
}

/// Fold a wallet's position snapshots into the watchlist. Positions without
/// a condition id or slug are skipped; duplicates are left untouched.
/// Returns how many markets were actually added.
pub fn copy_positions_to_watchlist(store: &dyn TapeStore, positions: &[ApiPosition]) -> usize {
    let mut added = 0;
    for position in positions {
        let Some(slug) = position.slug.as_deref().filter(|s| !s.is_empty()) else {
            continue;
        };
        if position.condition_id.is_empty() {
            continue;
        }
        let question = position.title.as_deref().unwrap_or(slug);
        if store.add_to_watchlist(watch_item(&position.condition_id, slug, question)) {
            added += 1;
        }
    }
    added
}

/// "Copy wallet" action: fetch the wallet's current positions and append
/// their markets to the watchlist. Team-gated via the active tier.
pub async fn copy_portfolio(
    client: &DataClient,
    store: &dyn TapeStore,
    wallet: &str,
) -> Result<usize, WatchlistError> {
    let policy = TierPolicy::for_tier(store.tier());
    if !policy.flags.copy_to_watchlist {
        return Err(WatchlistError::NotEntitled);
    }

    let query = PositionQuery {
        limit: Some(30),
        sort_by: Some("CURRENT".to_string()),
        sort_direction: Some(SortDirection::Desc),
        size_threshold: Some(1),
        ..PositionQuery::for_user(wallet)
    };
    let positions = client.get_positions(&query).await?;

    let added = copy_positions_to_watchlist(store, &positions);
    tracing::info!(wallet = %wallet, added, "Copied portfolio to watchlist");
    Ok(added)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Tier;
    use crate::store::MemoryStore;

    fn make_position(condition_id: &str, slug: &str) -> ApiPosition {
        ApiPosition {
            condition_id: condition_id.to_string(),
            slug: Some(slug.to_string()),
            title: Some(format!("Question {condition_id}?")),
            ..ApiPosition::default()
        }
    }

    #[test]
    fn test_copy_skips_incomplete_and_duplicate_positions() {
        let store = MemoryStore::new();
        let positions = vec![
            make_position("0xa", "market-a"),
            make_position("", "no-condition"),
            ApiPosition {
                condition_id: "0xb".to_string(),
                slug: None,
                ..ApiPosition::default()
            },
            make_position("0xa", "market-a-again"),
            make_position("0xc", "market-c"),
        ];

        let added = copy_positions_to_watchlist(&store, &positions);
        assert_eq!(added, 2);

        let list = store.watchlist();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].condition_id, "0xc");
        assert_eq!(list[1].condition_id, "0xa");
        assert_eq!(list[1].slug, "market-a", "first add wins over the duplicate");
    }

    #[test]
    fn test_copy_uses_slug_when_title_missing() {
        let store = MemoryStore::new();
        let position = ApiPosition {
            condition_id: "0xa".to_string(),
            slug: Some("the-slug".to_string()),
            title: None,
            ..ApiPosition::default()
        };
        copy_positions_to_watchlist(&store, &[position]);
        assert_eq!(store.watchlist()[0].question, "the-slug");
    }

    #[tokio::test]
    async fn test_copy_portfolio_gated_below_team() {
        let store = MemoryStore::with_tier(Tier::Pro);
        let client = DataClient::new(reqwest::Client::new()).with_base_url("http://127.0.0.1:1");
        let err = copy_portfolio(&client, &store, "0xwhale").await.unwrap_err();
        assert!(matches!(err, WatchlistError::NotEntitled));
    }
}
