pub mod data_client;
pub mod gamma_client;
pub mod types;

pub use data_client::{AmountFilter, DataClient, PositionQuery, SortDirection, TradeQuery};
pub use gamma_client::{GammaClient, MarketQuery};
pub use types::{ApiPosition, ApiTrade, GammaMarket};

use thiserror::Error;

/// Errors from the read-only feed clients.
///
/// Retry/backoff is deliberately not handled here; the polling cache owns
/// that. A failed call fails once and surfaces its cause.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("request failed ({status}): {body}")]
    Status { status: u16, body: String },

    #[error("unexpected response: {0}")]
    Decode(String),
}

/// Keep the first ~160 chars of an error body for diagnostics.
pub(crate) fn truncate_body(body: &str) -> String {
    body.chars().take(160).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_body_short_passthrough() {
        assert_eq!(truncate_body("oops"), "oops");
    }

    #[test]
    fn test_truncate_body_caps_at_160_chars() {
        let long = "x".repeat(500);
        assert_eq!(truncate_body(&long).len(), 160);
    }
}
