use reqwest::Client;

use super::types::{ApiPosition, ApiTrade};
use super::{truncate_body, FeedError};
use crate::models::Side;

const DATA_API_BASE: &str = "https://data-api.polymarket.com";

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Which field the `filter_amount` threshold applies to: notional value in
/// USDC (`Cash`) or raw outcome-token size (`Tokens`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountFilter {
    Cash,
    Tokens,
}

impl AmountFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            AmountFilter::Cash => "CASH",
            AmountFilter::Tokens => "TOKENS",
        }
    }
}

/// Parameters for `GET /trades`. Unset fields are omitted from the request
/// entirely, never sent as empty strings.
#[derive(Debug, Clone, Default)]
pub struct TradeQuery {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
    pub user: Option<String>,
    pub market: Option<String>,
    pub side: Option<Side>,
    pub filter_type: Option<AmountFilter>,
    pub filter_amount: Option<u64>,
}

impl TradeQuery {
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(v) = self.limit {
            pairs.push(("limit", v.to_string()));
        }
        if let Some(v) = self.offset {
            pairs.push(("offset", v.to_string()));
        }
        if let Some(v) = &self.user {
            pairs.push(("user", v.clone()));
        }
        if let Some(v) = &self.market {
            pairs.push(("market", v.clone()));
        }
        if let Some(v) = self.side {
            pairs.push(("side", v.as_str().to_string()));
        }
        if let Some(v) = self.filter_type {
            pairs.push(("filterType", v.as_str().to_string()));
        }
        if let Some(v) = self.filter_amount {
            pairs.push(("filterAmount", v.to_string()));
        }
        pairs
    }
}

/// Sort direction for `GET /positions`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// Parameters for `GET /positions`. The wallet address is the one required
/// field; `size_threshold` excludes dust positions.
#[derive(Debug, Clone)]
pub struct PositionQuery {
    pub user: String,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
    pub sort_by: Option<String>,
    pub sort_direction: Option<SortDirection>,
    pub size_threshold: Option<u32>,
}

impl PositionQuery {
    pub fn for_user(user: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            limit: None,
            offset: None,
            sort_by: None,
            sort_direction: None,
            size_threshold: None,
        }
    }

    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("user", self.user.clone())];
        if let Some(v) = self.limit {
            pairs.push(("limit", v.to_string()));
        }
        if let Some(v) = self.offset {
            pairs.push(("offset", v.to_string()));
        }
        if let Some(v) = &self.sort_by {
            pairs.push(("sortBy", v.clone()));
        }
        if let Some(v) = self.sort_direction {
            pairs.push(("sortDirection", v.as_str().to_string()));
        }
        if let Some(v) = self.size_threshold {
            pairs.push(("sizeThreshold", v.to_string()));
        }
        pairs
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct DataClient {
    http: Client,
    base_url: String,
}

impl DataClient {
    pub fn new(http: Client) -> Self {
        Self {
            http,
            base_url: DATA_API_BASE.into(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Fetch trades from the public tape. Server order (newest-first) is
    /// preserved; the client never re-sorts.
    pub async fn get_trades(&self, query: &TradeQuery) -> Result<Vec<ApiTrade>, FeedError> {
        let url = format!("{}/trades", self.base_url);
        let resp = self.http.get(&url).query(&query.query_pairs()).send().await?;
        decode_response(resp).await
    }

    /// Fetch position snapshots for one wallet.
    pub async fn get_positions(
        &self,
        query: &PositionQuery,
    ) -> Result<Vec<ApiPosition>, FeedError> {
        let url = format!("{}/positions", self.base_url);
        let resp = self.http.get(&url).query(&query.query_pairs()).send().await?;
        decode_response(resp).await
    }
}

/// Shared decode path: non-success statuses carry the status code and a
/// truncated body; malformed JSON fails the call rather than panicking.
pub(crate) async fn decode_response<T: serde::de::DeserializeOwned>(
    resp: reqwest::Response,
) -> Result<T, FeedError> {
    let status = resp.status();
    let body = resp.text().await?;
    if !status.is_success() {
        return Err(FeedError::Status {
            status: status.as_u16(),
            body: truncate_body(&body),
        });
    }
    serde_json::from_str(&body).map_err(|e| FeedError::Decode(e.to_string()))
}
