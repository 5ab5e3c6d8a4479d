use reqwest::Client;

use super::data_client::decode_response;
use super::types::GammaMarket;
use super::FeedError;

const GAMMA_API_BASE: &str = "https://gamma-api.polymarket.com";

/// Parameters for `GET /markets` on the Gamma API.
#[derive(Debug, Clone, Default)]
pub struct MarketQuery {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
    pub active: Option<bool>,
    pub closed: Option<bool>,
    pub category: Option<String>,
}

impl MarketQuery {
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(v) = self.limit {
            pairs.push(("limit", v.to_string()));
        }
        if let Some(v) = self.offset {
            pairs.push(("offset", v.to_string()));
        }
        if let Some(v) = self.active {
            pairs.push(("active", v.to_string()));
        }
        if let Some(v) = self.closed {
            pairs.push(("closed", v.to_string()));
        }
        if let Some(v) = &self.category {
            pairs.push(("category", v.clone()));
        }
        pairs
    }
}

#[derive(Debug, Clone)]
pub struct GammaClient {
    http: Client,
    base_url: String,
}

impl GammaClient {
    pub fn new(http: Client) -> Self {
        Self {
            http,
            base_url: GAMMA_API_BASE.into(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Fetch markets with optional active/closed/category filters.
    pub async fn get_markets(&self, query: &MarketQuery) -> Result<Vec<GammaMarket>, FeedError> {
        let url = format!("{}/markets", self.base_url);
        let resp = self.http.get(&url).query(&query.query_pairs()).send().await?;
        decode_response(resp).await
    }
}
