use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

// ---------------------------------------------------------------------------
// Trade (Data API)
// ---------------------------------------------------------------------------

/// A single fill from the public trade tape, newest-first as served.
///
/// Sizes and prices arrive as JSON floats; missing numerics decode to zero so
/// a sparse record never poisons an aggregation pass.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApiTrade {
    pub proxy_wallet: String,
    pub side: String,
    pub asset: String,
    pub condition_id: String,
    pub size: f64,
    pub price: f64,
    /// Unix seconds.
    pub timestamp: i64,
    pub title: Option<String>,
    pub slug: Option<String>,
    pub icon: Option<String>,
    pub event_slug: Option<String>,
    pub outcome: Option<String>,
    pub outcome_index: Option<i64>,
    pub name: Option<String>,
    pub pseudonym: Option<String>,
    pub transaction_hash: Option<String>,
}

// ---------------------------------------------------------------------------
// Position (Data API)
// ---------------------------------------------------------------------------

/// A wallet's position snapshot for one market outcome. Each fetch returns a
/// fresh snapshot; snapshots are replaced wholesale, never merged.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApiPosition {
    pub proxy_wallet: String,
    pub condition_id: String,
    pub size: f64,
    pub avg_price: f64,
    pub initial_value: f64,
    pub current_value: f64,
    pub cash_pnl: f64,
    pub percent_pnl: f64,
    pub realized_pnl: f64,
    pub percent_realized_pnl: f64,
    pub cur_price: f64,
    pub redeemable: bool,
    pub mergeable: bool,
    pub title: Option<String>,
    pub slug: Option<String>,
    pub icon: Option<String>,
    pub event_slug: Option<String>,
    pub outcome: Option<String>,
    pub opposite_outcome: Option<String>,
    pub end_date: Option<String>,
    pub negative_risk: Option<bool>,
}

// ---------------------------------------------------------------------------
// Market (Gamma API)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GammaMarket {
    pub id: String,
    pub condition_id: String,
    pub question: String,
    pub slug: Option<String>,
    pub description: Option<String>,
    /// JSON array of outcome labels, e.g. `["Yes","No"]`, serialized as a string.
    pub outcomes: Option<String>,
    /// Stringified JSON array of outcome prices, e.g. `["0.62","0.38"]`.
    pub outcome_prices: Option<String>,
    pub volume: Option<String>,
    pub volume24hr: Option<f64>,
    pub liquidity: Option<String>,
    pub active: Option<bool>,
    pub closed: Option<bool>,
    pub category: Option<String>,
    pub end_date: Option<String>,
    pub start_date: Option<String>,
}

impl GammaMarket {
    /// Parse the stringified outcomes into a Vec of labels.
    pub fn parse_outcomes(&self) -> Vec<String> {
        self.outcomes
            .as_deref()
            .and_then(|s| serde_json::from_str::<Vec<String>>(s).ok())
            .unwrap_or_default()
    }

    /// Parse the stringified outcome prices.
    pub fn parse_outcome_prices(&self) -> Vec<Decimal> {
        self.outcome_prices
            .as_deref()
            .and_then(|s| serde_json::from_str::<Vec<String>>(s).ok())
            .map(|v| {
                v.iter()
                    .filter_map(|p| Decimal::from_str(p).ok())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Total volume as a decimal; the Gamma API serves it as a string.
    pub fn volume_decimal(&self) -> Decimal {
        self.volume
            .as_deref()
            .and_then(|v| Decimal::from_str(v).ok())
            .unwrap_or(Decimal::ZERO)
    }
}
