use std::env;
use std::time::Duration;

use crate::engine::Window;
use crate::models::Tier;

const DEFAULT_DATA_API_BASE: &str = "https://data-api.polymarket.com";
const DEFAULT_GAMMA_API_BASE: &str = "https://gamma-api.polymarket.com";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,

    pub data_api_base: String,
    pub gamma_api_base: String,

    /// Forces the tier regardless of what the store holds.
    pub tier_override: Option<Tier>,
    /// JSON store location; unset runs fully in memory.
    pub store_path: Option<String>,

    pub ranking_window: Window,
    pub feed_timeout: Duration,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".into())
                .parse()?,

            data_api_base: env::var("DATA_API_BASE")
                .unwrap_or_else(|_| DEFAULT_DATA_API_BASE.into()),
            gamma_api_base: env::var("GAMMA_API_BASE")
                .unwrap_or_else(|_| DEFAULT_GAMMA_API_BASE.into()),

            tier_override: env::var("ALPHATAPE_TIER")
                .ok()
                .map(|t| Tier::from_str_lenient(&t)),
            store_path: env::var("ALPHATAPE_STORE").ok(),

            ranking_window: env::var("RANKING_WINDOW")
                .map(|w| Window::from_str_lenient(&w))
                .unwrap_or(Window::Day),
            feed_timeout: Duration::from_secs(
                env::var("FEED_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "12".into())
                    .parse()
                    .unwrap_or(12),
            ),
        })
    }
}
