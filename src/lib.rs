pub mod cache;
pub mod config;
pub mod engine;
pub mod feed;
pub mod metrics;
pub mod models;
pub mod proxy;
pub mod services;
pub mod store;
pub mod tier;

use crate::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub http: reqwest::Client,
    pub metrics_handle: metrics_exporter_prometheus::PrometheusHandle,
}
