use axum::body::Body;
use axum::extract::{RawQuery, State};
use axum::http::header::{CACHE_CONTROL, CONTENT_TYPE};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::AppState;

/// Edge/cache-friendly directive copied onto every proxied response.
const PROXY_CACHE_CONTROL: &str = "s-maxage=15, stale-while-revalidate=120";

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

pub async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    let body = state.metrics_handle.render();
    ([(CONTENT_TYPE, "text/plain; version=0.0.4")], body)
}

pub async fn trades(State(state): State<AppState>, RawQuery(query): RawQuery) -> Response {
    let base = state.config.data_api_base.clone();
    forward(&state, &base, "/trades", query.as_deref()).await
}

pub async fn positions(State(state): State<AppState>, RawQuery(query): RawQuery) -> Response {
    let base = state.config.data_api_base.clone();
    forward(&state, &base, "/positions", query.as_deref()).await
}

pub async fn markets(State(state): State<AppState>, RawQuery(query): RawQuery) -> Response {
    let base = state.config.gamma_api_base.clone();
    forward(&state, &base, "/markets", query.as_deref()).await
}

/// Pure pass-through: the query string is forwarded verbatim, the upstream
/// status and content-type come back untouched. No body inspection.
async fn forward(state: &AppState, base: &str, path: &str, query: Option<&str>) -> Response {
    let url = match query {
        Some(q) if !q.is_empty() => format!("{base}{path}?{q}"),
        _ => format!("{base}{path}"),
    };

    let upstream = match state
        .http
        .get(&url)
        .header(reqwest::header::ACCEPT, "application/json")
        .send()
        .await
    {
        Ok(resp) => resp,
        Err(e) => {
            tracing::warn!(url = %url, error = %e, "Proxy: upstream request failed");
            return bad_gateway(&e.to_string());
        }
    };

    let status =
        StatusCode::from_u16(upstream.status().as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
    let content_type = upstream
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("application/json")
        .to_string();

    let body = match upstream.text().await {
        Ok(body) => body,
        Err(e) => {
            tracing::warn!(url = %url, error = %e, "Proxy: failed to read upstream body");
            return bad_gateway(&e.to_string());
        }
    };

    Response::builder()
        .status(status)
        .header(CONTENT_TYPE, content_type)
        .header(CACHE_CONTROL, PROXY_CACHE_CONTROL)
        .body(Body::from(body))
        .unwrap_or_else(|_| StatusCode::BAD_GATEWAY.into_response())
}

fn bad_gateway(message: &str) -> Response {
    (
        StatusCode::BAD_GATEWAY,
        Json(json!({ "error": message })),
    )
        .into_response()
}
