use axum::{
    Json,
    extract::{Query, State},
};
use serde_json::Value;
use std::sync::Arc;

use crate::error::ApiError;
use crate::metrics::{REQUEST_TOTAL, UPSTREAM_FAILURES};
use crate::state::AppState;
use crate::upstream::Endpoint;

// Raw pairs keep repeated keys from failing extraction with a plain-text 400
pub type QueryPairs = Vec<(String, String)>;

#[derive(Debug, Default)]
pub struct WeatherQuery {
    pub city: Option<String>,
    pub lang: Option<String>,
}

impl WeatherQuery {
    // First non-empty value wins when a key is repeated
    pub fn from_pairs(pairs: QueryPairs) -> Self {
        let mut query = WeatherQuery::default();
        for (key, value) in pairs {
            if value.is_empty() {
                continue;
            }
            let slot = match key.as_str() {
                "city" => &mut query.city,
                "lang" => &mut query.lang,
                _ => continue,
            };
            slot.get_or_insert(value);
        }
        query
    }

    // Empty values count as missing; city is checked before lang
    pub fn validate(&self) -> Result<(&str, &str), ApiError> {
        let city = non_empty(&self.city).ok_or(ApiError::MissingCity)?;
        let lang = non_empty(&self.lang).ok_or(ApiError::MissingLanguage)?;
        Ok((city, lang))
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

pub async fn weather_handler(
    State(state): State<Arc<AppState>>,
    Query(pairs): Query<QueryPairs>,
) -> Result<Json<Value>, ApiError> {
    forward(&state, Endpoint::Weather, &WeatherQuery::from_pairs(pairs)).await
}

pub async fn forecast_handler(
    State(state): State<Arc<AppState>>,
    Query(pairs): Query<QueryPairs>,
) -> Result<Json<Value>, ApiError> {
    forward(&state, Endpoint::Forecast, &WeatherQuery::from_pairs(pairs)).await
}

// Validates the query, calls the provider once and relays its JSON as-is
pub async fn forward(
    state: &AppState,
    endpoint: Endpoint,
    query: &WeatherQuery,
) -> Result<Json<Value>, ApiError> {
    let name = endpoint.path();
    REQUEST_TOTAL.with_label_values(&[name]).inc();

    tracing::info!(
        endpoint = name,
        city = ?query.city,
        lang = ?query.lang,
        "proxy request"
    );

    let (city, lang) = query.validate().map_err(|e| {
        tracing::warn!(endpoint = name, "{}", e);
        e
    })?;

    match state.upstream.fetch(endpoint, city, lang).await {
        Ok(data) => {
            let keys = data.as_object().map_or(0, |o| o.len());
            tracing::info!(endpoint = name, keys, "upstream response received");
            Ok(Json(data))
        }
        Err(source) => {
            UPSTREAM_FAILURES.with_label_values(&[name]).inc();
            tracing::error!(endpoint = name, error = %source, "{}", endpoint.failure_message());
            Err(ApiError::Upstream { endpoint, source })
        }
    }
}
