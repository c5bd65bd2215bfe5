// Best-effort caller location lookup, used only for logging

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use url::Url;

use crate::client_ip::client_ip;
use crate::error::StartupError;
use crate::state::AppState;

const LOOKUP_TIMEOUT_SECS: u64 = 5;

#[derive(Debug, Error)]
pub enum GeoError {
    #[error("lookup request failed: {0}")]
    Request(#[source] reqwest::Error),

    #[error("invalid lookup response: {0}")]
    Decode(#[source] reqwest::Error),

    #[error("lookup rejected: {0}")]
    Lookup(String),
}

// ip-api.com response format
#[derive(Debug, Deserialize)]
struct LookupResponse {
    status: String,
    message: Option<String>,
    city: Option<String>,
    country: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeoLocation {
    pub city: String,
    pub country: String,
    pub lat: f64,
    pub lon: f64,
}

pub struct GeoLocator {
    client: Client,
    base_url: Url,
}

impl GeoLocator {
    pub fn new(base_url: &str) -> Result<Self, StartupError> {
        let base_url = Url::parse(base_url).map_err(|source| StartupError::InvalidUrl {
            name: "geolocation",
            value: base_url.to_string(),
            source,
        })?;
        let client = Client::builder()
            .timeout(Duration::from_secs(LOOKUP_TIMEOUT_SECS))
            .build()?;

        Ok(Self { client, base_url })
    }

    fn url_for(&self, ip: &str) -> Url {
        let mut url = self.base_url.clone();
        // only cannot-be-a-base urls (mailto: and the like) have no segments
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(ip);
        }
        url
    }

    pub async fn lookup(&self, ip: &str) -> Result<GeoLocation, GeoError> {
        let response = self
            .client
            .get(self.url_for(ip))
            .send()
            .await
            .map_err(GeoError::Request)?;

        let body = response
            .json::<LookupResponse>()
            .await
            .map_err(GeoError::Decode)?;

        if body.status != "success" {
            return Err(GeoError::Lookup(
                body.message.unwrap_or_else(|| body.status.clone()),
            ));
        }

        Ok(GeoLocation {
            city: body.city.unwrap_or_default(),
            country: body.country.unwrap_or_default(),
            lat: body.lat.unwrap_or_default(),
            lon: body.lon.unwrap_or_default(),
        })
    }

    // Outcome is only logged, never returned
    pub async fn log_location(&self, ip: &str) {
        match self.lookup(ip).await {
            Ok(location) => tracing::info!(
                client = %ip,
                city = %location.city,
                country = %location.country,
                lat = location.lat,
                lon = location.lon,
                "client location"
            ),
            Err(e) => tracing::warn!(client = %ip, error = %e, "geolocation lookup failed"),
        }
    }
}

pub async fn geolocation_middleware(
    State(state): State<Arc<AppState>>,
    req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(locator) = &state.geolocator {
        locator.log_location(&client_ip(&req)).await;
    }

    next.run(req).await
}
