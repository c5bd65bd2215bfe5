use reqwest::Client;
use serde_json::Value;
use std::time::{Duration, Instant};
use url::Url;

use crate::error::{StartupError, UpstreamError};
use crate::metrics::UPSTREAM_LATENCY;

// Unit system sent with every request
pub const UNITS: &str = "metric";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Weather,
    Forecast,
}

impl Endpoint {
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::Weather => "weather",
            Endpoint::Forecast => "forecast",
        }
    }

    pub fn failure_message(&self) -> &'static str {
        match self {
            Endpoint::Weather => "Failed to fetch weather data",
            Endpoint::Forecast => "Failed to fetch forecast data",
        }
    }
}

// Client for the weather provider, holds the credential so callers never see it
pub struct Upstream {
    client: Client,
    base_url: Url,
    api_key: String,
}

impl Upstream {
    pub fn new(base_url: &str, api_key: String, timeout: Duration) -> Result<Self, StartupError> {
        let base_url = Url::parse(base_url).map_err(|source| StartupError::InvalidUrl {
            name: "upstream",
            value: base_url.to_string(),
            source,
        })?;
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url,
            api_key,
        })
    }

    // {base}/{endpoint}?q=..&appid=..&units=metric&lang=..
    pub fn url_for(&self, endpoint: Endpoint, city: &str, lang: &str) -> Url {
        let mut url = self.base_url.clone();
        let path = format!("{}/{}", url.path().trim_end_matches('/'), endpoint.path());
        url.set_path(&path);
        url.query_pairs_mut()
            .clear()
            .append_pair("q", city)
            .append_pair("appid", &self.api_key)
            .append_pair("units", UNITS)
            .append_pair("lang", lang);
        url
    }

    // Single GET, body relayed as whatever JSON the provider returned
    pub async fn fetch(&self, endpoint: Endpoint, city: &str, lang: &str) -> Result<Value, UpstreamError> {
        let url = self.url_for(endpoint, city, lang);
        let start = Instant::now();

        let result = match self.client.get(url).send().await {
            Ok(response) => response.json::<Value>().await.map_err(UpstreamError::Decode),
            Err(e) => Err(UpstreamError::Request(e)),
        };
        // covers headers and body transfer
        UPSTREAM_LATENCY.observe(start.elapsed().as_secs_f64());
        result
    }
}
