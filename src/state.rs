use std::sync::Arc;

use crate::config::Config;
use crate::error::StartupError;
use crate::geolocation::GeoLocator;
use crate::rate_limit::RateLimiter;
use crate::upstream::Upstream;

// app's shared state

pub struct AppState {
    pub upstream: Upstream,
    pub rate_limiter: Arc<RateLimiter>,
    pub geolocator: Option<GeoLocator>, // None when location logging is off
}

impl AppState {
    pub fn new(config: &Config) -> Result<Self, StartupError> {
        let upstream = Upstream::new(
            &config.upstream_url,
            config.api_key.clone(),
            config.upstream_timeout(),
        )?;

        let geolocator = if config.geo_lookup {
            Some(GeoLocator::new(&config.geo_url)?)
        } else {
            None
        };

        Ok(Self {
            upstream,
            rate_limiter: Arc::new(RateLimiter::new(config.rate_limit, config.rate_window())),
            geolocator,
        })
    }
}
