use clap::Parser;
use std::time::Duration;

// CLI argument structure, every flag can also come from the environment
#[derive(Parser, Debug, Clone)]
#[command(name = "weather-proxy")]
#[command(about = "Rate limited proxy for the OpenWeatherMap API")]
pub struct Config {
    // Credential injected into every upstream request
    #[arg(long, env = "API_KEY", hide_env_values = true)]
    pub api_key: String,

    // Port to run the server on
    #[arg(short, long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    // Upstream base url, endpoint paths are appended to it
    #[arg(
        long,
        env = "UPSTREAM_URL",
        default_value = "https://api.openweathermap.org/data/2.5"
    )]
    pub upstream_url: String,

    // Upstream request timeout in seconds
    #[arg(
        long,
        env = "UPSTREAM_TIMEOUT",
        default_value_t = 10,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub upstream_timeout: u64,

    // Rate limit max requests per window
    #[arg(long, env = "RATE_LIMIT", default_value_t = 50)]
    pub rate_limit: u32,

    // Rate limit window in seconds
    #[arg(
        long,
        env = "RATE_WINDOW",
        default_value_t = 900,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub rate_window: u64,

    // Log the approximate location of each caller
    #[arg(long, env = "GEO_LOOKUP", default_value_t = false)]
    pub geo_lookup: bool,

    // IP geolocation service, the client ip is appended as a path segment
    #[arg(long, env = "GEO_URL", default_value = "http://ip-api.com/json")]
    pub geo_url: String,
}

impl Config {
    pub fn rate_window(&self) -> Duration {
        Duration::from_secs(self.rate_window)
    }

    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout)
    }
}
