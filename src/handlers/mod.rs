mod health;
mod metrics;
mod weather;

pub use health::health_handler;
pub use metrics::metrics_handler;
pub use weather::{forecast_handler, weather_handler, WeatherQuery};
