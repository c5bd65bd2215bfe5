use lazy_static::lazy_static;
use prometheus::{
    CounterVec, Gauge, Histogram, IntCounter, register_counter_vec, register_gauge,
    register_histogram, register_int_counter,
};


lazy_static! {
    pub static ref REQUEST_TOTAL: CounterVec = register_counter_vec!(
        "weather_proxy_requests_total",
        "Total number of proxy requests",
        &["endpoint"]
    )
    .unwrap();
    pub static ref RATE_LIMITED: IntCounter = register_int_counter!(
        "weather_proxy_rate_limited_total",
        "Requests rejected by the rate limiter"
    )
    .unwrap();
    pub static ref UPSTREAM_FAILURES: CounterVec = register_counter_vec!(
        "weather_proxy_upstream_failures_total",
        "Upstream calls that failed or returned an unreadable body",
        &["endpoint"]
    )
    .unwrap();
    pub static ref UPSTREAM_LATENCY: Histogram = register_histogram!(
        "weather_proxy_upstream_latency_seconds",
        "Upstream request latency in seconds"
    )
    .unwrap();
    pub static ref RATE_LIMITER_ENTRIES: Gauge = register_gauge!(
        "weather_proxy_rate_limiter_entries",
        "Client ips currently tracked by the rate limiter"
    )
    .unwrap();
}
