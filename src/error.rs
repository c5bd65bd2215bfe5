use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::upstream::Endpoint;

// Failure of a single upstream call, only ever logged
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("request failed: {0}")]
    Request(#[source] reqwest::Error),

    #[error("invalid response body: {0}")]
    Decode(#[source] reqwest::Error),
}

// Errors that stop the server before it starts listening
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid {name} url {value:?}: {source}")]
    InvalidUrl {
        name: &'static str,
        value: String,
        #[source]
        source: url::ParseError,
    },

    #[error("failed to build http client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

// Errors returned to callers of the proxy routes. Display is the exact
// message sent to the client, upstream causes stay in source
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("City is required")]
    MissingCity,

    #[error("Language is required")]
    MissingLanguage,

    #[error("{}", .endpoint.failure_message())]
    Upstream {
        endpoint: Endpoint,
        #[source]
        source: UpstreamError,
    },
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingCity | ApiError::MissingLanguage => StatusCode::BAD_REQUEST,
            ApiError::Upstream { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(serde_json::json!({ "error": self.to_string() }));
        (self.status(), body).into_response()
    }
}
