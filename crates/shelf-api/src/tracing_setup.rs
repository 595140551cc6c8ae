//! Structured logging setup and request logging middleware
//!
//! Logs go through `tracing-subscriber` with an `EnvFilter`; the output is
//! JSON by default or human-readable when the config asks for `pretty`.

use crate::config::{LogFormat, LoggingConfig};
use axum::{
    extract::Request,
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use tracing::{Instrument, debug, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Header carrying the per-request correlation id
pub const REQUEST_ID_HEADER: &str = "x-request-id";

const DEFAULT_FILTER: &str = "shelf_api=debug,shelf_core=debug,tower_http=debug,info";

/// Initialize the global subscriber. Fails if one is already installed.
pub fn init_tracing(config: &LoggingConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.filter.as_deref().unwrap_or(DEFAULT_FILTER)))?;

    let registry = tracing_subscriber::registry().with(filter);
    match config.format {
        LogFormat::Json => {
            registry.with(tracing_subscriber::fmt::layer().json().with_target(false)).try_init()?
        }
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).try_init()?,
    }

    info!(format = ?config.format, "Logging initialized");
    Ok(())
}

/// Assign a request id, log the request line and headers, and echo the id
/// back on the response.
pub async fn request_logging(request: Request, next: Next) -> Response {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    let span = tracing::info_span!(
        "http_request",
        request_id = %request_id,
        method = %request.method(),
        uri = %request.uri(),
    );

    async move {
        log_headers(request.headers());
        let mut response = next.run(request).await;
        debug!(status = response.status().as_u16(), "Request completed");

        if let Ok(value) = HeaderValue::from_str(&request_id) {
            response.headers_mut().insert(REQUEST_ID_HEADER, value);
        }
        response
    }
    .instrument(span)
    .await
}

fn log_headers(headers: &HeaderMap) {
    for (name, value) in headers {
        debug!(header = %name, value = value.to_str().unwrap_or("<binary>"), "Request header");
    }
}
