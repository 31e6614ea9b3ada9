//! HTTP request tracking middleware for observability

use axum::{extract::Request, http::StatusCode, middleware::Next, response::Response};
use std::time::Instant;

/// Middleware to track HTTP request latency and counts
///
/// The route set is fixed and contains no path parameters, so the raw path
/// is safe as a label. Unmatched paths all 404 and are grouped together.
pub async fn track_metrics(req: Request, next: Next) -> Result<Response, StatusCode> {
    let start = Instant::now();
    let method = req.method().to_string();
    let path = req.uri().path().to_string();

    let response = next.run(req).await;

    let duration = start.elapsed().as_secs_f64();
    let status = response.status().as_u16().to_string();
    let endpoint = if status == "404" { "unmatched" } else { path.as_str() };

    crate::metrics::HTTP_REQUEST_DURATION
        .with_label_values(&[&method, endpoint, &status])
        .observe(duration);

    crate::metrics::HTTP_REQUESTS_TOTAL
        .with_label_values(&[&method, endpoint, &status])
        .inc();

    Ok(response)
}
