//! Request metrics middleware.

use std::time::Instant;

use axum::{body::Body, http::Request, middleware::Next, response::Response};

use crate::observability::metrics;

pub async fn metrics_middleware(req: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().clone();

    let response = next.run(req).await;

    metrics::record_request(method.as_str(), response.status().as_u16(), start);
    response
}
