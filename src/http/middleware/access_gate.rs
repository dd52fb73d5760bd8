//! Access gate middleware.
//! Turns an access decision into "continue" or a login redirect.
//!
//! Dot segments are resolved before the decision, and an allowed request
//! continues with the resolved URI so the upstream sees the judged path.

use std::borrow::Cow;

use axum::{
    body::Body,
    extract::State,
    http::{header, uri::PathAndQuery, Request, StatusCode, Uri},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::access::{normalize_path, Decision};
use crate::http::request::request_id;
use crate::http::server::AppState;
use crate::observability::metrics;

pub async fn access_gate_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let runtime = state.runtime.load_full();

    let normalized = match normalize_path(req.uri().path()) {
        Cow::Borrowed(_) => None,
        Cow::Owned(path) => Some(path),
    };
    if let Some(normalized) = normalized {
        match with_path(req.uri(), &normalized) {
            Ok(uri) => {
                tracing::debug!(
                    request_id = %request_id(req.headers()),
                    from = %req.uri().path(),
                    to = %normalized,
                    "Resolved dot segments"
                );
                *req.uri_mut() = uri;
            }
            Err(_) => return StatusCode::BAD_REQUEST.into_response(),
        }
    }
    let path = req.uri().path();

    // Static assets and other pre-filtered paths never reach the policy.
    let Some(decision) = runtime.gate.check(path, req.headers()) else {
        return next.run(req).await;
    };
    metrics::record_decision(decision.as_str());

    match decision {
        Decision::Allow => {
            tracing::debug!(
                request_id = %request_id(req.headers()),
                path = %path,
                "Access allowed"
            );
            next.run(req).await
        }
        Decision::Redirect(location) => {
            tracing::info!(
                request_id = %request_id(req.headers()),
                path = %path,
                location = %location,
                "No session credential, redirecting to login"
            );
            redirect(runtime.gate.redirect_status, location)
        }
    }
}

/// Replace the path of `uri`, keeping its query.
fn with_path(uri: &Uri, path: &str) -> Result<Uri, axum::http::Error> {
    let path_and_query = match uri.query() {
        Some(query) => format!("{path}?{query}"),
        None => path.to_owned(),
    };
    let mut parts = uri.clone().into_parts();
    parts.path_and_query = Some(PathAndQuery::try_from(path_and_query)?);
    Ok(Uri::from_parts(parts)?)
}

/// Build a redirect response with the configured status.
pub fn redirect(status: u16, location: &str) -> Response {
    let status = match status {
        302 => StatusCode::FOUND,
        _ => StatusCode::TEMPORARY_REDIRECT,
    };
    (status, [(header::LOCATION, location)]).into_response()
}
