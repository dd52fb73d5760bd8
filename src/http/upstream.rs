//! Forwarding to the admin panel upstream.
//!
//! # Responsibilities
//! - Rewrite the request URI onto the upstream authority
//! - Carry method, headers, body and request ID unchanged
//! - Map connection failures to 502 Bad Gateway
//!
//! # Design Decisions
//! - Streaming both ways; bodies are never buffered
//! - The upstream address is read from the live snapshot per request,
//!   so a reload retargets new requests only

use std::str::FromStr;
use std::time::Duration;

use axum::{
    body::Body,
    extract::State,
    http::{
        uri::{Authority, PathAndQuery, Scheme},
        Request, StatusCode, Uri,
    },
    response::{IntoResponse, Response},
};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};

use crate::http::request::request_id;
use crate::http::server::AppState;
use crate::observability::metrics;

pub type UpstreamClient = Client<HttpConnector, Body>;

/// HTTP client used for upstream forwarding.
pub fn build_client(connect_timeout: Duration) -> UpstreamClient {
    let mut connector = HttpConnector::new();
    connector.set_connect_timeout(Some(connect_timeout));
    Client::builder(TokioExecutor::new()).build(connector)
}

/// Point `uri` at `upstream`, keeping path and query.
pub fn rewrite_uri(uri: &Uri, upstream: &str) -> Result<Uri, axum::http::Error> {
    let mut parts = uri.clone().into_parts();
    parts.scheme = Some(Scheme::HTTP);
    parts.authority = Some(Authority::from_str(upstream)?);
    if parts.path_and_query.is_none() {
        parts.path_and_query = Some(PathAndQuery::from_static("/"));
    }
    Ok(Uri::from_parts(parts)?)
}

/// Fallback handler: everything the gate allowed and does not serve itself.
pub async fn forward_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let request_id = request_id(request.headers()).to_string();
    let upstream = state.runtime.load().upstream.clone();

    let (mut parts, body) = request.into_parts();

    tracing::debug!(
        request_id = %request_id,
        method = %parts.method,
        path = %parts.uri.path(),
        upstream = %upstream,
        "Forwarding request"
    );

    parts.uri = match rewrite_uri(&parts.uri, &upstream) {
        Ok(uri) => uri,
        Err(e) => {
            tracing::error!(request_id = %request_id, upstream = %upstream, error = %e, "Invalid upstream URI");
            metrics::record_upstream_error(&upstream);
            return (StatusCode::BAD_GATEWAY, "Invalid upstream address").into_response();
        }
    };

    match state.client.request(Request::from_parts(parts, body)).await {
        Ok(response) => {
            let (parts, body) = response.into_parts();
            Response::from_parts(parts, Body::new(body))
        }
        Err(e) => {
            tracing::error!(request_id = %request_id, upstream = %upstream, error = %e, "Upstream error");
            metrics::record_upstream_error(&upstream);
            (StatusCode::BAD_GATEWAY, "Upstream request failed").into_response()
        }
    }
}
