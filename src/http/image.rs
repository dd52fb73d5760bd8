//! Image proxy handler.
//!
//! `GET /api/image-proxy?url=<absolute-url>` fetches a remote image and
//! returns its bytes with the upstream content type. Bytes are passed through
//! untouched.
//!
//! Redirects are not followed: the host check only covers the URL it was
//! given, so a 3xx answer is reported as an upstream error.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::config::ImageProxyConfig;
use crate::observability::metrics;

pub const IMAGE_PROXY_PATH: &str = "/api/image-proxy";

/// Reasons an image request is refused.
#[derive(Debug, Error)]
pub enum ImageProxyError {
    #[error("missing url parameter")]
    MissingUrl,

    #[error("invalid url: {0}")]
    InvalidUrl(String),

    #[error("host {0:?} is not allowed")]
    HostNotAllowed(String),

    #[error("fetch failed: {0}")]
    Fetch(#[from] reqwest::Error),

    #[error("upstream returned status {0}")]
    UpstreamStatus(u16),

    #[error("content type {0:?} is not an image")]
    NotAnImage(String),

    #[error("image exceeds {0} bytes")]
    TooLarge(usize),
}

impl ImageProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            ImageProxyError::MissingUrl | ImageProxyError::InvalidUrl(_) => StatusCode::BAD_REQUEST,
            ImageProxyError::HostNotAllowed(_) => StatusCode::FORBIDDEN,
            ImageProxyError::Fetch(e) if e.is_timeout() => StatusCode::GATEWAY_TIMEOUT,
            ImageProxyError::Fetch(_) | ImageProxyError::UpstreamStatus(_) => StatusCode::BAD_GATEWAY,
            ImageProxyError::NotAnImage(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ImageProxyError::TooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            ImageProxyError::MissingUrl | ImageProxyError::InvalidUrl(_) => "bad_request",
            ImageProxyError::HostNotAllowed(_) => "forbidden",
            ImageProxyError::Fetch(_) | ImageProxyError::UpstreamStatus(_) => "upstream_error",
            ImageProxyError::NotAnImage(_) => "not_image",
            ImageProxyError::TooLarge(_) => "too_large",
        }
    }
}

impl IntoResponse for ImageProxyError {
    fn into_response(self) -> Response {
        metrics::record_image_proxy(self.label());
        (self.status(), self.to_string()).into_response()
    }
}

/// A fetched image.
#[derive(Debug, Clone)]
pub struct FetchedImage {
    pub content_type: String,
    pub bytes: Bytes,
}

/// Fetches remote images on behalf of admin pages.
pub struct ImageProxy {
    client: reqwest::Client,
    config: ImageProxyConfig,
}

impl ImageProxy {
    pub fn new(config: ImageProxyConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.fetch_timeout_secs))
            .redirect(reqwest::redirect::Policy::none())
            .build()?;
        Ok(Self { client, config })
    }

    /// Check that `raw` is an absolute http(s) URL on an allowed host.
    pub fn parse_target(&self, raw: &str) -> Result<Url, ImageProxyError> {
        let url = Url::parse(raw).map_err(|e| ImageProxyError::InvalidUrl(e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ImageProxyError::InvalidUrl(format!(
                "unsupported scheme {:?}",
                url.scheme()
            )));
        }

        let host = url
            .host_str()
            .ok_or_else(|| ImageProxyError::InvalidUrl("missing host".to_string()))?;
        if !self.config.allowed_hosts.is_empty()
            && !self
                .config
                .allowed_hosts
                .iter()
                .any(|allowed| allowed.eq_ignore_ascii_case(host))
        {
            return Err(ImageProxyError::HostNotAllowed(host.to_string()));
        }

        Ok(url)
    }

    pub async fn fetch(&self, target: Url) -> Result<FetchedImage, ImageProxyError> {
        let mut response = self.client.get(target).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ImageProxyError::UpstreamStatus(status.as_u16()));
        }

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        if !content_type.starts_with("image/") {
            return Err(ImageProxyError::NotAnImage(content_type));
        }

        let max = self.config.max_bytes;
        if response.content_length().is_some_and(|len| len > max as u64) {
            return Err(ImageProxyError::TooLarge(max));
        }

        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await? {
            if body.len() + chunk.len() > max {
                return Err(ImageProxyError::TooLarge(max));
            }
            body.extend_from_slice(&chunk);
        }

        Ok(FetchedImage {
            content_type,
            bytes: Bytes::from(body),
        })
    }

    fn cache_control(&self) -> HeaderValue {
        HeaderValue::from_str(&format!(
            "public, max-age={}",
            self.config.cache_max_age_secs
        ))
        .unwrap_or_else(|_| HeaderValue::from_static("no-store"))
    }
}

#[derive(Debug, Deserialize)]
pub struct ImageQuery {
    pub url: Option<String>,
}

pub async fn image_proxy_handler(
    State(proxy): State<Arc<ImageProxy>>,
    Query(query): Query<ImageQuery>,
) -> Result<Response, ImageProxyError> {
    let raw = query
        .url
        .filter(|u| !u.trim().is_empty())
        .ok_or(ImageProxyError::MissingUrl)?;
    let target = proxy.parse_target(&raw)?;

    tracing::debug!(target = %target, "Proxying image");
    let image = proxy.fetch(target).await.inspect_err(|e| {
        tracing::warn!(error = %e, "Image proxy fetch refused");
    })?;

    metrics::record_image_proxy("ok");
    let content_type = HeaderValue::from_str(&image.content_type)
        .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream"));
    Ok((
        [
            (header::CONTENT_TYPE, content_type),
            (header::CACHE_CONTROL, proxy.cache_control()),
        ],
        image.bytes,
    )
        .into_response())
}
