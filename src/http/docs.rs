//! API documentation handlers.
//!
//! `/api/docs` serves an OpenAPI 3.0 document for the routes the gate owns;
//! `/swagger` serves a Swagger UI page that renders it.

use std::sync::Arc;

use axum::{extract::State, response::Html, routing::get, Json, Router};
use serde_json::{json, Value};

use crate::config::DocsConfig;
use crate::http::image::IMAGE_PROXY_PATH;

pub const DOCS_JSON_PATH: &str = "/api/docs";
pub const SWAGGER_PATH: &str = "/swagger";

/// OpenAPI document for the gate's own endpoints.
pub fn openapi_document(title: &str) -> Value {
    json!({
        "openapi": "3.0.3",
        "info": {
            "title": title,
            "version": env!("CARGO_PKG_VERSION"),
        },
        "paths": {
            "/api/health": {
                "get": {
                    "summary": "Liveness probe",
                    "responses": { "200": { "description": "Gate is running" } }
                }
            },
            IMAGE_PROXY_PATH: {
                "get": {
                    "summary": "Fetch a remote image and return its bytes",
                    "parameters": [{
                        "name": "url",
                        "in": "query",
                        "required": true,
                        "schema": { "type": "string", "format": "uri" }
                    }],
                    "responses": {
                        "200": { "description": "Image bytes with the upstream content type" },
                        "400": { "description": "Missing or invalid url" },
                        "403": { "description": "Host not allowed" },
                        "413": { "description": "Image too large" },
                        "415": { "description": "Upstream content is not an image" },
                        "502": { "description": "Upstream fetch failed" }
                    }
                }
            },
            DOCS_JSON_PATH: {
                "get": {
                    "summary": "This document",
                    "responses": { "200": { "description": "OpenAPI JSON" } }
                }
            }
        }
    })
}

fn swagger_page(title: &str) -> String {
    format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <title>{title}</title>
  <link rel="stylesheet" href="https://unpkg.com/swagger-ui-dist@5/swagger-ui.css" />
</head>
<body>
  <div id="swagger-ui"></div>
  <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-bundle.js"></script>
  <script>
    window.onload = () => {{
      window.ui = SwaggerUIBundle({{ url: "{DOCS_JSON_PATH}", dom_id: "#swagger-ui" }});
    }};
  </script>
</body>
</html>
"##
    )
}

async fn docs_json(State(config): State<Arc<DocsConfig>>) -> Json<Value> {
    Json(openapi_document(&config.title))
}

async fn swagger_ui(State(config): State<Arc<DocsConfig>>) -> Html<String> {
    Html(swagger_page(&config.title))
}

/// Routes for the documentation handlers.
pub fn docs_router<S>(config: DocsConfig) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new()
        .route(DOCS_JSON_PATH, get(docs_json))
        .route(SWAGGER_PATH, get(swagger_ui))
        .with_state(Arc::new(config))
}
