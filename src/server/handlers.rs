/*
 * Copyright 2026 Registry Mock Team
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 * You may obtain a copy of the License at
 *
 *     http://www.apache.org/licenses/LICENSE-2.0
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the License for the specific language governing permissions and
 * limitations under the License.
 */

use crate::error::{Error, Result};
use crate::mock::{preflight_headers, MockRequest, MockResponse};
use crate::registry::{
    resolve_deployment, spec_name_from_header, DeploymentPath, ResourceName, SpecPath, STYLE_LABEL,
};
use crate::server::app::AppState;
use crate::server::openapi::{
    ErrorResponse, GraphQlError, GraphQlErrorResponse, HealthResponse,
};
use crate::server::render::viewer_page;
use crate::spec::{inject_endpoints, ApiFormat, EndpointCandidates, SpecDocument};
use crate::telemetry::metrics::{record_error, record_latency, record_registry_call, record_request};
use actix_web::http::header;
use actix_web::http::{Method, StatusCode};
use actix_web::web;
use actix_web::HttpRequest;
use actix_web::HttpResponse;
use actix_web::Responder;
use serde::Deserialize;
use std::collections::HashMap;
use std::future::Future;
use std::time::Instant;
use tracing::{info, warn};

#[derive(Debug, Default, Deserialize)]
pub struct EndpointQuery {
    pub endpoint_uri: Option<String>,
}

impl EndpointQuery {
    fn endpoint(self) -> Option<String> {
        self.endpoint_uri.filter(|e| !e.trim().is_empty())
    }
}

#[utoipa::path(
    get,
    path = "/healthz",
    tag = "System",
    responses(
        (status = 200, description = "Server is healthy", body = HealthResponse)
    )
)]
pub async fn health_handler() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        service: "registry-mock".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

/// Times `work`, records request metrics against the matched route, and
/// turns a failure into its error response.
async fn observe<F>(req: &HttpRequest, work: F) -> HttpResponse
where
    F: Future<Output = Result<HttpResponse>>,
{
    let start_time = Instant::now();
    let request_id = uuid::Uuid::new_v4().to_string();
    let method = req.method().to_string();
    let route = req
        .match_pattern()
        .unwrap_or_else(|| req.path().to_string());

    tracing::debug!(
        method = %method,
        path = %req.path(),
        request_id = %request_id,
        "Processing request"
    );

    let result = work.await;
    let latency = start_time.elapsed().as_millis() as f64;

    match result {
        Ok(response) => {
            record_request(&method, &route, response.status().as_u16());
            record_latency(&method, &route, latency);
            response
        }
        Err(e) => {
            let response = error_response(&e, &request_id);
            let status = response.status();

            record_request(&method, &route, status.as_u16());
            record_latency(&method, &route, latency);
            record_error(&method, &route, e.kind());

            if status.is_server_error() {
                tracing::error!(
                    request_id = %request_id,
                    error = %e,
                    latency_ms = latency,
                    "Request processing failed"
                );
            } else {
                warn!(
                    request_id = %request_id,
                    error = %e,
                    latency_ms = latency,
                    "Request rejected"
                );
            }
            response
        }
    }
}

pub fn error_response(error: &Error, request_id: &str) -> HttpResponse {
    match error {
        Error::SchemaExecution(messages) => {
            HttpResponse::BadRequest().json(GraphQlErrorResponse {
                data: None,
                errors: messages
                    .iter()
                    .map(|message| GraphQlError {
                        message: message.clone(),
                    })
                    .collect(),
            })
        }
        _ => HttpResponse::build(error.status_code()).json(ErrorResponse {
            error: error.to_string(),
            request_id: request_id.to_string(),
        }),
    }
}

fn with_endpoint(location: String, endpoint: Option<&str>) -> String {
    match endpoint {
        Some(endpoint) => {
            let query = url::form_urlencoded::Serializer::new(String::new())
                .append_pair("endpoint_uri", endpoint)
                .finish();
            format!("{}?{}", location, query)
        }
        None => location,
    }
}

fn redirect(location: &str) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, location))
        .finish()
}

/// Format of a spec, consulting the parent api's style label only when the
/// MIME type says nothing.
async fn detect_format(state: &AppState, name: &ResourceName, mime_type: &str) -> Result<ApiFormat> {
    let registry = state.registry.clone();
    let api_name = name.api_name();

    ApiFormat::detect(mime_type, move || async move {
        let api = registry.get_api(api_name.as_str()).await;
        record_registry_call("GetApi", api.is_ok());
        Ok::<_, Error>(api?.labels.get(STYLE_LABEL).cloned())
    })
    .await
}

pub async fn render_spec_handler(
    req: HttpRequest,
    path: web::Path<SpecPath>,
    query: web::Query<EndpointQuery>,
    data: web::Data<AppState>,
) -> HttpResponse {
    observe(&req, render_spec(&data, path.into_inner(), query.into_inner())).await
}

async fn render_spec(state: &AppState, path: SpecPath, query: EndpointQuery) -> Result<HttpResponse> {
    let name = path.resource_name()?;

    let spec = state.registry.get_api_spec(name.as_str()).await;
    record_registry_call("GetApiSpec", spec.is_ok());
    let spec = spec?;

    let format = detect_format(state, &name, &spec.mime_type).await?;
    let spec_url = with_endpoint(format!("/spec/{}/{}", format, name), query.endpoint().as_deref());

    info!(spec = %name, format = %format, "Rendering spec");

    let mock_url = match state.config.mock.static_endpoint(format.as_str()) {
        Some(endpoint) => endpoint.to_string(),
        None => format!("/{}", name),
    };

    match viewer_page(format, name.as_str(), &spec_url, &mock_url) {
        Some(page) => Ok(HttpResponse::Ok()
            .content_type("text/html; charset=utf-8")
            .body(page)),
        None => Ok(redirect(&spec_url)),
    }
}

pub async fn render_deployment_handler(
    req: HttpRequest,
    path: web::Path<DeploymentPath>,
    data: web::Data<AppState>,
) -> HttpResponse {
    observe(&req, render_deployment(&data, path.into_inner())).await
}

async fn render_deployment(state: &AppState, path: DeploymentPath) -> Result<HttpResponse> {
    let name = path.resource_name()?;
    let resolved = resolve_deployment(state.registry.as_ref(), &name).await?;

    let endpoint = Some(resolved.deployment.endpoint_uri.as_str()).filter(|e| !e.is_empty());
    let location = with_endpoint(format!("/render/{}", resolved.spec_revision), endpoint);
    Ok(redirect(&location))
}

pub async fn spec_contents_handler(
    req: HttpRequest,
    path: web::Path<SpecPath>,
    query: web::Query<EndpointQuery>,
    data: web::Data<AppState>,
) -> HttpResponse {
    let format = ApiFormat::from_path_segment(req.match_info().get("format").unwrap_or(""));
    observe(
        &req,
        spec_contents(&data, format, path.into_inner(), query.into_inner()),
    )
    .await
}

async fn spec_contents(
    state: &AppState,
    format: ApiFormat,
    path: SpecPath,
    query: EndpointQuery,
) -> Result<HttpResponse> {
    let name = path.resource_name()?;
    let contents = state.cache.get_spec_content(&name).await?;

    if format != ApiFormat::OpenApi {
        let content_type = if contents.content_type.is_empty() {
            mime::APPLICATION_OCTET_STREAM.as_ref()
        } else {
            contents.content_type.as_str()
        };
        return Ok(HttpResponse::Ok()
            .insert_header((header::CONTENT_TYPE, content_type))
            .body(contents.data));
    }

    let mock = &state.config.mock;
    let document = SpecDocument::parse(name.as_str(), &contents.data)?;
    let candidates = EndpointCandidates::collect(
        state.registry.as_ref(),
        &name,
        query.endpoint(),
        &mock.mock_endpoint_artifact,
        mock.static_endpoint(ApiFormat::OpenApi.as_str()).map(str::to_string),
    )
    .await;

    let injected = inject_endpoints(document, &candidates);
    Ok(HttpResponse::Ok().json(injected.value()))
}

pub async fn not_found_handler() -> HttpResponse {
    HttpResponse::NotFound().finish()
}

fn header_map(req: &HttpRequest) -> HashMap<String, String> {
    req.headers()
        .iter()
        .map(|(k, v)| (k.as_str().to_string(), v.to_str().unwrap_or("").to_string()))
        .collect()
}

/// The API path a mock request addresses: whatever follows the coordinate.
fn api_path(req: &HttpRequest) -> String {
    let tail = req.match_info().get("tail").unwrap_or("");
    format!("/{}", tail.trim_start_matches('/'))
}

fn mock_request(req: &HttpRequest, body: web::Bytes) -> MockRequest {
    MockRequest {
        method: req.method().to_string(),
        path: api_path(req),
        query: req.query_string().to_string(),
        headers: header_map(req),
        body: body.to_vec(),
    }
}

fn into_http_response(response: MockResponse) -> HttpResponse {
    let mut http_response = HttpResponse::build(
        StatusCode::from_u16(response.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
    );

    for (key, value) in response.headers {
        http_response.insert_header((key, value));
    }

    http_response.body(response.body)
}

fn preflight(req: &HttpRequest) -> HttpResponse {
    let mut response = HttpResponse::Ok();
    for (key, value) in preflight_headers(&header_map(req)) {
        response.insert_header((key, value));
    }
    response.finish()
}

async fn serve_mock(
    state: &AppState,
    name: &ResourceName,
    req: &HttpRequest,
    body: web::Bytes,
) -> Result<HttpResponse> {
    let contents = state.cache.get_spec_content(name).await?;
    let request = mock_request(req, body);
    let response = state
        .mock_engine
        .respond(name, &contents, &request)
        .await?;
    Ok(into_http_response(response))
}

pub async fn mock_spec_handler(
    req: HttpRequest,
    path: web::Path<SpecPath>,
    body: web::Bytes,
    data: web::Data<AppState>,
) -> HttpResponse {
    observe(&req, async {
        if req.method() == Method::HEAD {
            return Ok(preflight(&req));
        }
        let name = path.into_inner().resource_name()?;
        serve_mock(&data, &name, &req, body).await
    })
    .await
}

pub async fn mock_deployment_handler(
    req: HttpRequest,
    path: web::Path<DeploymentPath>,
    body: web::Bytes,
    data: web::Data<AppState>,
) -> HttpResponse {
    observe(&req, async {
        if req.method() == Method::HEAD {
            return Ok(preflight(&req));
        }
        let name = path.into_inner().resource_name()?;
        let resolved = resolve_deployment(data.registry.as_ref(), &name).await?;
        serve_mock(&data, &resolved.spec_revision, &req, body).await
    })
    .await
}

pub async fn mock_header_handler(
    req: HttpRequest,
    body: web::Bytes,
    data: web::Data<AppState>,
) -> HttpResponse {
    observe(&req, async {
        if req.method() == Method::HEAD {
            return Ok(preflight(&req));
        }
        let coordinate = req
            .headers()
            .get(data.config.mock.header_name.as_str())
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");
        let name = spec_name_from_header(coordinate)?;
        serve_mock(&data, &name, &req, body).await
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;
    use actix_web::test as actix_test;

    #[actix_web::test]
    async fn test_health_handler() {
        let resp = health_handler().await;
        let resp = resp.respond_to(&actix_test::TestRequest::default().to_http_request());
        assert_eq!(resp.status(), 200);
        assert_eq!(
            resp.headers().get("content-type").unwrap(),
            "application/json"
        );
    }

    #[actix_web::test]
    async fn test_schema_execution_error_body() {
        let err = Error::SchemaExecution(vec!["Unknown field \"missing\"".to_string()]);
        let resp = error_response(&err, "req-1");
        assert_eq!(resp.status(), 400);

        let body = to_bytes(resp.into_body()).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"data": null, "errors": [{"message": "Unknown field \"missing\""}]})
        );
    }

    #[actix_web::test]
    async fn test_registry_error_body() {
        let err = Error::NotFound("projects/p/locations/l/apis/a".to_string());
        let resp = error_response(&err, "req-2");
        assert_eq!(resp.status(), 500);

        let body = to_bytes(resp.into_body()).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["request_id"], "req-2");
        assert_eq!(
            body["error"],
            "Resource not found: projects/p/locations/l/apis/a"
        );
    }

    #[test]
    fn test_with_endpoint_encodes_query() {
        assert_eq!(
            with_endpoint("/render/x".to_string(), Some("http://h:8080/a b")),
            "/render/x?endpoint_uri=http%3A%2F%2Fh%3A8080%2Fa+b"
        );
        assert_eq!(with_endpoint("/render/x".to_string(), None), "/render/x");
    }

    #[test]
    fn test_empty_endpoint_query_is_ignored() {
        let query = EndpointQuery {
            endpoint_uri: Some("  ".to_string()),
        };
        assert_eq!(query.endpoint(), None);
    }

    #[test]
    fn test_preflight_echoes_origin() {
        let req = actix_test::TestRequest::default()
            .method(Method::HEAD)
            .insert_header(("Origin", "https://portal.example"))
            .to_http_request();
        let resp = preflight(&req);

        assert_eq!(resp.status(), 200);
        assert_eq!(
            resp.headers().get("access-control-allow-origin").unwrap(),
            "https://portal.example"
        );
        assert_eq!(
            resp.headers().get("access-control-allow-headers").unwrap(),
            "*"
        );
    }

    #[test]
    fn test_mock_response_conversion() {
        let response = into_http_response(MockResponse::json(201, &serde_json::json!({"id": 1})));
        assert_eq!(response.status(), 201);
        assert_eq!(
            response.headers().get("content-type").unwrap(),
            "application/json"
        );
    }
}
