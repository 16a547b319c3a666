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

use serde::Serialize;
use utoipa::OpenApi;
use utoipa::ToSchema;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Registry Mock API",
        description = "Renders API registry specs as documentation and serves them as live mock endpoints",
        version = "0.1.0",
        license(
            name = "Apache-2.0",
            url = "https://www.apache.org/licenses/LICENSE-2.0"
        )
    ),
    paths(
        super::handlers::health_handler,
        render_spec_path,
        render_deployment_path,
        spec_contents_path,
        mock_spec_path,
        mock_deployment_path,
        mock_header_path
    ),
    components(
        schemas(
            HealthResponse,
            ErrorResponse,
            GraphQlErrorResponse
        )
    ),
    tags(
        (name = "System", description = "System endpoints"),
        (name = "Render", description = "Spec documentation and raw spec contents"),
        (name = "Mock", description = "Mock execution against registry specs")
    )
)]
pub struct ApiDoc;

#[utoipa::path(
    get,
    path = "/render/projects/{project}/locations/{location}/apis/{api}/versions/{version}/specs/{spec}",
    tag = "Render",
    params(
        ("project" = String, Path, description = "Project id"),
        ("location" = String, Path, description = "Location id"),
        ("api" = String, Path, description = "Api id"),
        ("version" = String, Path, description = "Version id"),
        ("spec" = String, Path, description = "Spec id"),
        ("endpoint_uri" = Option<String>, Query, description = "Endpoint injected into the rendered spec")
    ),
    responses(
        (status = 200, description = "Interactive viewer page", content_type = "text/html"),
        (status = 302, description = "Redirect to the raw spec for formats without a viewer"),
        (status = 500, description = "Registry failure", body = ErrorResponse)
    )
)]
#[allow(dead_code)]
pub fn render_spec_path() {}

#[utoipa::path(
    get,
    path = "/render/projects/{project}/locations/{location}/apis/{api}/deployments/{deployment}",
    tag = "Render",
    params(
        ("project" = String, Path, description = "Project id"),
        ("location" = String, Path, description = "Location id"),
        ("api" = String, Path, description = "Api id"),
        ("deployment" = String, Path, description = "Deployment id")
    ),
    responses(
        (status = 302, description = "Redirect to the render page of the deployed spec revision"),
        (status = 500, description = "Deployment missing or without an active revision", body = ErrorResponse)
    )
)]
#[allow(dead_code)]
pub fn render_deployment_path() {}

#[utoipa::path(
    get,
    path = "/spec/{format}/projects/{project}/locations/{location}/apis/{api}/versions/{version}/specs/{spec}",
    tag = "Render",
    params(
        ("format" = String, Path, description = "openapi, asyncapi, graphql, discovery or grpc"),
        ("project" = String, Path, description = "Project id"),
        ("location" = String, Path, description = "Location id"),
        ("api" = String, Path, description = "Api id"),
        ("version" = String, Path, description = "Version id"),
        ("spec" = String, Path, description = "Spec id"),
        ("endpoint_uri" = Option<String>, Query, description = "Endpoint injected ahead of all others")
    ),
    responses(
        (status = 200, description = "Spec contents, endpoint-injected for openapi"),
        (status = 404, description = "Method other than GET or POST"),
        (status = 500, description = "Registry failure or unparseable spec", body = ErrorResponse)
    )
)]
#[allow(dead_code)]
pub fn spec_contents_path() {}

#[utoipa::path(
    post,
    path = "/projects/{project}/locations/{location}/apis/{api}/versions/{version}/specs/{spec}/{api_path}",
    tag = "Mock",
    params(
        ("project" = String, Path, description = "Project id"),
        ("location" = String, Path, description = "Location id"),
        ("api" = String, Path, description = "Api id"),
        ("version" = String, Path, description = "Version id"),
        ("spec" = String, Path, description = "Spec id"),
        ("api_path" = String, Path, description = "Path dispatched against the spec, may be empty")
    ),
    responses(
        (status = 200, description = "Mock response synthesized from the spec"),
        (status = 400, description = "GraphQL document rejected by the mocked schema", body = GraphQlErrorResponse),
        (status = 404, description = "No operation matches the path"),
        (status = 500, description = "Registry failure", body = ErrorResponse)
    )
)]
#[allow(dead_code)]
pub fn mock_spec_path() {}

#[utoipa::path(
    post,
    path = "/projects/{project}/locations/{location}/apis/{api}/deployments/{deployment}/{api_path}",
    tag = "Mock",
    params(
        ("project" = String, Path, description = "Project id"),
        ("location" = String, Path, description = "Location id"),
        ("api" = String, Path, description = "Api id"),
        ("deployment" = String, Path, description = "Deployment id"),
        ("api_path" = String, Path, description = "Path dispatched against the spec, may be empty")
    ),
    responses(
        (status = 200, description = "Mock response synthesized from the deployed spec revision"),
        (status = 500, description = "Deployment missing or without an active revision", body = ErrorResponse)
    )
)]
#[allow(dead_code)]
pub fn mock_deployment_path() {}

#[utoipa::path(
    post,
    path = "/mock/{api_path}",
    tag = "Mock",
    params(
        ("api_path" = String, Path, description = "Path dispatched against the spec, may be empty"),
        ("apigee-registry-spec" = String, Header, description = "Spec name, the header name is configurable")
    ),
    responses(
        (status = 200, description = "Mock response synthesized from the spec"),
        (status = 400, description = "Header missing or not a ten-segment spec name", body = ErrorResponse)
    )
)]
#[allow(dead_code)]
pub fn mock_header_path() {}

#[derive(ToSchema, Serialize)]
pub struct HealthResponse {
    #[schema(example = "healthy")]
    pub status: String,
    #[schema(example = "registry-mock")]
    pub service: String,
    #[schema(example = "2026-01-01T00:00:00Z")]
    pub timestamp: String,
}

#[derive(ToSchema, Serialize)]
pub struct ErrorResponse {
    #[schema(example = "Resource not found: projects/p/locations/l/apis/a/versions/v/specs/s")]
    pub error: String,
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub request_id: String,
}

#[derive(ToSchema, Serialize)]
pub struct GraphQlError {
    #[schema(example = "Unknown field \"missing\" on type \"Query\".")]
    pub message: String,
}

/// Body of a rejected GraphQL document.
#[derive(ToSchema, Serialize)]
pub struct GraphQlErrorResponse {
    /// Always null.
    pub data: Option<serde_json::Value>,
    pub errors: Vec<GraphQlError>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_routes() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();

        assert!(paths.iter().any(|p| p.as_str() == "/healthz"));
        assert!(paths.iter().any(|p| p.starts_with("/render/")));
        assert!(paths.iter().any(|p| p.starts_with("/spec/{format}")));
        assert!(paths.iter().any(|p| p.as_str() == "/mock/{api_path}"));
    }

    #[test]
    fn test_graphql_error_shape() {
        let body = serde_json::to_value(GraphQlErrorResponse {
            data: None,
            errors: vec![GraphQlError {
                message: "bad".to_string(),
            }],
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({"data": null, "errors": [{"message": "bad"}]}));
    }
}
