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

//! Operation-driven mocking of OpenAPI and Swagger specs.

pub mod matcher;
pub mod operations;
pub mod synth;

pub use matcher::{Dispatch, OperationMatcher};
pub use operations::{base_paths, extract_operations, Operation};

use crate::config::MockProtocol;
use crate::error::Result;
use crate::mock::{MockEngine, MockRequest, MockResponse};
use crate::registry::{Contents, ResourceName};
use crate::spec::SpecDocument;
use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, info};

#[derive(Debug, Clone, Default)]
pub struct HttpMockEngine;

impl HttpMockEngine {
    pub fn new() -> Self {
        Self
    }

    /// Request path followed by the path with each declared base path removed.
    fn candidate_paths(path: &str, base_paths: &[String]) -> Vec<String> {
        let mut candidates = vec![path.to_string()];
        for base in base_paths {
            if let Some(rest) = path.strip_prefix(base.as_str()) {
                if rest.is_empty() || rest.starts_with('/') {
                    candidates.push(format!("/{}", rest.trim_start_matches('/')));
                }
            }
        }
        candidates
    }

    pub fn dispatch(&self, document: &SpecDocument, request: &MockRequest) -> MockResponse {
        let matcher = OperationMatcher::new(extract_operations(document));
        let bases = base_paths(document);

        let mut not_allowed = None;
        for path in Self::candidate_paths(&request.path, &bases) {
            match matcher.dispatch(&request.method, &path) {
                Dispatch::Matched { operation, params } => {
                    debug!(
                        method = %operation.method,
                        path = %operation.path,
                        params = ?params,
                        "Matched operation"
                    );
                    let preferred = synth::preferred_status(request.header("prefer"));
                    return Self::render(synth::synthesize(
                        document.value(),
                        operation,
                        preferred,
                    ));
                }
                Dispatch::MethodNotAllowed(allowed) => {
                    not_allowed.get_or_insert(allowed);
                }
                Dispatch::NotFound => {}
            }
        }

        match not_allowed {
            Some(allowed) => {
                let mut response = problem(
                    405,
                    "Route resolved, but no operation matches the method",
                    &format!("{} is not declared for {}", request.method, request.path),
                );
                response.headers.push(("allow".to_string(), allowed.join(", ")));
                response
            }
            None => problem(
                404,
                "Route not resolved, no path matched",
                &format!("No operation declared for {}", request.path),
            ),
        }
    }

    fn render(synthesized: synth::Synthesized) -> MockResponse {
        let mut response = match (synthesized.body, synthesized.content_type) {
            (Some(body), Some(content_type)) => {
                let bytes = match body {
                    serde_json::Value::String(text) if !content_type.contains("json") => {
                        text.into_bytes()
                    }
                    other => other.to_string().into_bytes(),
                };
                MockResponse::with_body(synthesized.status, &content_type, bytes)
            }
            (Some(body), None) => MockResponse::json(synthesized.status, &body),
            (None, _) => MockResponse::empty(synthesized.status),
        };
        response.headers.extend(synthesized.headers);
        response
    }
}

fn problem(status: u16, title: &str, detail: &str) -> MockResponse {
    let body = json!({
        "title": title,
        "status": status,
        "detail": detail,
    });
    MockResponse::with_body(
        status,
        "application/problem+json",
        body.to_string().into_bytes(),
    )
}

#[async_trait]
impl MockEngine for HttpMockEngine {
    fn protocol(&self) -> MockProtocol {
        MockProtocol::Openapi
    }

    async fn respond(
        &self,
        spec_name: &ResourceName,
        spec: &Contents,
        request: &MockRequest,
    ) -> Result<MockResponse> {
        let document = SpecDocument::parse(spec_name.as_str(), &spec.data)?;
        let response = self.dispatch(&document, request);

        info!(
            spec = %spec_name,
            method = %request.method,
            path = %request.path,
            status = response.status,
            "Served HTTP mock response"
        );
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use serde_json::Value;
    use std::collections::HashMap;

    const PETSTORE: &str = r##"
openapi: 3.0.0
info:
  title: Pets
  version: "1"
servers:
  - url: https://pets.example.com/v1
paths:
  /pets:
    get:
      operationId: listPets
      responses:
        "200":
          description: ok
          content:
            application/json:
              schema:
                type: array
                items:
                  $ref: "#/components/schemas/Pet"
    post:
      responses:
        "201":
          description: created
  /pets/{petId}:
    get:
      responses:
        "200":
          description: ok
          content:
            application/json:
              example: {id: 1, name: Rex}
        "404":
          description: missing
          content:
            application/json:
              example: {message: not found}
components:
  schemas:
    Pet:
      type: object
      properties:
        id: {type: integer}
        name: {type: string}
"##;

    fn spec(text: &str) -> Contents {
        Contents {
            content_type: "application/yaml".to_string(),
            data: text.as_bytes().to_vec(),
        }
    }

    fn request(method: &str, path: &str) -> MockRequest {
        MockRequest {
            method: method.to_string(),
            path: path.to_string(),
            ..Default::default()
        }
    }

    async fn respond(request: MockRequest) -> MockResponse {
        let name = ResourceName::spec("p", "l", "a", "v", "s").unwrap();
        HttpMockEngine::new()
            .respond(&name, &spec(PETSTORE), &request)
            .await
            .unwrap()
    }

    fn body(response: &MockResponse) -> Value {
        serde_json::from_slice(&response.body).unwrap()
    }

    #[tokio::test]
    async fn test_schema_generated_list() {
        let response = respond(request("GET", "/pets")).await;
        assert_eq!(response.status, 200);
        assert_eq!(response.header("content-type"), Some("application/json"));
        assert_eq!(body(&response), json!([{"id": 0, "name": "string"}]));
    }

    #[tokio::test]
    async fn test_example_with_path_param() {
        let response = respond(request("GET", "/pets/42")).await;
        assert_eq!(body(&response), json!({"id": 1, "name": "Rex"}));
    }

    #[tokio::test]
    async fn test_base_path_is_stripped() {
        let response = respond(request("GET", "/v1/pets/42")).await;
        assert_eq!(response.status, 200);
    }

    #[tokio::test]
    async fn test_prefer_code() {
        let mut headers = HashMap::new();
        headers.insert("prefer".to_string(), "code=404".to_string());
        let response = respond(MockRequest {
            headers,
            ..request("GET", "/pets/42")
        })
        .await;

        assert_eq!(response.status, 404);
        assert_eq!(body(&response), json!({"message": "not found"}));
    }

    #[tokio::test]
    async fn test_empty_response() {
        let response = respond(request("POST", "/pets")).await;
        assert_eq!(response.status, 201);
        assert!(response.body.is_empty());
    }

    #[tokio::test]
    async fn test_unmatched_path_is_404() {
        let response = respond(request("GET", "/owners")).await;
        assert_eq!(response.status, 404);
        assert_eq!(
            response.header("content-type"),
            Some("application/problem+json")
        );
    }

    #[tokio::test]
    async fn test_unmatched_method_is_405() {
        let response = respond(request("DELETE", "/pets")).await;
        assert_eq!(response.status, 405);
        assert_eq!(response.header("allow"), Some("GET, POST"));
    }

    #[tokio::test]
    async fn test_swagger2_json_spec() {
        let swagger = json!({
            "swagger": "2.0",
            "basePath": "/api",
            "paths": {"/ping": {"get": {"responses": {"200": {
                "schema": {"type": "object", "properties": {"pong": {"type": "boolean"}}}
            }}}}}
        });
        let name = ResourceName::spec("p", "l", "a", "v", "s").unwrap();
        let response = HttpMockEngine::new()
            .respond(&name, &spec(&swagger.to_string()), &request("GET", "/api/ping"))
            .await
            .unwrap();

        assert_eq!(body(&response), json!({"pong": true}));
    }

    #[tokio::test]
    async fn test_unparseable_spec() {
        let name = ResourceName::spec("p", "l", "a", "v", "s").unwrap();
        let err = HttpMockEngine::new()
            .respond(&name, &spec("{ not: [valid"), &request("GET", "/"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::SpecUnparseable(_)));
    }

    #[test]
    fn test_candidate_paths() {
        let bases = vec!["/v1".to_string()];
        assert_eq!(
            HttpMockEngine::candidate_paths("/v1/pets", &bases),
            vec!["/v1/pets".to_string(), "/pets".to_string()]
        );
        assert_eq!(
            HttpMockEngine::candidate_paths("/v10/pets", &bases),
            vec!["/v10/pets".to_string()]
        );
        assert_eq!(
            HttpMockEngine::candidate_paths("/v1", &bases),
            vec!["/v1".to_string(), "/".to_string()]
        );
    }
}
