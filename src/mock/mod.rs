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

//! Mock response engines.
//!
//! Both engines consume the same cached spec contents and are selected once
//! at startup by the configured mock protocol.

pub mod graphql;
pub mod http;

pub use graphql::GraphQlMockEngine;
pub use http::HttpMockEngine;

use crate::config::{MockConfig, MockProtocol};
use crate::error::Result;
use crate::registry::{Contents, ResourceName};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

/// An inbound request as seen by a mock engine.
#[derive(Debug, Clone, Default)]
pub struct MockRequest {
    pub method: String,
    /// API path dispatched against the spec, always starting with `/`.
    pub path: String,
    pub query: String,
    /// Header names are lowercase.
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
}

impl MockRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MockResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl MockResponse {
    pub fn json(status: u16, body: &serde_json::Value) -> Self {
        Self::with_body(status, "application/json", body.to_string().into_bytes())
    }

    pub fn with_body(status: u16, content_type: &str, body: Vec<u8>) -> Self {
        Self {
            status,
            headers: vec![("content-type".to_string(), content_type.to_string())],
            body,
        }
    }

    pub fn empty(status: u16) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

#[async_trait]
pub trait MockEngine: Send + Sync {
    fn protocol(&self) -> MockProtocol;

    /// Synthesizes a response for `request` from the spec's contents.
    async fn respond(
        &self,
        spec_name: &ResourceName,
        spec: &Contents,
        request: &MockRequest,
    ) -> Result<MockResponse>;
}

pub fn engine_for(config: &MockConfig) -> Arc<dyn MockEngine> {
    match config.protocol {
        MockProtocol::Openapi => Arc::new(HttpMockEngine::new()),
        MockProtocol::Graphql => Arc::new(GraphQlMockEngine::new(config.scalar_mocks.clone())),
    }
}

/// CORS headers answering a `HEAD` preflight, echoing what the client asked for.
pub fn preflight_headers(request_headers: &HashMap<String, String>) -> Vec<(String, String)> {
    let echo = |name: &str| {
        request_headers
            .get(name)
            .filter(|v| !v.is_empty())
            .cloned()
            .unwrap_or_else(|| "*".to_string())
    };

    vec![
        ("Access-Control-Allow-Origin".to_string(), echo("origin")),
        (
            "Access-Control-Allow-Headers".to_string(),
            echo("access-control-request-headers"),
        ),
        (
            "Access-Control-Allow-Credentials".to_string(),
            "true".to_string(),
        ),
        (
            "Access-Control-Expose-Headers".to_string(),
            echo("access-control-expose-headers"),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preflight_echoes_origin() {
        let mut headers = HashMap::new();
        headers.insert("origin".to_string(), "https://portal.example".to_string());
        headers.insert(
            "access-control-request-headers".to_string(),
            "content-type".to_string(),
        );

        let cors = preflight_headers(&headers);
        assert!(cors.contains(&(
            "Access-Control-Allow-Origin".to_string(),
            "https://portal.example".to_string()
        )));
        assert!(cors.contains(&(
            "Access-Control-Allow-Headers".to_string(),
            "content-type".to_string()
        )));
        assert!(cors.contains(&(
            "Access-Control-Expose-Headers".to_string(),
            "*".to_string()
        )));
    }

    #[test]
    fn test_preflight_wildcards() {
        let cors = preflight_headers(&HashMap::new());
        assert_eq!(cors.len(), 4);
        assert!(cors
            .iter()
            .filter(|(k, _)| k != "Access-Control-Allow-Credentials")
            .all(|(_, v)| v == "*"));
    }

    #[test]
    fn test_engine_selection() {
        let mut config = MockConfig::default();
        assert_eq!(engine_for(&config).protocol(), MockProtocol::Openapi);

        config.protocol = MockProtocol::Graphql;
        assert_eq!(engine_for(&config).protocol(), MockProtocol::Graphql);
    }

    #[test]
    fn test_response_header_lookup() {
        let response = MockResponse::json(200, &serde_json::json!({}));
        assert_eq!(response.header("Content-Type"), Some("application/json"));
        assert_eq!(response.body, b"{}");
    }
}
