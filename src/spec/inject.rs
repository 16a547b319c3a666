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

//! Points a rendered spec at live endpoints.
//!
//! Swagger 2 documents carry a single `host`/`basePath`/`schemes` triple, so
//! exactly one endpoint is chosen, and only when the document does not
//! declare a host of its own. OpenAPI 3 documents get one `servers` entry per
//! candidate.

use crate::registry::{matching_deployments, RegistryClient, ResourceName};
use crate::spec::SpecDocument;
use crate::telemetry::metrics::record_registry_call;
use serde_json::{json, Map, Value};
use tracing::{debug, warn};
use url::Url;

#[derive(Debug, Clone, PartialEq)]
pub struct EndpointCandidate {
    pub url: String,
    pub description: String,
}

/// Endpoint sources for one rendered spec.
#[derive(Debug, Clone, Default)]
pub struct EndpointCandidates {
    /// `endpoint_uri` query parameter of the request.
    pub requested: Option<String>,
    /// Endpoints of deployments serving the spec, in listing order.
    pub deployments: Vec<EndpointCandidate>,
    /// Contents of the spec's mock-endpoint artifact.
    pub artifact: Option<String>,
    /// Statically configured mock endpoint.
    pub static_endpoint: Option<String>,
}

impl EndpointCandidates {
    pub async fn collect(
        registry: &dyn RegistryClient,
        spec: &ResourceName,
        requested: Option<String>,
        artifact_id: &str,
        static_endpoint: Option<String>,
    ) -> Self {
        let deployments = matching_deployments(registry, spec)
            .await
            .into_iter()
            .filter(|d| !d.endpoint_uri.is_empty())
            .map(|d| {
                let label = if d.display_name.is_empty() {
                    d.name.rsplit('/').next().unwrap_or_default().to_string()
                } else {
                    d.display_name
                };
                EndpointCandidate {
                    url: d.endpoint_uri,
                    description: format!("Deployment {}", label),
                }
            })
            .collect();

        let artifact_name = spec.artifact(artifact_id);
        let artifact = match registry.get_artifact_contents(&artifact_name).await {
            Ok(contents) => {
                record_registry_call("GetArtifactContents", true);
                String::from_utf8(contents.data)
                    .ok()
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
            }
            Err(e) => {
                record_registry_call("GetArtifactContents", false);
                debug!(artifact = %artifact_name, error = %e, "No mock endpoint artifact");
                None
            }
        };

        Self {
            requested: requested.filter(|s| !s.is_empty()),
            deployments,
            artifact,
            static_endpoint: static_endpoint.filter(|s| !s.is_empty()),
        }
    }

    /// The single endpoint a Swagger 2 document may carry.
    pub fn preferred(&self) -> Option<&str> {
        self.requested
            .as_deref()
            .or_else(|| self.deployments.first().map(|d| d.url.as_str()))
            .or(self.artifact.as_deref())
            .or(self.static_endpoint.as_deref())
    }

    /// All endpoints for an OpenAPI 3 `servers` list, static endpoint last.
    pub fn ordered(&self) -> Vec<EndpointCandidate> {
        let mut ordered: Vec<EndpointCandidate> = Vec::new();
        let mut push = |url: &str, description: &str| {
            ordered.push(EndpointCandidate {
                url: url.to_string(),
                description: description.to_string(),
            });
        };

        if let Some(url) = &self.requested {
            push(url, "Requested endpoint");
        }
        for deployment in &self.deployments {
            push(&deployment.url, &deployment.description);
        }
        if let Some(url) = &self.artifact {
            push(url, "Mock endpoint");
        }
        if let Some(url) = &self.static_endpoint {
            push(url, "Mock endpoint");
        }
        ordered
    }
}

pub fn inject_endpoints(document: SpecDocument, candidates: &EndpointCandidates) -> SpecDocument {
    match document {
        SpecDocument::Swagger2(mut value) => {
            if let (Some(spec), Some(endpoint)) = (value.as_object_mut(), candidates.preferred()) {
                inject_swagger2(spec, endpoint);
            }
            SpecDocument::Swagger2(value)
        }
        SpecDocument::OpenApi3(mut value) => {
            if let Some(spec) = value.as_object_mut() {
                inject_openapi3(spec, &candidates.ordered());
            }
            SpecDocument::OpenApi3(value)
        }
        unrecognized @ SpecDocument::Unrecognized(_) => unrecognized,
    }
}

fn inject_swagger2(spec: &mut Map<String, Value>, endpoint: &str) {
    if spec.contains_key("host") {
        return;
    }

    let Some(url) = parse_endpoint(endpoint) else {
        warn!(endpoint = %endpoint, "Ignoring unparseable mock endpoint");
        return;
    };
    let Some(host) = url.host_str() else {
        warn!(endpoint = %endpoint, "Ignoring mock endpoint without host");
        return;
    };

    let host = match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    };
    spec.insert("host".to_string(), json!(host));

    let path = url.path().trim_end_matches('/');
    if !path.is_empty() && !spec.contains_key("basePath") {
        spec.insert("basePath".to_string(), json!(path));
    }
    if !spec.contains_key("schemes") {
        spec.insert("schemes".to_string(), json!([url.scheme()]));
    }
}

fn inject_openapi3(spec: &mut Map<String, Value>, candidates: &[EndpointCandidate]) {
    if candidates.is_empty() {
        return;
    }

    let servers = spec
        .entry("servers")
        .or_insert_with(|| Value::Array(Vec::new()));
    if !servers.is_array() {
        *servers = Value::Array(Vec::new());
    }
    let Some(servers) = servers.as_array_mut() else {
        return;
    };

    for candidate in candidates {
        servers.push(json!({
            "url": candidate.url,
            "description": candidate.description,
        }));
    }
}

/// Endpoints without a scheme are read as plain `http`.
fn parse_endpoint(endpoint: &str) -> Option<Url> {
    if endpoint.contains("://") {
        Url::parse(endpoint).ok()
    } else {
        Url::parse(&format!("http://{}", endpoint)).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ApiDeployment;
    use crate::testing::FakeRegistry;
    use assert_json_diff::assert_json_eq;

    fn deployment(url: &str, name: &str) -> EndpointCandidate {
        EndpointCandidate {
            url: url.to_string(),
            description: format!("Deployment {}", name),
        }
    }

    #[test]
    fn test_swagger2_injection() {
        let candidates = EndpointCandidates {
            static_endpoint: Some("http://mock.example:8080/api".to_string()),
            ..Default::default()
        };
        let doc = SpecDocument::from_value(json!({"swagger": "2.0", "paths": {}}));

        let injected = inject_endpoints(doc, &candidates);
        assert_json_eq!(
            injected.value().clone(),
            json!({
                "swagger": "2.0",
                "paths": {},
                "host": "mock.example:8080",
                "basePath": "/api",
                "schemes": ["http"]
            })
        );
    }

    #[test]
    fn test_swagger2_existing_host_untouched() {
        let candidates = EndpointCandidates {
            static_endpoint: Some("http://mock.example:8080/api".to_string()),
            ..Default::default()
        };
        let doc = SpecDocument::from_value(json!({"swagger": "2.0", "host": "petstore.io"}));

        let injected = inject_endpoints(doc.clone(), &candidates);
        assert_eq!(injected, doc);
    }

    #[test]
    fn test_swagger2_injection_is_idempotent() {
        let candidates = EndpointCandidates {
            static_endpoint: Some("http://mock.example:8080/api".to_string()),
            ..Default::default()
        };
        let doc = SpecDocument::from_value(json!({"swagger": "2.0"}));

        let once = inject_endpoints(doc, &candidates);
        let twice = inject_endpoints(once.clone(), &candidates);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_swagger2_precedence() {
        let mut candidates = EndpointCandidates {
            requested: Some("https://requested.example".to_string()),
            deployments: vec![deployment("https://deployed.example", "prod")],
            artifact: Some("https://artifact.example".to_string()),
            static_endpoint: Some("https://static.example".to_string()),
        };
        assert_eq!(candidates.preferred(), Some("https://requested.example"));

        candidates.requested = None;
        assert_eq!(candidates.preferred(), Some("https://deployed.example"));

        candidates.deployments.clear();
        assert_eq!(candidates.preferred(), Some("https://artifact.example"));

        candidates.artifact = None;
        assert_eq!(candidates.preferred(), Some("https://static.example"));

        candidates.static_endpoint = None;
        assert_eq!(candidates.preferred(), None);
    }

    #[test]
    fn test_swagger2_without_candidates_is_unmodified() {
        let doc = SpecDocument::from_value(json!({"swagger": "2.0"}));
        let injected = inject_endpoints(doc.clone(), &EndpointCandidates::default());
        assert_eq!(injected, doc);
    }

    #[test]
    fn test_swagger2_schemeless_endpoint() {
        let candidates = EndpointCandidates {
            artifact: Some("mocks.internal:9000".to_string()),
            ..Default::default()
        };
        let doc = SpecDocument::from_value(json!({"swagger": "2.0"}));

        let injected = inject_endpoints(doc, &candidates);
        assert_eq!(injected.value()["host"], json!("mocks.internal:9000"));
        assert!(injected.value().get("basePath").is_none());
    }

    #[test]
    fn test_openapi3_servers_order() {
        let candidates = EndpointCandidates {
            deployments: vec![
                deployment("https://one.example", "one"),
                deployment("https://two.example", "two"),
            ],
            static_endpoint: Some("http://mocks.local".to_string()),
            ..Default::default()
        };
        let doc = SpecDocument::from_value(json!({"openapi": "3.0.0", "servers": []}));

        let injected = inject_endpoints(doc, &candidates);
        let urls: Vec<&str> = injected.value()["servers"]
            .as_array()
            .unwrap()
            .iter()
            .map(|s| s["url"].as_str().unwrap())
            .collect();
        assert_eq!(
            urls,
            vec!["https://one.example", "https://two.example", "http://mocks.local"]
        );
    }

    #[test]
    fn test_openapi3_creates_servers() {
        let candidates = EndpointCandidates {
            static_endpoint: Some("http://mocks.local".to_string()),
            ..Default::default()
        };
        let doc = SpecDocument::from_value(json!({"openapi": "3.1.0"}));

        let injected = inject_endpoints(doc, &candidates);
        assert_json_eq!(
            injected.value()["servers"].clone(),
            json!([{"url": "http://mocks.local", "description": "Mock endpoint"}])
        );
    }

    #[test]
    fn test_openapi3_keeps_every_candidate() {
        let candidates = EndpointCandidates {
            deployments: vec![
                deployment("https://shared.example", "blue"),
                deployment("https://shared.example", "green"),
            ],
            static_endpoint: Some("https://shared.example".to_string()),
            ..Default::default()
        };
        let doc = SpecDocument::from_value(json!({
            "openapi": "3.0.0",
            "servers": [{"url": "https://prod.example"}]
        }));

        let injected = inject_endpoints(doc, &candidates);
        let descriptions: Vec<&str> = injected.value()["servers"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|s| s["description"].as_str())
            .collect();
        assert_eq!(
            descriptions,
            vec!["Deployment blue", "Deployment green", "Mock endpoint"]
        );
        assert_eq!(injected.value()["servers"][0]["url"], "https://prod.example");
    }

    #[test]
    fn test_unrecognized_passes_through() {
        let candidates = EndpointCandidates {
            static_endpoint: Some("http://mocks.local".to_string()),
            ..Default::default()
        };
        let doc = SpecDocument::from_value(json!({"info": {"title": "no version"}}));

        let injected = inject_endpoints(doc.clone(), &candidates);
        assert_eq!(injected, doc);
    }

    #[tokio::test]
    async fn test_collect_from_registry() {
        let spec = ResourceName::spec("p", "l", "a", "v", "s").unwrap();
        let registry = FakeRegistry::new()
            .with_deployment(ApiDeployment {
                name: "projects/p/locations/l/apis/a/deployments/prod".to_string(),
                display_name: "Production".to_string(),
                api_spec_revision: spec.to_string(),
                endpoint_uri: "https://prod.example".to_string(),
            })
            .with_deployment(ApiDeployment {
                name: "projects/p/locations/l/apis/a/deployments/draft".to_string(),
                api_spec_revision: spec.to_string(),
                ..Default::default()
            })
            .with_artifact(&spec.artifact("mock-endpoint"), " https://artifact.example\n");

        let candidates = EndpointCandidates::collect(
            &registry,
            &spec,
            Some(String::new()),
            "mock-endpoint",
            Some("http://mocks.local".to_string()),
        )
        .await;

        assert_eq!(candidates.requested, None);
        assert_eq!(
            candidates.deployments,
            vec![EndpointCandidate {
                url: "https://prod.example".to_string(),
                description: "Deployment Production".to_string(),
            }]
        );
        assert_eq!(candidates.artifact.as_deref(), Some("https://artifact.example"));
        assert_eq!(
            registry.last_filter().as_deref(),
            Some("api_spec_revision == \"projects/p/locations/l/apis/a/versions/v/specs/s\"")
        );
    }
}
