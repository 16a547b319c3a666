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

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
    #[serde(default)]
    pub registry: RegistryConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub mock: MockConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_workers")]
    pub workers: usize,
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_max_request_size")]
    pub max_request_size: usize,
}

fn default_port() -> u16 {
    3000
}

fn default_workers() -> usize {
    4
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_max_request_size() -> usize {
    10 * 1024 * 1024 // 10MB
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_service_name")]
    pub service_name: String,
    #[serde(default = "default_service_version")]
    pub service_version: String,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_protocol")]
    pub protocol: String,
    #[serde(default = "default_sampling_rate")]
    pub sampling_rate: f64,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_log_format")]
    pub log_format: String,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

fn default_service_name() -> String {
    "registry-mock".to_string()
}

fn default_service_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn default_endpoint() -> String {
    "http://localhost:4317".to_string()
}

fn default_protocol() -> String {
    "grpc".to_string()
}

fn default_sampling_rate() -> f64 {
    1.0
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

fn default_timeout_seconds() -> u64 {
    30
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// `host:port` of the registry.
    #[serde(default = "default_registry_address")]
    pub address: String,
    /// Plaintext transport when set.
    #[serde(default)]
    pub insecure: bool,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

fn default_registry_address() -> String {
    "apigeeregistry.googleapis.com:443".to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    Memory,
    Disk,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_cache_backend")]
    pub backend: CacheBackend,
    #[serde(default = "default_cache_directory")]
    pub directory: PathBuf,
}

fn default_cache_backend() -> CacheBackend {
    CacheBackend::Memory
}

fn default_cache_directory() -> PathBuf {
    std::env::temp_dir().join("registry-mock")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MockProtocol {
    Openapi,
    Graphql,
}

impl MockProtocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            MockProtocol::Openapi => "openapi",
            MockProtocol::Graphql => "graphql",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MockConfig {
    /// Engine used by the mock execution routes.
    #[serde(default = "default_mock_protocol")]
    pub protocol: MockProtocol,
    /// Header carrying the registry coordinate on `/mock/*` requests.
    #[serde(default = "default_header_name")]
    pub header_name: String,
    /// Static mock endpoints injected into rendered specs, keyed by format.
    #[serde(default)]
    pub endpoints: HashMap<String, String>,
    /// Spec artifact whose contents name an extra mock endpoint.
    #[serde(default = "default_mock_endpoint_artifact")]
    pub mock_endpoint_artifact: String,
    /// Fixed values for GraphQL scalar types, keyed by type name.
    #[serde(default)]
    pub scalar_mocks: HashMap<String, serde_json::Value>,
}

fn default_mock_protocol() -> MockProtocol {
    MockProtocol::Openapi
}

fn default_header_name() -> String {
    "apigee-registry-spec".to_string()
}

fn default_mock_endpoint_artifact() -> String {
    "mock-endpoint".to_string()
}

impl MockConfig {
    pub fn static_endpoint(&self, format: &str) -> Option<&str> {
        self.endpoints
            .get(format)
            .map(String::as_str)
            .filter(|e| !e.is_empty())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            workers: default_workers(),
            host: default_host(),
            max_request_size: default_max_request_size(),
        }
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            service_name: default_service_name(),
            service_version: default_service_version(),
            endpoint: default_endpoint(),
            protocol: default_protocol(),
            sampling_rate: default_sampling_rate(),
            log_level: default_log_level(),
            log_format: default_log_format(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            address: default_registry_address(),
            insecure: false,
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: default_cache_backend(),
            directory: default_cache_directory(),
        }
    }
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            protocol: default_mock_protocol(),
            header_name: default_header_name(),
            endpoints: HashMap::new(),
            mock_endpoint_artifact: default_mock_endpoint_artifact(),
            scalar_mocks: HashMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.workers, 4);
        assert!(!config.telemetry.enabled);
        assert_eq!(config.telemetry.log_level, "info");
        assert_eq!(config.cache.backend, CacheBackend::Memory);
        assert_eq!(config.mock.protocol, MockProtocol::Openapi);
        assert_eq!(config.mock.header_name, "apigee-registry-spec");
        assert_eq!(config.mock.mock_endpoint_artifact, "mock-endpoint");
    }

    #[test]
    fn test_static_endpoint_ignores_empty_values() {
        let mut mock = MockConfig::default();
        mock.endpoints
            .insert("openapi".to_string(), "http://mocks.local".to_string());
        mock.endpoints.insert("graphql".to_string(), String::new());

        assert_eq!(mock.static_endpoint("openapi"), Some("http://mocks.local"));
        assert_eq!(mock.static_endpoint("graphql"), None);
        assert_eq!(mock.static_endpoint("asyncapi"), None);
    }
}
