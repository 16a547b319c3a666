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

use crate::config::types::{CacheBackend, Config, MockProtocol};
use anyhow::Context;
use std::fs;
use std::path::{Path, PathBuf};

pub struct ConfigLoader;

impl ConfigLoader {
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Config> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;

        Self::from_str(&content)
    }

    pub fn from_str(content: &str) -> anyhow::Result<Config> {
        let config: Config =
            serde_yaml::from_str(content).with_context(|| "Failed to parse YAML configuration")?;

        Self::validate(&config)?;

        Ok(config)
    }

    /// Loads the optional config file, then applies process environment
    /// overrides.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Config> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => Config::default(),
        };
        let config = Self::apply_overrides(config, |key| std::env::var(key).ok())?;
        Self::validate(&config)?;
        Ok(config)
    }

    pub fn apply_overrides<F>(mut config: Config, lookup: F) -> anyhow::Result<Config>
    where
        F: Fn(&str) -> Option<String>,
    {
        let first = |keys: &[&str]| keys.iter().find_map(|k| lookup(*k).filter(|v| !v.is_empty()));

        if let Some(address) = first(&["APG_REGISTRY_ADDRESS", "REGISTRY_ADDRESS"]) {
            config.registry.address = address;
        }
        if let Some(insecure) = first(&["APG_REGISTRY_INSECURE", "REGISTRY_INSECURE"]) {
            config.registry.insecure = insecure == "1";
        }
        if let Some(port) = first(&["PORT"]) {
            config.server.port = port
                .parse()
                .with_context(|| format!("Invalid PORT value: {}", port))?;
        }
        if let Some(header) = first(&["HEADER_REGISTRY_SPEC"]) {
            config.mock.header_name = header.to_lowercase();
        }
        if let Some(artifact) = first(&["MOCK_ENDPOINT_ARTIFACT_NAME"]) {
            config.mock.mock_endpoint_artifact = artifact;
        }
        if let Some(endpoint) = first(&["MOCK_ENDPOINT_OPENAPI"]) {
            config.mock.endpoints.insert("openapi".to_string(), endpoint);
        }
        if let Some(endpoint) = first(&["MOCK_ENDPOINT_GRAPHQL"]) {
            config.mock.endpoints.insert("graphql".to_string(), endpoint);
        }
        if let Some(protocol) = first(&["MOCK_PROTOCOL"]) {
            config.mock.protocol = match protocol.to_lowercase().as_str() {
                "openapi" => MockProtocol::Openapi,
                "graphql" => MockProtocol::Graphql,
                other => anyhow::bail!("Mock protocol must be 'openapi' or 'graphql', got '{}'", other),
            };
        }
        if let Some(dir) = first(&["SPEC_CACHE_DIR"]) {
            config.cache.backend = CacheBackend::Disk;
            config.cache.directory = PathBuf::from(dir);
        }

        Ok(config)
    }

    fn validate(config: &Config) -> anyhow::Result<()> {
        if config.server.port == 0 {
            anyhow::bail!("Server port cannot be 0");
        }

        if config.server.workers == 0 {
            anyhow::bail!("Number of workers cannot be 0");
        }

        if config.telemetry.sampling_rate < 0.0 || config.telemetry.sampling_rate > 1.0 {
            anyhow::bail!("Sampling rate must be between 0.0 and 1.0");
        }

        if config.telemetry.enabled {
            Self::validate_telemetry_config(&config.telemetry)?;
        }

        Self::validate_registry_config(&config.registry)?;

        if config.mock.header_name.trim().is_empty() {
            anyhow::bail!("Registry spec header name cannot be empty");
        }

        for (format, endpoint) in &config.mock.endpoints {
            if !endpoint.is_empty() && url::Url::parse(endpoint).is_err() {
                anyhow::bail!("Invalid {} mock endpoint URL: {}", format, endpoint);
            }
        }

        Ok(())
    }

    fn validate_registry_config(config: &crate::config::types::RegistryConfig) -> anyhow::Result<()> {
        let (host, port) = config
            .address
            .rsplit_once(':')
            .with_context(|| format!("Registry address must be host:port, got '{}'", config.address))?;

        if host.is_empty() {
            anyhow::bail!("Registry address must include a host");
        }
        port.parse::<u16>()
            .with_context(|| format!("Invalid registry port: {}", port))?;

        if config.timeout_seconds == 0 {
            anyhow::bail!("Registry timeout must be greater than 0");
        }

        Ok(())
    }

    fn validate_telemetry_config(
        config: &crate::config::types::TelemetryConfig,
    ) -> anyhow::Result<()> {
        if config.endpoint.is_empty() {
            anyhow::bail!("Telemetry endpoint cannot be empty");
        }

        match url::Url::parse(&config.endpoint) {
            Ok(url) => {
                let scheme = url.scheme();
                if scheme != "http" && scheme != "https" {
                    anyhow::bail!("Telemetry endpoint must use http:// or https:// scheme");
                }
                if url.host().is_none() {
                    anyhow::bail!("Telemetry endpoint must have a host");
                }
            }
            Err(_) => anyhow::bail!("Invalid telemetry endpoint URL format: {}", config.endpoint),
        }

        let protocol = config.protocol.to_lowercase();
        if protocol != "http" && protocol != "grpc" {
            anyhow::bail!(
                "Telemetry protocol must be 'http' or 'grpc', got '{}'",
                config.protocol
            );
        }

        if config.timeout_seconds == 0 {
            anyhow::bail!("Telemetry timeout must be greater than 0");
        }

        Ok(())
    }
}
