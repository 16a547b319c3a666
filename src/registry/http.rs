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

//! Registry client over the registry's HTTP/JSON surface.

use crate::config::RegistryConfig;
use crate::error::{Error, Result};
use crate::registry::{Api, ApiDeployment, ApiSpec, Contents, RegistryClient};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

pub struct HttpRegistryClient {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct ListApiDeploymentsResponse {
    api_deployments: Vec<ApiDeployment>,
    next_page_token: String,
}

impl HttpRegistryClient {
    pub fn new(config: &RegistryConfig) -> anyhow::Result<Self> {
        let scheme = if config.insecure { "http" } else { "https" };
        let base_url = format!("{}://{}", scheme, config.address.trim_end_matches('/'));
        Self::with_base_url(base_url, Duration::from_secs(config.timeout_seconds))
    }

    pub fn with_base_url(base_url: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    fn url(&self, name: &str) -> String {
        format!("{}/v1/{}", self.base_url, name)
    }

    async fn send(&self, name: &str, request: reqwest::RequestBuilder) -> Result<reqwest::Response> {
        let response = request
            .send()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;

        match response.status() {
            status if status.is_success() => Ok(response),
            StatusCode::NOT_FOUND => Err(Error::NotFound(name.to_string())),
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(Error::Transport(format!(
                    "{} returned {}: {}",
                    name,
                    status,
                    body.trim()
                )))
            }
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, name: &str) -> Result<T> {
        debug!(name = %name, "Registry GET");
        let response = self.send(name, self.client.get(self.url(name))).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| Error::Transport(format!("invalid response for {}: {}", name, e)))
    }

    async fn get_contents(&self, name: &str) -> Result<Contents> {
        debug!(name = %name, "Registry GET contents");
        let url = format!("{}:getContents", self.url(name));
        let response = self.send(name, self.client.get(url)).await?;

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let data = response
            .bytes()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;

        if data.is_empty() {
            return Err(Error::NotFound(name.to_string()));
        }

        Ok(Contents {
            content_type,
            data: data.to_vec(),
        })
    }
}

#[async_trait]
impl RegistryClient for HttpRegistryClient {
    async fn get_api_spec(&self, name: &str) -> Result<ApiSpec> {
        self.get_json(name).await
    }

    async fn get_api_spec_contents(&self, name: &str) -> Result<Contents> {
        self.get_contents(name).await
    }

    async fn get_api(&self, name: &str) -> Result<Api> {
        self.get_json(name).await
    }

    async fn get_api_deployment(&self, name: &str) -> Result<ApiDeployment> {
        self.get_json(name).await
    }

    async fn list_api_deployments(&self, parent: &str, filter: &str) -> Result<Vec<ApiDeployment>> {
        let collection = format!("{}/deployments", parent);
        let mut deployments = Vec::new();
        let mut page_token = String::new();

        loop {
            let mut query = vec![("filter", filter)];
            if !page_token.is_empty() {
                query.push(("pageToken", page_token.as_str()));
            }
            let request = self.client.get(self.url(&collection)).query(&query);
            let page: ListApiDeploymentsResponse = self
                .send(&collection, request)
                .await?
                .json()
                .await
                .map_err(|e| Error::Transport(e.to_string()))?;

            deployments.extend(page.api_deployments);
            if page.next_page_token.is_empty() {
                break;
            }
            page_token = page.next_page_token;
        }

        Ok(deployments)
    }

    async fn get_artifact_contents(&self, name: &str) -> Result<Contents> {
        self.get_contents(name).await
    }
}
