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

//! In-process registry used by unit and integration tests.
//!
//! Every RPC is counted so tests can assert on registry traffic.

use crate::error::{Error, Result};
use crate::registry::{Api, ApiDeployment, ApiSpec, Contents, RegistryClient};
use async_trait::async_trait;
use dashmap::DashMap;
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Default)]
pub struct FakeRegistry {
    specs: HashMap<String, (ApiSpec, Contents)>,
    apis: HashMap<String, Api>,
    deployments: Vec<ApiDeployment>,
    artifacts: HashMap<String, Contents>,
    fail_listing: bool,
    calls: DashMap<&'static str, usize>,
    last_filter: Mutex<Option<String>>,
}

impl FakeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_spec(mut self, name: &str, mime_type: &str, data: &str) -> Self {
        let spec = ApiSpec {
            name: name.to_string(),
            mime_type: mime_type.to_string(),
            revision_id: "r1".to_string(),
        };
        let contents = Contents {
            content_type: mime_type.to_string(),
            data: data.as_bytes().to_vec(),
        };
        self.specs.insert(name.to_string(), (spec, contents));
        self
    }

    pub fn with_api(mut self, name: &str, labels: &[(&str, &str)]) -> Self {
        let api = Api {
            name: name.to_string(),
            display_name: name.to_string(),
            labels: labels
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        };
        self.apis.insert(name.to_string(), api);
        self
    }

    pub fn with_deployment(mut self, deployment: ApiDeployment) -> Self {
        self.deployments.push(deployment);
        self
    }

    pub fn with_artifact(mut self, name: &str, data: &str) -> Self {
        self.artifacts.insert(
            name.to_string(),
            Contents {
                content_type: "text/plain".to_string(),
                data: data.as_bytes().to_vec(),
            },
        );
        self
    }

    pub fn failing_deployment_listing(mut self) -> Self {
        self.fail_listing = true;
        self
    }

    pub fn calls(&self, method: &str) -> usize {
        self.calls.get(method).map(|c| *c).unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.calls.iter().map(|entry| *entry.value()).sum()
    }

    pub fn last_filter(&self) -> Option<String> {
        self.last_filter.lock().ok().and_then(|f| f.clone())
    }

    fn count(&self, method: &'static str) {
        *self.calls.entry(method).or_insert(0) += 1;
    }
}

#[async_trait]
impl RegistryClient for FakeRegistry {
    async fn get_api_spec(&self, name: &str) -> Result<ApiSpec> {
        self.count("GetApiSpec");
        self.specs
            .get(name)
            .map(|(spec, _)| spec.clone())
            .ok_or_else(|| Error::NotFound(name.to_string()))
    }

    async fn get_api_spec_contents(&self, name: &str) -> Result<Contents> {
        self.count("GetApiSpecContents");
        self.specs
            .get(name)
            .map(|(_, contents)| contents.clone())
            .ok_or_else(|| Error::NotFound(name.to_string()))
    }

    async fn get_api(&self, name: &str) -> Result<Api> {
        self.count("GetApi");
        self.apis
            .get(name)
            .cloned()
            .ok_or_else(|| Error::NotFound(name.to_string()))
    }

    async fn get_api_deployment(&self, name: &str) -> Result<ApiDeployment> {
        self.count("GetApiDeployment");
        self.deployments
            .iter()
            .find(|d| d.name == name)
            .cloned()
            .ok_or_else(|| Error::NotFound(name.to_string()))
    }

    async fn list_api_deployments(&self, parent: &str, filter: &str) -> Result<Vec<ApiDeployment>> {
        self.count("ListApiDeployments");
        if let Ok(mut last) = self.last_filter.lock() {
            *last = Some(filter.to_string());
        }
        if self.fail_listing {
            return Err(Error::Transport("listing unavailable".to_string()));
        }

        // Only the `api_spec_revision == "<name>"` form is understood.
        let revision = filter
            .split_once("==")
            .map(|(_, v)| v.trim().trim_matches('"').to_string());

        Ok(self
            .deployments
            .iter()
            .filter(|d| d.name.starts_with(&format!("{}/", parent)))
            .filter(|d| match &revision {
                Some(revision) => &d.api_spec_revision == revision,
                None => true,
            })
            .cloned()
            .collect())
    }

    async fn get_artifact_contents(&self, name: &str) -> Result<Contents> {
        self.count("GetArtifactContents");
        self.artifacts
            .get(name)
            .cloned()
            .ok_or_else(|| Error::NotFound(name.to_string()))
    }
}
