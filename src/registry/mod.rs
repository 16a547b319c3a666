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

pub mod http;
pub mod names;
pub mod resolve;

pub use http::HttpRegistryClient;
pub use names::{spec_name_from_header, DeploymentPath, NameKind, ResourceName, SpecPath};
pub use resolve::{matching_deployments, resolve_deployment};

use crate::error::Result;
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;

/// Label on an api resource naming its description style, consulted when a
/// spec's own MIME type does not identify the format.
pub const STYLE_LABEL: &str = "apihub-style";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApiSpec {
    pub name: String,
    pub mime_type: String,
    pub revision_id: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Api {
    pub name: String,
    pub display_name: String,
    pub labels: HashMap<String, String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApiDeployment {
    pub name: String,
    pub display_name: String,
    pub api_spec_revision: String,
    pub endpoint_uri: String,
}

/// Raw bytes of a spec or artifact together with their declared content type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contents {
    pub content_type: String,
    pub data: Vec<u8>,
}

/// The registry RPC surface the service depends on.
///
/// Every call is a single request with exactly one outcome; there is no
/// retry layer behind it.
#[async_trait]
pub trait RegistryClient: Send + Sync {
    async fn get_api_spec(&self, name: &str) -> Result<ApiSpec>;

    async fn get_api_spec_contents(&self, name: &str) -> Result<Contents>;

    async fn get_api(&self, name: &str) -> Result<Api>;

    async fn get_api_deployment(&self, name: &str) -> Result<ApiDeployment>;

    async fn list_api_deployments(&self, parent: &str, filter: &str) -> Result<Vec<ApiDeployment>>;

    async fn get_artifact_contents(&self, name: &str) -> Result<Contents>;
}
