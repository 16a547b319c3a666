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

//! Canonical registry resource names.
//!
//! Names are hierarchical `collection/id` pairs:
//!
//! - api: `projects/{p}/locations/{l}/apis/{a}`
//! - spec: `projects/{p}/locations/{l}/apis/{a}/versions/{v}/specs/{s}`
//! - deployment: `projects/{p}/locations/{l}/apis/{a}/deployments/{d}`
//!
//! A spec id may carry a revision suffix (`{s}@{revision}`), which is how
//! deployments reference the revision they serve.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::fmt;

const API_SEGMENTS: usize = 6;
const SPEC_SEGMENTS: usize = 10;
const DEPLOYMENT_SEGMENTS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NameKind {
    Api,
    Spec,
    Deployment,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceName {
    value: String,
    kind: NameKind,
}

/// Path parameters of a spec-addressed route.
#[derive(Debug, Clone, Deserialize)]
pub struct SpecPath {
    pub project: String,
    pub location: String,
    pub api: String,
    pub version: String,
    pub spec: String,
}

/// Path parameters of a deployment-addressed route.
#[derive(Debug, Clone, Deserialize)]
pub struct DeploymentPath {
    pub project: String,
    pub location: String,
    pub api: String,
    pub deployment: String,
}

impl ResourceName {
    pub fn api(project: &str, location: &str, api: &str) -> Result<Self> {
        Self::build(
            &[("projects", project), ("locations", location), ("apis", api)],
            NameKind::Api,
        )
    }

    pub fn spec(project: &str, location: &str, api: &str, version: &str, spec: &str) -> Result<Self> {
        Self::build(
            &[
                ("projects", project),
                ("locations", location),
                ("apis", api),
                ("versions", version),
                ("specs", spec),
            ],
            NameKind::Spec,
        )
    }

    pub fn deployment(project: &str, location: &str, api: &str, deployment: &str) -> Result<Self> {
        Self::build(
            &[
                ("projects", project),
                ("locations", location),
                ("apis", api),
                ("deployments", deployment),
            ],
            NameKind::Deployment,
        )
    }

    /// Parses an already-canonical name such as a deployment's
    /// `apiSpecRevision` or the registry coordinate header.
    pub fn parse(name: &str) -> Result<Self> {
        let parts: Vec<&str> = name.trim_matches('/').split('/').collect();
        let kind = match (parts.len(), parts.get(API_SEGMENTS).copied()) {
            (API_SEGMENTS, _) => NameKind::Api,
            (SPEC_SEGMENTS, Some("versions")) if parts[8] == "specs" => NameKind::Spec,
            (DEPLOYMENT_SEGMENTS, Some("deployments")) => NameKind::Deployment,
            _ => return Err(Error::InvalidName(name.to_string())),
        };

        let pairs: Vec<(&str, &str)> = parts.chunks(2).map(|c| (c[0], c[1])).collect();
        let expected: &[&str] = match kind {
            NameKind::Api => &["projects", "locations", "apis"],
            NameKind::Spec => &["projects", "locations", "apis", "versions", "specs"],
            NameKind::Deployment => &["projects", "locations", "apis", "deployments"],
        };
        if pairs.iter().map(|(c, _)| *c).ne(expected.iter().copied()) {
            return Err(Error::InvalidName(name.to_string()));
        }

        Self::build(&pairs, kind)
    }

    fn build(pairs: &[(&str, &str)], kind: NameKind) -> Result<Self> {
        let mut value = String::new();
        for (collection, id) in pairs {
            validate_segment(id)?;
            if !value.is_empty() {
                value.push('/');
            }
            value.push_str(collection);
            value.push('/');
            value.push_str(id);
        }
        Ok(Self { value, kind })
    }

    pub fn kind(&self) -> NameKind {
        self.kind
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// The parent api name, derived by truncation.
    pub fn api_name(&self) -> ResourceName {
        let value = self
            .value
            .split('/')
            .take(API_SEGMENTS)
            .collect::<Vec<_>>()
            .join("/");
        ResourceName {
            value,
            kind: NameKind::Api,
        }
    }

    /// Name of an artifact attached to this resource.
    pub fn artifact(&self, artifact_id: &str) -> String {
        format!("{}/artifacts/{}", self.value, artifact_id)
    }
}

impl SpecPath {
    pub fn resource_name(&self) -> Result<ResourceName> {
        ResourceName::spec(
            &self.project,
            &self.location,
            &self.api,
            &self.version,
            &self.spec,
        )
    }
}

impl DeploymentPath {
    pub fn resource_name(&self) -> Result<ResourceName> {
        ResourceName::deployment(&self.project, &self.location, &self.api, &self.deployment)
    }
}

/// Reads a spec coordinate carried in a request header. Exactly ten
/// slash-delimited segments are accepted.
pub fn spec_name_from_header(value: &str) -> Result<ResourceName> {
    let parts: Vec<&str> = value.split('/').collect();
    if parts.len() != SPEC_SEGMENTS {
        return Err(Error::InvalidName(format!(
            "expected {} segments, got {}",
            SPEC_SEGMENTS,
            parts.len()
        )));
    }
    let name = ResourceName::parse(value)?;
    if name.kind() != NameKind::Spec {
        return Err(Error::InvalidName(value.to_string()));
    }
    Ok(name)
}

fn validate_segment(id: &str) -> Result<()> {
    if id.is_empty() || id == "." || id == ".." || id.contains(['/', '\\']) {
        return Err(Error::InvalidName(format!("invalid segment {:?}", id)));
    }
    Ok(())
}

impl fmt::Display for ResourceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl AsRef<str> for ResourceName {
    fn as_ref(&self) -> &str {
        &self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spec_name_concatenation() {
        let name = ResourceName::spec("p1", "l1", "a1", "v1", "s1").unwrap();
        assert_eq!(
            name.as_str(),
            "projects/p1/locations/l1/apis/a1/versions/v1/specs/s1"
        );
        assert_eq!(name.kind(), NameKind::Spec);
    }

    #[test]
    fn test_spec_path_resolves_to_canonical_name() {
        let path = SpecPath {
            project: "demo".to_string(),
            location: "global".to_string(),
            api: "petstore".to_string(),
            version: "1.0.0".to_string(),
            spec: "openapi.yaml".to_string(),
        };
        assert_eq!(
            path.resource_name().unwrap().to_string(),
            "projects/demo/locations/global/apis/petstore/versions/1.0.0/specs/openapi.yaml"
        );
    }

    #[test]
    fn test_api_name_by_truncation() {
        let spec = ResourceName::spec("p", "l", "a", "v", "s").unwrap();
        assert_eq!(spec.api_name().as_str(), "projects/p/locations/l/apis/a");

        let deployment = ResourceName::deployment("p", "l", "a", "prod").unwrap();
        assert_eq!(deployment.api_name().as_str(), "projects/p/locations/l/apis/a");
        assert_eq!(deployment.api_name().kind(), NameKind::Api);
    }

    #[test]
    fn test_parse_revision_name() {
        let name =
            ResourceName::parse("projects/p/locations/l/apis/a/versions/v/specs/s@abc123").unwrap();
        assert_eq!(name.kind(), NameKind::Spec);
        assert_eq!(
            name.as_str(),
            "projects/p/locations/l/apis/a/versions/v/specs/s@abc123"
        );
    }

    #[test]
    fn test_parse_deployment_name() {
        let name = ResourceName::parse("projects/p/locations/l/apis/a/deployments/d").unwrap();
        assert_eq!(name.kind(), NameKind::Deployment);
    }

    #[test]
    fn test_parse_rejects_wrong_collections() {
        assert!(ResourceName::parse("projects/p/zones/l/apis/a").is_err());
        assert!(ResourceName::parse("projects/p/locations/l/apis/a/versions/v/other/s").is_err());
        assert!(ResourceName::parse("projects/p").is_err());
    }

    #[test]
    fn test_rejects_traversal_segments() {
        assert!(ResourceName::spec("..", "l", "a", "v", "s").is_err());
        assert!(ResourceName::spec("p", "l", "a", "v", "").is_err());
        assert!(ResourceName::parse("projects/./locations/l/apis/a").is_err());
    }

    #[test]
    fn test_header_requires_ten_segments() {
        let name =
            spec_name_from_header("projects/p/locations/l/apis/a/versions/v/specs/s").unwrap();
        assert_eq!(name.as_str(), "projects/p/locations/l/apis/a/versions/v/specs/s");

        let err = spec_name_from_header("projects/p/locations/l/apis/a").unwrap_err();
        assert!(matches!(err, Error::InvalidName(_)));
        assert!(spec_name_from_header("projects/p/locations/l/apis/a/deployments/d/x/y").is_err());
    }

    #[test]
    fn test_artifact_name() {
        let spec = ResourceName::spec("p", "l", "a", "v", "s").unwrap();
        assert_eq!(
            spec.artifact("mock-endpoint"),
            "projects/p/locations/l/apis/a/versions/v/specs/s/artifacts/mock-endpoint"
        );
    }

    #[test]
    fn test_names_key_hash_sets() {
        let spec = ResourceName::spec("p", "l", "a", "v", "s").unwrap();
        let parsed = ResourceName::parse("projects/p/locations/l/apis/a/versions/v/specs/s").unwrap();
        let api = spec.api_name();

        let names: std::collections::HashSet<ResourceName> =
            [spec.clone(), parsed, api].into_iter().collect();
        assert_eq!(names.len(), 2);
        assert!(names.contains(&spec));
    }
}
