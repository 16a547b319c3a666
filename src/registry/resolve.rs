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

use crate::error::{Error, Result};
use crate::registry::{ApiDeployment, NameKind, RegistryClient, ResourceName};
use crate::telemetry::metrics::record_registry_call;
use tracing::{info, warn};

/// A deployment together with the spec revision it currently serves.
#[derive(Debug, Clone)]
pub struct ResolvedDeployment {
    pub deployment: ApiDeployment,
    pub spec_revision: ResourceName,
}

/// Looks up a deployment and the spec revision it points at. Deployments are
/// never cached: their endpoint and active revision move independently of
/// the spec they serve.
pub async fn resolve_deployment(
    client: &dyn RegistryClient,
    name: &ResourceName,
) -> Result<ResolvedDeployment> {
    let deployment = client.get_api_deployment(name.as_str()).await;
    record_registry_call("GetApiDeployment", deployment.is_ok());
    let deployment = deployment?;

    if deployment.api_spec_revision.is_empty() {
        return Err(Error::UnresolvableDeployment(name.to_string()));
    }

    let spec_revision = ResourceName::parse(&deployment.api_spec_revision)?;
    if spec_revision.kind() != NameKind::Spec {
        return Err(Error::UnresolvableDeployment(name.to_string()));
    }

    info!(
        deployment = %name,
        spec_revision = %spec_revision,
        "Resolved deployment"
    );

    Ok(ResolvedDeployment {
        deployment,
        spec_revision,
    })
}

/// Deployments of the spec's parent api that serve `spec`, in listing order.
///
/// A listing failure is logged and yields an empty list.
pub async fn matching_deployments(
    client: &dyn RegistryClient,
    spec: &ResourceName,
) -> Vec<ApiDeployment> {
    let parent = spec.api_name();
    let filter = format!("api_spec_revision == \"{}\"", spec);

    let result = client.list_api_deployments(parent.as_str(), &filter).await;
    record_registry_call("ListApiDeployments", result.is_ok());

    match result {
        Ok(deployments) => deployments,
        Err(e) => {
            warn!(
                spec = %spec,
                error = %e,
                "Failed to list deployments, continuing without deployment endpoints"
            );
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeRegistry;

    fn deployment_name() -> ResourceName {
        ResourceName::deployment("p", "l", "a", "prod").unwrap()
    }

    #[tokio::test]
    async fn test_resolve_deployment() {
        let registry = FakeRegistry::new().with_deployment(ApiDeployment {
            name: deployment_name().to_string(),
            api_spec_revision: "projects/p/locations/l/apis/a/versions/v/specs/s@r1".to_string(),
            endpoint_uri: "https://prod.example.com".to_string(),
            ..Default::default()
        });

        let resolved = resolve_deployment(&registry, &deployment_name()).await.unwrap();
        assert_eq!(
            resolved.spec_revision.as_str(),
            "projects/p/locations/l/apis/a/versions/v/specs/s@r1"
        );
        assert_eq!(resolved.deployment.endpoint_uri, "https://prod.example.com");
    }

    #[tokio::test]
    async fn test_deployment_without_revision_is_unresolvable() {
        let registry = FakeRegistry::new().with_deployment(ApiDeployment {
            name: deployment_name().to_string(),
            ..Default::default()
        });

        let err = resolve_deployment(&registry, &deployment_name())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::UnresolvableDeployment(_)));
    }

    #[tokio::test]
    async fn test_missing_deployment_is_not_found() {
        let registry = FakeRegistry::new();
        let err = resolve_deployment(&registry, &deployment_name())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn test_matching_deployments_filters_on_revision() {
        let spec = ResourceName::spec("p", "l", "a", "v", "s").unwrap();
        let registry = FakeRegistry::new()
            .with_deployment(ApiDeployment {
                name: "projects/p/locations/l/apis/a/deployments/one".to_string(),
                api_spec_revision: spec.to_string(),
                endpoint_uri: "https://one.example.com".to_string(),
                ..Default::default()
            })
            .with_deployment(ApiDeployment {
                name: "projects/p/locations/l/apis/a/deployments/other".to_string(),
                api_spec_revision: "projects/p/locations/l/apis/a/versions/v/specs/t".to_string(),
                endpoint_uri: "https://other.example.com".to_string(),
                ..Default::default()
            });

        let deployments = matching_deployments(&registry, &spec).await;
        assert_eq!(deployments.len(), 1);
        assert_eq!(deployments[0].endpoint_uri, "https://one.example.com");
    }

    #[tokio::test]
    async fn test_listing_failure_degrades_to_empty() {
        let spec = ResourceName::spec("p", "l", "a", "v", "s").unwrap();
        let registry = FakeRegistry::new().failing_deployment_listing();

        let deployments = matching_deployments(&registry, &spec).await;
        assert!(deployments.is_empty());
    }
}
