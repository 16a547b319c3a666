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

use actix_web::http::StatusCode;

/// Failures of the resolution and mocking pipeline.
///
/// An unrecognised API format is deliberately absent: it is reported as
/// [`crate::spec::ApiFormat::Unknown`] and handled as a pass-through.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Deployment {0} has no active spec revision")]
    UnresolvableDeployment(String),

    #[error("Registry transport error: {0}")]
    Transport(String),

    #[error("Spec {0} is neither valid JSON nor valid YAML")]
    SpecUnparseable(String),

    #[error("Invalid GraphQL schema: {0}")]
    SchemaInvalid(String),

    #[error("GraphQL execution failed: {}", .0.join("; "))]
    SchemaExecution(Vec<String>),

    #[error("Invalid resource name: {0}")]
    InvalidName(String),

    #[error("Spec cache error: {0}")]
    Cache(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::InvalidName(_) | Error::SchemaExecution(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short label used for the `error.type` metric attribute.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::NotFound(_) => "not_found",
            Error::UnresolvableDeployment(_) => "unresolvable_deployment",
            Error::Transport(_) => "transport",
            Error::SpecUnparseable(_) => "spec_unparseable",
            Error::SchemaInvalid(_) => "schema_invalid",
            Error::SchemaExecution(_) => "schema_execution",
            Error::InvalidName(_) => "invalid_name",
            Error::Cache(_) => "cache",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_errors_map_to_400() {
        assert_eq!(
            Error::InvalidName("x".to_string()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            Error::SchemaExecution(vec!["bad".to_string()]).status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_registry_errors_map_to_500() {
        assert_eq!(
            Error::NotFound("projects/p".to_string()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            Error::UnresolvableDeployment("d".to_string()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_schema_execution_message_joins_errors() {
        let err = Error::SchemaExecution(vec!["a".to_string(), "b".to_string()]);
        assert_eq!(err.to_string(), "GraphQL execution failed: a; b");
        assert_eq!(err.kind(), "schema_execution");
    }
}
