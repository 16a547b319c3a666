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

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiFormat {
    OpenApi,
    AsyncApi,
    GraphQl,
    Discovery,
    Grpc,
    Unknown,
}

/// Ordered detection tokens; the first one found in the text wins.
const TOKENS: &[(&str, ApiFormat)] = &[
    ("openapi", ApiFormat::OpenApi),
    ("asyncapi", ApiFormat::AsyncApi),
    ("discovery", ApiFormat::Discovery),
    ("proto", ApiFormat::Grpc),
    ("graphql", ApiFormat::GraphQl),
];

impl ApiFormat {
    /// Case-sensitive token scan over a MIME type or style label.
    pub fn from_text(text: &str) -> ApiFormat {
        TOKENS
            .iter()
            .find(|(token, _)| text.contains(token))
            .map(|(_, format)| *format)
            .unwrap_or(ApiFormat::Unknown)
    }

    /// Detects the format from the spec's MIME type, consulting the parent
    /// api's style label only when the MIME type is inconclusive. A failed
    /// label lookup fails detection.
    pub async fn detect<F, Fut, E>(mime_type: &str, style_label: F) -> Result<ApiFormat, E>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<Option<String>, E>>,
    {
        match Self::from_text(mime_type) {
            ApiFormat::Unknown => Ok(style_label()
                .await?
                .map(|label| Self::from_text(&label))
                .unwrap_or(ApiFormat::Unknown)),
            format => Ok(format),
        }
    }

    pub fn from_path_segment(segment: &str) -> ApiFormat {
        match segment {
            "openapi" => ApiFormat::OpenApi,
            "asyncapi" => ApiFormat::AsyncApi,
            "graphql" => ApiFormat::GraphQl,
            "discovery" => ApiFormat::Discovery,
            "grpc" | "proto" => ApiFormat::Grpc,
            _ => ApiFormat::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ApiFormat::OpenApi => "openapi",
            ApiFormat::AsyncApi => "asyncapi",
            ApiFormat::GraphQl => "graphql",
            ApiFormat::Discovery => "discovery",
            ApiFormat::Grpc => "grpc",
            ApiFormat::Unknown => "unknown",
        }
    }

    /// Formats with an interactive viewer; the rest are served raw.
    pub fn has_viewer(&self) -> bool {
        matches!(
            self,
            ApiFormat::OpenApi | ApiFormat::AsyncApi | ApiFormat::GraphQl
        )
    }
}

impl fmt::Display for ApiFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_mime_types() {
        assert_eq!(
            ApiFormat::from_text("application/x.openapi+gzip;version=3.0.0"),
            ApiFormat::OpenApi
        );
        assert_eq!(
            ApiFormat::from_text("application/x.asyncapi;version=2.0"),
            ApiFormat::AsyncApi
        );
        assert_eq!(
            ApiFormat::from_text("application/x.discovery"),
            ApiFormat::Discovery
        );
        assert_eq!(
            ApiFormat::from_text("application/x.protobuf+zip"),
            ApiFormat::Grpc
        );
        assert_eq!(ApiFormat::from_text("application/x.graphql"), ApiFormat::GraphQl);
        assert_eq!(ApiFormat::from_text("text/plain"), ApiFormat::Unknown);
    }

    #[test]
    fn test_first_token_wins() {
        assert_eq!(
            ApiFormat::from_text("application/x.graphql+openapi"),
            ApiFormat::OpenApi
        );
    }

    #[test]
    fn test_case_sensitive() {
        assert_eq!(ApiFormat::from_text("application/x.OpenAPI"), ApiFormat::Unknown);
    }

    #[tokio::test]
    async fn test_label_not_consulted_when_mime_matches() {
        let consulted = Cell::new(false);
        let format = ApiFormat::detect("application/x.openapi", || async {
            consulted.set(true);
            Ok::<_, String>(Some("graphql".to_string()))
        })
        .await;

        assert_eq!(format, Ok(ApiFormat::OpenApi));
        assert!(!consulted.get());
    }

    #[tokio::test]
    async fn test_label_fallback() {
        let format =
            ApiFormat::detect("", || async { Ok::<_, String>(Some("apihub-graphql".to_string())) }).await;
        assert_eq!(format, Ok(ApiFormat::GraphQl));

        let format = ApiFormat::detect("text/plain", || async { Ok::<_, String>(None) }).await;
        assert_eq!(format, Ok(ApiFormat::Unknown));

        let format =
            ApiFormat::detect("text/plain", || async { Ok::<_, String>(Some("rest".to_string())) }).await;
        assert_eq!(format, Ok(ApiFormat::Unknown));
    }

    #[tokio::test]
    async fn test_label_lookup_failure_is_returned() {
        let format = ApiFormat::detect("text/plain", || async { Err("api missing".to_string()) }).await;
        assert_eq!(format, Err("api missing".to_string()));

        let format = ApiFormat::detect("application/x.protobuf", || async {
            Err::<Option<String>, _>("unused".to_string())
        })
        .await;
        assert_eq!(format, Ok(ApiFormat::Grpc));
    }

    #[test]
    fn test_viewer_formats() {
        assert!(ApiFormat::OpenApi.has_viewer());
        assert!(ApiFormat::GraphQl.has_viewer());
        assert!(!ApiFormat::Grpc.has_viewer());
        assert!(!ApiFormat::Unknown.has_viewer());
    }
}
