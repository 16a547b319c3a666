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
use serde_json::Value;

/// A decoded HTTP API description, tagged by version once at decode time.
#[derive(Debug, Clone, PartialEq)]
pub enum SpecDocument {
    Swagger2(Value),
    OpenApi3(Value),
    Unrecognized(Value),
}

/// Decodes spec bytes as JSON, falling back to YAML.
pub fn parse_value(name: &str, data: &[u8]) -> Result<Value> {
    if let Ok(value) = serde_json::from_slice::<Value>(data) {
        return Ok(value);
    }
    serde_yaml::from_slice::<Value>(data).map_err(|_| Error::SpecUnparseable(name.to_string()))
}

impl SpecDocument {
    pub fn parse(name: &str, data: &[u8]) -> Result<Self> {
        Ok(Self::from_value(parse_value(name, data)?))
    }

    pub fn from_value(value: Value) -> Self {
        let marker = |key: &str, major: char| {
            value
                .get(key)
                .and_then(Value::as_str)
                .is_some_and(|v| v.starts_with(major))
        };
        let swagger2 = marker("swagger", '2');
        let openapi3 = marker("openapi", '3');

        if swagger2 {
            SpecDocument::Swagger2(value)
        } else if openapi3 {
            SpecDocument::OpenApi3(value)
        } else {
            SpecDocument::Unrecognized(value)
        }
    }

    pub fn value(&self) -> &Value {
        match self {
            SpecDocument::Swagger2(v) | SpecDocument::OpenApi3(v) | SpecDocument::Unrecognized(v) => v,
        }
    }

    pub fn into_value(self) -> Value {
        match self {
            SpecDocument::Swagger2(v) | SpecDocument::OpenApi3(v) | SpecDocument::Unrecognized(v) => v,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_is_tried_first() {
        let doc = SpecDocument::parse("s", br#"{"swagger": "2.0", "paths": {}}"#).unwrap();
        assert!(matches!(doc, SpecDocument::Swagger2(_)));
    }

    #[test]
    fn test_yaml_fallback() {
        let doc = SpecDocument::parse("s", b"openapi: 3.0.3\ninfo:\n  title: Pets\n").unwrap();
        assert!(matches!(doc, SpecDocument::OpenApi3(_)));
        assert_eq!(doc.value()["info"]["title"], json!("Pets"));
    }

    #[test]
    fn test_unparseable() {
        let err = SpecDocument::parse("specs/s", b"{ not: [valid").unwrap_err();
        assert!(matches!(err, Error::SpecUnparseable(_)));
    }

    #[test]
    fn test_version_markers() {
        let doc = SpecDocument::from_value(json!({"openapi": "2.0"}));
        assert!(matches!(doc, SpecDocument::Unrecognized(_)));

        let doc = SpecDocument::from_value(json!({"swagger": 2.0}));
        assert!(matches!(doc, SpecDocument::Unrecognized(_)));

        let doc = SpecDocument::from_value(json!({"asyncapi": "2.6.0"}));
        assert!(matches!(doc, SpecDocument::Unrecognized(_)));
    }
}
