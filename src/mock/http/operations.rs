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

use crate::spec::SpecDocument;
use serde_json::Value;
use url::Url;

const METHODS: &[&str] = &[
    "get", "put", "post", "delete", "options", "head", "patch", "trace",
];

/// One declared method+path pair and its operation object.
#[derive(Debug, Clone)]
pub struct Operation {
    /// Uppercase HTTP method.
    pub method: String,
    /// Path template as declared, e.g. `/pets/{petId}`.
    pub path: String,
    pub definition: Value,
}

impl Operation {
    pub fn id(&self) -> Option<&str> {
        self.definition.get("operationId").and_then(Value::as_str)
    }
}

pub fn extract_operations(document: &SpecDocument) -> Vec<Operation> {
    let root = document.value();
    let Some(paths) = root.get("paths").and_then(Value::as_object) else {
        return Vec::new();
    };

    let mut operations = Vec::new();
    for (path, item) in paths {
        let item = resolve_ref(root, item);
        for method in METHODS {
            if let Some(definition) = item.get(*method) {
                operations.push(Operation {
                    method: method.to_uppercase(),
                    path: path.clone(),
                    definition: definition.clone(),
                });
            }
        }
    }
    operations
}

/// Path prefixes requests may carry in front of the declared paths.
pub fn base_paths(document: &SpecDocument) -> Vec<String> {
    let root = document.value();
    let mut prefixes: Vec<String> = match document {
        SpecDocument::Swagger2(_) => root
            .get("basePath")
            .and_then(Value::as_str)
            .map(|p| vec![p.to_string()])
            .unwrap_or_default(),
        SpecDocument::OpenApi3(_) | SpecDocument::Unrecognized(_) => root
            .get("servers")
            .and_then(Value::as_array)
            .map(|servers| {
                servers
                    .iter()
                    .filter_map(|s| s.get("url").and_then(Value::as_str))
                    .filter_map(server_path)
                    .collect()
            })
            .unwrap_or_default(),
    };

    prefixes.retain(|p| !p.is_empty() && p != "/");
    prefixes.dedup();
    prefixes
}

fn server_path(url: &str) -> Option<String> {
    if url.starts_with('/') {
        return Some(url.trim_end_matches('/').to_string());
    }
    Url::parse(url)
        .ok()
        .map(|u| u.path().trim_end_matches('/').to_string())
}

/// Follows a local `$ref` (`#/...`) one level; anything else is returned as is.
pub fn resolve_ref<'a>(root: &'a Value, value: &'a Value) -> &'a Value {
    value
        .get("$ref")
        .and_then(Value::as_str)
        .and_then(|r| r.strip_prefix('#'))
        .and_then(|pointer| root.pointer(pointer))
        .unwrap_or(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_operations() {
        let doc = SpecDocument::from_value(json!({
            "openapi": "3.0.0",
            "paths": {
                "/pets": {
                    "get": {"operationId": "listPets"},
                    "post": {"operationId": "createPet"},
                    "parameters": []
                },
                "/pets/{petId}": {"$ref": "#/components/pathItems/pet"}
            },
            "components": {
                "pathItems": {"pet": {"delete": {"operationId": "deletePet"}}}
            }
        }));

        let ops = extract_operations(&doc);
        let mut ids: Vec<(&str, &str)> = ops
            .iter()
            .map(|o| (o.method.as_str(), o.id().unwrap()))
            .collect();
        ids.sort();
        assert_eq!(
            ids,
            vec![
                ("DELETE", "deletePet"),
                ("GET", "listPets"),
                ("POST", "createPet")
            ]
        );
    }

    #[test]
    fn test_no_paths() {
        let doc = SpecDocument::from_value(json!({"swagger": "2.0"}));
        assert!(extract_operations(&doc).is_empty());
    }

    #[test]
    fn test_base_paths() {
        let doc = SpecDocument::from_value(json!({"swagger": "2.0", "basePath": "/v2"}));
        assert_eq!(base_paths(&doc), vec!["/v2".to_string()]);

        let doc = SpecDocument::from_value(json!({
            "openapi": "3.0.0",
            "servers": [
                {"url": "https://api.example.com/v1/"},
                {"url": "/v1"},
                {"url": "https://other.example.com"}
            ]
        }));
        assert_eq!(base_paths(&doc), vec!["/v1".to_string()]);
    }
}
