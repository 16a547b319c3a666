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

//! Deterministic response synthesis for a matched operation.
//!
//! A declared example always wins over the schema. Schemas are walked with a
//! bounded depth so recursive definitions terminate.

use crate::mock::http::operations::{resolve_ref, Operation};
use serde_json::{json, Map, Value};

const MAX_DEPTH: usize = 8;
const JSON: &str = "application/json";

#[derive(Debug, Clone, PartialEq)]
pub struct Synthesized {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Option<Value>,
    pub headers: Vec<(String, String)>,
}

/// Parses `Prefer: code=404` style preferences.
pub fn preferred_status(prefer: Option<&str>) -> Option<u16> {
    prefer?
        .split([',', ';'])
        .filter_map(|part| part.trim().split_once('='))
        .find(|(key, _)| key.trim() == "code")
        .and_then(|(_, value)| value.trim().trim_matches('"').parse().ok())
}

/// Picks the declared response: the preferred code when declared, otherwise
/// the lowest 2xx, otherwise `default`, otherwise the first declared one.
fn select_response<'a>(
    responses: &'a Map<String, Value>,
    preferred: Option<u16>,
) -> Option<(u16, &'a Value)> {
    if let Some(code) = preferred {
        if let Some(response) = responses.get(&code.to_string()) {
            return Some((code, response));
        }
    }

    let mut numbered: Vec<(u16, &Value)> = responses
        .iter()
        .filter_map(|(code, response)| code.parse::<u16>().ok().map(|c| (c, response)))
        .collect();
    numbered.sort_by_key(|(code, _)| *code);

    numbered
        .iter()
        .find(|(code, _)| (200..300).contains(code))
        .copied()
        .or_else(|| responses.get("default").map(|r| (200, r)))
        .or_else(|| numbered.first().copied())
}

pub fn synthesize(root: &Value, operation: &Operation, preferred: Option<u16>) -> Synthesized {
    let empty = Map::new();
    let responses = operation
        .definition
        .get("responses")
        .and_then(Value::as_object)
        .unwrap_or(&empty);

    let Some((status, response)) = select_response(responses, preferred) else {
        return Synthesized {
            status: 200,
            content_type: None,
            body: None,
            headers: Vec::new(),
        };
    };
    let response = resolve_ref(root, response);
    let headers = response_headers(root, response);

    let (content_type, body) = if response.get("content").is_some() {
        openapi3_body(root, response)
    } else {
        swagger2_body(root, operation, response)
    };

    Synthesized {
        status,
        content_type,
        body,
        headers,
    }
}

fn openapi3_body(root: &Value, response: &Value) -> (Option<String>, Option<Value>) {
    let Some(content) = response.get("content").and_then(Value::as_object) else {
        return (None, None);
    };
    let Some((media_type, media)) = content
        .get_key_value(JSON)
        .or_else(|| content.iter().find(|(k, _)| k.contains("json")))
        .or_else(|| content.iter().next())
    else {
        return (None, None);
    };

    let body = media
        .get("example")
        .cloned()
        .or_else(|| {
            media
                .get("examples")
                .and_then(Value::as_object)
                .and_then(|examples| examples.values().next())
                .map(|example| resolve_ref(root, example))
                .and_then(|example| example.get("value").cloned())
        })
        .or_else(|| media.get("schema").map(|schema| generate(root, schema, 0)));

    (Some(media_type.clone()), body)
}

fn swagger2_body(
    root: &Value,
    operation: &Operation,
    response: &Value,
) -> (Option<String>, Option<Value>) {
    let produces = operation
        .definition
        .get("produces")
        .or_else(|| root.get("produces"))
        .and_then(Value::as_array)
        .and_then(|p| p.iter().filter_map(Value::as_str).next())
        .unwrap_or(JSON)
        .to_string();

    if let Some(examples) = response.get("examples").and_then(Value::as_object) {
        if let Some((media_type, example)) = examples
            .get_key_value(produces.as_str())
            .or_else(|| examples.iter().next())
        {
            return (Some(media_type.clone()), Some(example.clone()));
        }
    }

    match response.get("schema") {
        Some(schema) => (Some(produces), Some(generate(root, schema, 0))),
        None => (None, None),
    }
}

/// Declared response headers that carry an example or a typed schema.
fn response_headers(root: &Value, response: &Value) -> Vec<(String, String)> {
    let Some(headers) = response.get("headers").and_then(Value::as_object) else {
        return Vec::new();
    };

    headers
        .iter()
        .filter(|(name, _)| !name.eq_ignore_ascii_case("content-type"))
        .filter_map(|(name, header)| {
            let header = resolve_ref(root, header);
            let value = header
                .get("example")
                .cloned()
                .unwrap_or_else(|| generate(root, header.get("schema").unwrap_or(header), 0));
            match value {
                Value::Null => None,
                Value::String(s) => Some((name.clone(), s)),
                other => Some((name.clone(), other.to_string())),
            }
        })
        .collect()
}

/// Builds a value satisfying `schema`.
pub fn generate(root: &Value, schema: &Value, depth: usize) -> Value {
    if depth > MAX_DEPTH {
        return Value::Null;
    }
    let schema = resolve_ref(root, schema);

    if let Some(example) = schema.get("example") {
        return example.clone();
    }
    if let Some(default) = schema.get("default") {
        return default.clone();
    }
    if let Some(first) = schema
        .get("enum")
        .and_then(Value::as_array)
        .and_then(|values| values.first())
    {
        return first.clone();
    }
    if let Some(parts) = schema.get("allOf").and_then(Value::as_array) {
        let mut merged = Map::new();
        for part in parts {
            if let Value::Object(fields) = generate(root, part, depth + 1) {
                merged.extend(fields);
            }
        }
        return Value::Object(merged);
    }
    if let Some(first) = ["oneOf", "anyOf"]
        .iter()
        .filter_map(|k| schema.get(*k).and_then(Value::as_array))
        .find_map(|variants| variants.first())
    {
        return generate(root, first, depth + 1);
    }

    let ty = match schema.get("type") {
        Some(Value::String(ty)) => ty.as_str(),
        // OpenAPI 3.1 style `type: [string, "null"]`.
        Some(Value::Array(types)) => types
            .iter()
            .filter_map(Value::as_str)
            .find(|t| *t != "null")
            .unwrap_or("null"),
        _ if schema.get("properties").is_some() => "object",
        _ if schema.get("items").is_some() => "array",
        _ => return Value::Null,
    };

    match ty {
        "object" => {
            let properties = schema
                .get("properties")
                .and_then(Value::as_object)
                .map(|props| {
                    props
                        .iter()
                        .map(|(name, prop)| (name.clone(), generate(root, prop, depth + 1)))
                        .collect()
                })
                .unwrap_or_default();
            Value::Object(properties)
        }
        "array" => match schema.get("items") {
            Some(items) => json!([generate(root, items, depth + 1)]),
            None => json!([]),
        },
        "string" => json!(string_for_format(
            schema.get("format").and_then(Value::as_str)
        )),
        "integer" => json!(0),
        "number" => json!(0.0),
        "boolean" => json!(true),
        _ => Value::Null,
    }
}

fn string_for_format(format: Option<&str>) -> &'static str {
    match format {
        Some("date-time") => "1970-01-01T00:00:00Z",
        Some("date") => "1970-01-01",
        Some("uuid") => "00000000-0000-0000-0000-000000000000",
        Some("email") => "user@example.com",
        Some("uri") | Some("url") => "https://example.com",
        Some("ipv4") => "127.0.0.1",
        Some("byte") => "",
        _ => "string",
    }
}
