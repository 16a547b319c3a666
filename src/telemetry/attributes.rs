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

//! Attribute names attached to spans and metrics.
//!
//! HTTP and error names follow the OpenTelemetry semantic conventions; the
//! registry and cache names are specific to this service.
//!
//! References:
//! - https://opentelemetry.io/docs/specs/semconv/http/http-spans/
//! - https://opentelemetry.io/docs/specs/semconv/rpc/rpc-spans/

pub mod http {
    pub const METHOD: &str = "http.method";

    /// Matched route pattern, never the raw path.
    pub const ROUTE: &str = "http.route";

    pub const TARGET: &str = "http.target";

    pub const RESPONSE_STATUS_CODE: &str = "http.response.status_code";
}

pub mod span {
    pub const KIND: &str = "span.kind";

    pub const KIND_SERVER: &str = "server";
}

pub mod error {
    pub const TYPE: &str = "error.type";
}

/// Outbound registry calls.
pub mod rpc {
    pub const METHOD: &str = "rpc.method";

    /// `ok` or `error`.
    pub const OUTCOME: &str = "rpc.outcome";
}

pub mod cache {
    /// `hit` or `miss`.
    pub const RESULT: &str = "cache.result";
}

pub mod mock {
    pub const PROTOCOL: &str = "mock.protocol";

    pub const SPEC: &str = "registry.spec";
}

pub fn outcome(ok: bool) -> &'static str {
    if ok {
        "ok"
    } else {
        "error"
    }
}

pub fn cache_result(hit: bool) -> &'static str {
    if hit {
        "hit"
    } else {
        "miss"
    }
}

#[cfg(feature = "otel")]
pub mod kv {
    use opentelemetry::KeyValue;

    pub fn http_method(method: impl Into<String>) -> KeyValue {
        KeyValue::new(super::http::METHOD, method.into())
    }

    pub fn http_route(route: impl Into<String>) -> KeyValue {
        KeyValue::new(super::http::ROUTE, route.into())
    }

    pub fn http_response_status_code(status: u16) -> KeyValue {
        KeyValue::new(super::http::RESPONSE_STATUS_CODE, status as i64)
    }

    pub fn error_type(error_type: impl Into<String>) -> KeyValue {
        KeyValue::new(super::error::TYPE, error_type.into())
    }

    pub fn rpc_method(method: impl Into<String>) -> KeyValue {
        KeyValue::new(super::rpc::METHOD, method.into())
    }

    pub fn rpc_outcome(ok: bool) -> KeyValue {
        KeyValue::new(super::rpc::OUTCOME, super::outcome(ok))
    }

    pub fn cache_result(hit: bool) -> KeyValue {
        KeyValue::new(super::cache::RESULT, super::cache_result(hit))
    }
}
