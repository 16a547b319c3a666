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

//! Request, registry and cache metrics.
//!
//! With the `otel` feature the recorders feed OTLP instruments from the
//! global meter; without it they only emit log events.

use crate::config::TelemetryConfig;
use tracing::info;

#[cfg(feature = "otel")]
use crate::telemetry::attributes;
#[cfg(feature = "otel")]
use opentelemetry_otlp::WithExportConfig;
#[cfg(feature = "otel")]
use tracing::{error, warn};

#[cfg(feature = "otel")]
const METER: &str = "registry-mock";

#[cfg(feature = "otel")]
static METER_PROVIDER: once_cell::sync::OnceCell<opentelemetry_sdk::metrics::SdkMeterProvider> =
    once_cell::sync::OnceCell::new();

#[cfg(feature = "otel")]
pub async fn init_metrics(config: &TelemetryConfig) -> anyhow::Result<()> {
    if !config.enabled {
        info!("Metrics are disabled");
        return Ok(());
    }

    let endpoint = crate::telemetry::tracer::signal_endpoint(config, "metrics");
    let timeout = std::time::Duration::from_secs(config.timeout_seconds);
    info!(endpoint = %endpoint, protocol = %config.protocol, "Configuring metric exporter");

    let exporter = match config.protocol.to_lowercase().as_str() {
        "http" => opentelemetry_otlp::MetricExporter::builder()
            .with_http()
            .with_endpoint(&endpoint)
            .with_timeout(timeout)
            .build(),
        protocol => {
            if protocol != "grpc" {
                warn!("Unknown protocol '{}', defaulting to gRPC", protocol);
            }
            opentelemetry_otlp::MetricExporter::builder()
                .with_tonic()
                .with_endpoint(&endpoint)
                .with_timeout(timeout)
                .build()
        }
    }
    .map_err(|e| {
        error!("Failed to build OpenTelemetry metric exporter: {}", e);
        anyhow::anyhow!("OpenTelemetry metric exporter build failed: {}", e)
    })?;

    let reader = opentelemetry_sdk::metrics::PeriodicReader::builder(exporter)
        .with_interval(std::time::Duration::from_secs(10))
        .build();

    let meter_provider = opentelemetry_sdk::metrics::SdkMeterProvider::builder()
        .with_reader(reader)
        .with_resource(crate::telemetry::tracer::resource(config))
        .build();

    opentelemetry::global::set_meter_provider(meter_provider.clone());
    let _ = METER_PROVIDER.set(meter_provider);

    info!("OpenTelemetry metrics initialized");
    Ok(())
}

#[cfg(not(feature = "otel"))]
pub async fn init_metrics(config: &TelemetryConfig) -> anyhow::Result<()> {
    if !config.enabled {
        info!("Metrics are disabled");
        return Ok(());
    }

    info!("Initializing basic metrics (OpenTelemetry feature not enabled)");
    Ok(())
}

#[cfg(feature = "otel")]
pub fn shutdown_metrics() {
    if let Some(provider) = METER_PROVIDER.get() {
        if let Err(e) = provider.shutdown() {
            warn!("Failed to shut down meter provider: {}", e);
        }
    }
}

#[cfg(not(feature = "otel"))]
pub fn shutdown_metrics() {}

#[cfg(feature = "otel")]
pub fn record_request(method: &str, route: &str, status: u16) {
    let counter = opentelemetry::global::meter(METER)
        .u64_counter("http_server_request_count_total")
        .with_description("Total number of HTTP requests")
        .build();

    counter.add(
        1,
        &[
            attributes::kv::http_method(method),
            attributes::kv::http_route(route),
            attributes::kv::http_response_status_code(status),
        ],
    );

    info!(method = %method, route = %route, status = %status, "Request completed");
}

#[cfg(feature = "otel")]
pub fn record_error(method: &str, route: &str, error_type: &str) {
    let counter = opentelemetry::global::meter(METER)
        .u64_counter("http_server_error_count_total")
        .with_description("Total number of failed HTTP requests")
        .build();

    counter.add(
        1,
        &[
            attributes::kv::http_method(method),
            attributes::kv::http_route(route),
            attributes::kv::error_type(error_type),
        ],
    );

    tracing::error!(method = %method, route = %route, error_type = %error_type, "Request error");
}

#[cfg(feature = "otel")]
pub fn record_latency(method: &str, route: &str, latency_ms: f64) {
    let histogram = opentelemetry::global::meter(METER)
        .f64_histogram("http_server_request_duration")
        .with_description("HTTP request duration in seconds")
        .with_unit("s")
        .build();

    histogram.record(
        latency_ms / 1000.0,
        &[
            attributes::kv::http_method(method),
            attributes::kv::http_route(route),
        ],
    );

    tracing::debug!(method = %method, route = %route, latency_ms = %latency_ms, "Request latency");
}

/// Counts one registry RPC by method and outcome.
#[cfg(feature = "otel")]
pub fn record_registry_call(method: &str, ok: bool) {
    let counter = opentelemetry::global::meter(METER)
        .u64_counter("registry_client_call_count_total")
        .with_description("Total number of registry RPCs")
        .build();

    counter.add(
        1,
        &[
            attributes::kv::rpc_method(method),
            attributes::kv::rpc_outcome(ok),
        ],
    );

    tracing::debug!(rpc_method = %method, ok, "Registry call");
}

#[cfg(feature = "otel")]
pub fn record_cache_lookup(hit: bool) {
    let counter = opentelemetry::global::meter(METER)
        .u64_counter("spec_cache_lookup_count_total")
        .with_description("Spec cache lookups by result")
        .build();

    counter.add(1, &[attributes::kv::cache_result(hit)]);

    tracing::debug!(hit, "Spec cache lookup");
}

#[cfg(not(feature = "otel"))]
pub fn record_request(method: &str, route: &str, status: u16) {
    info!(method = %method, route = %route, status = %status, "Request completed");
}

#[cfg(not(feature = "otel"))]
pub fn record_error(method: &str, route: &str, error_type: &str) {
    tracing::error!(method = %method, route = %route, error_type = %error_type, "Request error");
}

#[cfg(not(feature = "otel"))]
pub fn record_latency(method: &str, route: &str, latency_ms: f64) {
    tracing::debug!(method = %method, route = %route, latency_ms = %latency_ms, "Request latency");
}

#[cfg(not(feature = "otel"))]
pub fn record_registry_call(method: &str, ok: bool) {
    tracing::debug!(rpc_method = %method, ok, "Registry call");
}

#[cfg(not(feature = "otel"))]
pub fn record_cache_lookup(hit: bool) {
    tracing::debug!(hit, "Spec cache lookup");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_init_metrics_disabled() {
        let config = TelemetryConfig {
            enabled: false,
            ..Default::default()
        };

        assert!(init_metrics(&config).await.is_ok());
    }

    #[test]
    fn test_recorders_without_provider() {
        record_request("GET", "/projects/{project}/locations/{location}", 200);
        record_request("HEAD", "/mock/{tail:.*}", 200);
        record_error("POST", "/render/{tail:.*}", "not_found");
        record_latency("GET", "/healthz", 0.0);
        record_registry_call("GetApiSpecContents", true);
        record_registry_call("ListApiDeployments", false);
        record_cache_lookup(true);
        record_cache_lookup(false);
    }

    #[test]
    fn test_shutdown_without_provider() {
        shutdown_metrics();
    }
}
