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

use crate::config::TelemetryConfig;
use crate::telemetry::attributes;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use futures::future::LocalBoxFuture;
use std::future::ready;
use std::rc::Rc;
use std::task::{Context as TaskContext, Poll};
use tracing::{info, Instrument};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Registry;

#[cfg(feature = "otel")]
use opentelemetry::KeyValue;
#[cfg(feature = "otel")]
use opentelemetry_otlp::WithExportConfig;
#[cfg(feature = "otel")]
use tracing::{error, warn};

#[cfg(feature = "otel")]
static TRACER_PROVIDER: once_cell::sync::OnceCell<opentelemetry_sdk::trace::SdkTracerProvider> =
    once_cell::sync::OnceCell::new();

#[cfg(feature = "otel")]
static LOGGER_PROVIDER: once_cell::sync::OnceCell<opentelemetry_sdk::logs::SdkLoggerProvider> =
    once_cell::sync::OnceCell::new();

/// Reads W3C `traceparent`/`tracestate` from actix's own `HeaderMap`.
#[cfg(feature = "otel")]
struct ActixHeaderExtractor<'a>(&'a actix_web::http::header::HeaderMap);

#[cfg(feature = "otel")]
impl opentelemetry::propagation::Extractor for ActixHeaderExtractor<'_> {
    fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(|v| v.to_str().ok())
    }

    fn keys(&self) -> Vec<&str> {
        self.0.keys().map(|k| k.as_str()).collect()
    }
}

/// OTLP/HTTP collectors take one path per signal; gRPC takes the bare endpoint.
#[cfg(feature = "otel")]
pub(crate) fn signal_endpoint(config: &TelemetryConfig, signal: &str) -> String {
    if config.protocol.to_lowercase() != "http" {
        return config.endpoint.clone();
    }
    let suffix = format!("/v1/{}", signal);
    if config.endpoint.contains(&suffix) {
        config.endpoint.clone()
    } else {
        format!("{}{}", config.endpoint.trim_end_matches('/'), suffix)
    }
}

#[cfg(feature = "otel")]
pub(crate) fn resource(config: &TelemetryConfig) -> opentelemetry_sdk::Resource {
    opentelemetry_sdk::Resource::builder()
        .with_attributes(vec![
            KeyValue::new("service.name", config.service_name.clone()),
            KeyValue::new("service.version", config.service_version.clone()),
        ])
        .build()
}

#[cfg(feature = "otel")]
fn span_exporter(config: &TelemetryConfig) -> anyhow::Result<opentelemetry_otlp::SpanExporter> {
    let timeout = std::time::Duration::from_secs(config.timeout_seconds);
    let endpoint = signal_endpoint(config, "traces");
    info!(endpoint = %endpoint, protocol = %config.protocol, "Configuring span exporter");

    match config.protocol.to_lowercase().as_str() {
        "http" => opentelemetry_otlp::SpanExporter::builder()
            .with_http()
            .with_endpoint(&endpoint)
            .with_timeout(timeout)
            .build(),
        protocol => {
            if protocol != "grpc" {
                warn!("Unknown protocol '{}', defaulting to gRPC", protocol);
            }
            opentelemetry_otlp::SpanExporter::builder()
                .with_tonic()
                .with_endpoint(&endpoint)
                .with_timeout(timeout)
                .build()
        }
    }
    .map_err(|e| {
        error!("Failed to build OpenTelemetry span exporter: {}", e);
        anyhow::anyhow!("OpenTelemetry span exporter build failed: {}", e)
    })
}

#[cfg(feature = "otel")]
fn log_exporter(config: &TelemetryConfig) -> anyhow::Result<opentelemetry_otlp::LogExporter> {
    let timeout = std::time::Duration::from_secs(config.timeout_seconds);
    let endpoint = signal_endpoint(config, "logs");

    match config.protocol.to_lowercase().as_str() {
        "http" => opentelemetry_otlp::LogExporter::builder()
            .with_http()
            .with_endpoint(&endpoint)
            .with_timeout(timeout)
            .build(),
        _ => opentelemetry_otlp::LogExporter::builder()
            .with_tonic()
            .with_endpoint(&endpoint)
            .with_timeout(timeout)
            .build(),
    }
    .map_err(|e| {
        error!("Failed to build OpenTelemetry log exporter: {}", e);
        anyhow::anyhow!("OpenTelemetry log exporter build failed: {}", e)
    })
}

/// Installs the global subscriber. Logs always go to stdout; spans and logs
/// are also exported over OTLP when telemetry is enabled.
#[cfg(feature = "otel")]
pub async fn init_tracing(config: &TelemetryConfig) -> anyhow::Result<()> {
    use tracing::dispatcher::has_been_set;
    if has_been_set() {
        info!("A tracing subscriber is already set, skipping initialization");
        return Ok(());
    }

    if !config.enabled {
        install_fmt(config);
        info!("Tracing export is disabled");
        return Ok(());
    }

    let tracer_provider = opentelemetry_sdk::trace::SdkTracerProvider::builder()
        .with_batch_exporter(span_exporter(config)?)
        .with_resource(resource(config))
        .with_sampler(opentelemetry_sdk::trace::Sampler::ParentBased(Box::new(
            opentelemetry_sdk::trace::Sampler::TraceIdRatioBased(config.sampling_rate),
        )))
        .build();
    opentelemetry::global::set_tracer_provider(tracer_provider.clone());

    let logger_provider = opentelemetry_sdk::logs::SdkLoggerProvider::builder()
        .with_batch_exporter(log_exporter(config)?)
        .with_resource(resource(config))
        .build();

    opentelemetry::global::set_text_map_propagator(
        opentelemetry_sdk::propagation::TraceContextPropagator::new(),
    );

    let tracer = opentelemetry::global::tracer("registry-mock");
    let telemetry_layer = tracing_opentelemetry::layer().with_tracer(tracer);
    let otel_log_layer =
        opentelemetry_appender_tracing::layer::OpenTelemetryTracingBridge::new(&logger_provider);

    let subscriber = Registry::default()
        .with(tracing_subscriber::EnvFilter::new(&config.log_level))
        .with(telemetry_layer)
        .with(otel_log_layer);

    if config.log_format == "json" {
        let _ = subscriber
            .with(tracing_subscriber::fmt::layer().json())
            .try_init();
    } else {
        let _ = subscriber.with(tracing_subscriber::fmt::layer()).try_init();
    }

    let _ = TRACER_PROVIDER.set(tracer_provider);
    let _ = LOGGER_PROVIDER.set(logger_provider);

    info!(
        endpoint = %config.endpoint,
        sampling_rate = config.sampling_rate,
        "OpenTelemetry tracing initialized"
    );
    Ok(())
}

#[cfg(not(feature = "otel"))]
pub async fn init_tracing(config: &TelemetryConfig) -> anyhow::Result<()> {
    use tracing::dispatcher::has_been_set;
    if has_been_set() {
        info!("A tracing subscriber is already set, skipping initialization");
        return Ok(());
    }

    install_fmt(config);
    info!("Basic tracing initialized (OpenTelemetry feature not enabled)");
    Ok(())
}

fn install_fmt(config: &TelemetryConfig) {
    let subscriber =
        Registry::default().with(tracing_subscriber::EnvFilter::new(&config.log_level));

    if config.log_format == "json" {
        let _ = subscriber
            .with(tracing_subscriber::fmt::layer().json())
            .try_init();
    } else {
        let _ = subscriber.with(tracing_subscriber::fmt::layer()).try_init();
    }
}

/// Flushes and stops the span and log exporters.
#[cfg(feature = "otel")]
pub fn shutdown_tracing() {
    if let Some(provider) = TRACER_PROVIDER.get() {
        if let Err(e) = provider.shutdown() {
            warn!("Failed to shut down tracer provider: {}", e);
        }
    }
    if let Some(provider) = LOGGER_PROVIDER.get() {
        if let Err(e) = provider.shutdown() {
            warn!("Failed to shut down logger provider: {}", e);
        }
    }
}

#[cfg(not(feature = "otel"))]
pub fn shutdown_tracing() {}

pub fn tracing_middleware() -> TracingMiddleware {
    TracingMiddleware
}

pub struct TracingMiddleware;

impl<S, B> Transform<S, ServiceRequest> for TracingMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = actix_web::Error;
    type Transform = TracingMiddlewareService<S>;
    type InitError = ();
    type Future = std::future::Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(TracingMiddlewareService {
            service: Rc::new(service),
        }))
    }
}

pub struct TracingMiddlewareService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for TracingMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut TaskContext<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();

        let method = req.method().to_string();
        let target = req.path().to_string();
        let route = req
            .match_pattern()
            .unwrap_or_else(|| "default".to_string());

        let span = tracing::info_span!(
            "http.request",
            http.method = %method,
            http.target = %target,
            http.route = %route,
            span.kind = attributes::span::KIND_SERVER,
            http.response.status_code = tracing::field::Empty,
        );

        #[cfg(feature = "otel")]
        {
            use opentelemetry::propagation::TextMapPropagator;
            use opentelemetry_sdk::propagation::TraceContextPropagator;
            use tracing_opentelemetry::OpenTelemetrySpanExt;

            let parent_cx = TraceContextPropagator::new().extract(&ActixHeaderExtractor(req.headers()));
            let _ = span.set_parent(parent_cx);
        }

        Box::pin(async move {
            let response = service.call(req).instrument(span.clone()).await?;
            let status = response.status().as_u16();

            span.record(attributes::http::RESPONSE_STATUS_CODE, status);
            let _guard = span.enter();
            if (200..400).contains(&status) {
                tracing::info!(status, "Request handled");
            } else if (400..500).contains(&status) {
                tracing::warn!(status, "Client error");
            } else {
                tracing::error!(status, "Server error");
            }

            Ok(response)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test as actix_test;
    use actix_web::web;
    use actix_web::App;
    use actix_web::HttpResponse;

    #[actix_web::test]
    async fn test_tracing_middleware_passes_status_through() {
        let app = actix_test::init_service(
            App::new()
                .wrap(tracing_middleware())
                .route("/ok", web::get().to(|| async { HttpResponse::Ok().finish() }))
                .route(
                    "/moved",
                    web::get().to(|| async { HttpResponse::Found().finish() }),
                )
                .route(
                    "/error",
                    web::get().to(|| async { HttpResponse::InternalServerError().finish() }),
                ),
        )
        .await;

        for (uri, status) in [("/ok", 200), ("/moved", 302), ("/error", 500), ("/missing", 404)] {
            let req = actix_test::TestRequest::get().uri(uri).to_request();
            let resp = actix_test::call_service(&app, req).await;
            assert_eq!(resp.status(), status, "{}", uri);
        }
    }

    #[actix_web::test]
    async fn test_tracing_middleware_with_traceparent_header() {
        let app = actix_test::init_service(App::new().wrap(tracing_middleware()).route(
            "/projects/{project}",
            web::get().to(|| async { HttpResponse::Ok().finish() }),
        ))
        .await;

        let req = actix_test::TestRequest::get()
            .uri("/projects/p1")
            .insert_header((
                "traceparent",
                "00-4bf92f3577b34da6a3ce929d0e0e4736-00f067aa0ba902b7-01",
            ))
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200);
    }

    #[cfg(feature = "otel")]
    #[test]
    fn test_signal_endpoint() {
        let mut config = TelemetryConfig {
            endpoint: "http://collector:4318/".to_string(),
            protocol: "http".to_string(),
            ..Default::default()
        };
        assert_eq!(signal_endpoint(&config, "traces"), "http://collector:4318/v1/traces");

        config.endpoint = "http://collector:4318/v1/logs".to_string();
        assert_eq!(signal_endpoint(&config, "logs"), "http://collector:4318/v1/logs");

        config.protocol = "grpc".to_string();
        config.endpoint = "http://collector:4317".to_string();
        assert_eq!(signal_endpoint(&config, "traces"), "http://collector:4317");
    }
}
