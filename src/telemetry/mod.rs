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

pub mod attributes;
pub mod metrics;
pub mod tracer;

pub use metrics::init_metrics;
pub use tracer::{init_tracing, tracing_middleware};

use crate::config::TelemetryConfig;
use anyhow::Context;
use tracing::info;

pub async fn init_telemetry(config: &TelemetryConfig) -> anyhow::Result<()> {
    // Tracing first so metric setup is logged.
    init_tracing(config)
        .await
        .context("Failed to initialize tracing")?;

    init_metrics(config)
        .await
        .context("Failed to initialize metrics")?;

    info!(
        service = %config.service_name,
        version = %config.service_version,
        export = config.enabled,
        "Telemetry initialized"
    );
    Ok(())
}

pub async fn shutdown_telemetry() {
    info!("Shutting down telemetry");
    metrics::shutdown_metrics();
    tracer::shutdown_tracing();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_init_disabled_telemetry() {
        let config = TelemetryConfig {
            enabled: false,
            log_format: "text".to_string(),
            ..Default::default()
        };

        assert!(init_telemetry(&config).await.is_ok());
        shutdown_telemetry().await;
    }

    #[test]
    fn test_telemetry_config_defaults() {
        let config = TelemetryConfig::default();
        assert!(!config.enabled);
        assert_eq!(config.service_name, "registry-mock");
        assert_eq!(config.protocol, "grpc");
        assert_eq!(config.sampling_rate, 1.0);
    }
}
