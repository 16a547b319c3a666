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

use crate::cache::SpecCache;
use crate::config::Config;
use crate::mock::{engine_for, MockEngine};
use crate::registry::{HttpRegistryClient, RegistryClient};
use crate::server::handlers::{
    health_handler, mock_deployment_handler, mock_header_handler, mock_spec_handler,
    not_found_handler, render_deployment_handler, render_spec_handler, spec_contents_handler,
};
use crate::server::openapi::ApiDoc;
use crate::telemetry::tracer::tracing_middleware;
use actix_web::dev::Server;
use actix_web::web;
use actix_web::App;
use actix_web::HttpResponse;
use actix_web::HttpServer;
use actix_web::Responder;
use std::sync::Arc;
use tracing::info;
use utoipa::OpenApi;
use utoipa_swagger_ui::{SwaggerUi, Url};

const SPEC: &str = "/projects/{project}/locations/{location}/apis/{api}/versions/{version}/specs/{spec}";
const DEPLOYMENT: &str = "/projects/{project}/locations/{location}/apis/{api}/deployments/{deployment}";

/// Process-wide context handed to every request.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub registry: Arc<dyn RegistryClient>,
    pub cache: SpecCache,
    pub mock_engine: Arc<dyn MockEngine>,
}

impl AppState {
    pub fn new(config: Config, registry: Arc<dyn RegistryClient>) -> Self {
        let cache = SpecCache::from_config(&config.cache, registry.clone());
        let mock_engine = engine_for(&config.mock);
        Self {
            config: Arc::new(config),
            registry,
            cache,
            mock_engine,
        }
    }

    /// State backed by the configured registry.
    pub fn from_config(config: Config) -> anyhow::Result<Self> {
        let registry = HttpRegistryClient::new(&config.registry)?;
        Ok(Self::new(config, Arc::new(registry)))
    }
}

/// Registers every route of the service.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/healthz").route(web::get().to(health_handler)))
        .service(web::resource("/").route(web::get().to(health_handler)))
        .service(web::resource("/api-docs/openapi.json").to(openapi_json_handler))
        .service(
            web::resource(format!("/render{}", SPEC))
                .route(web::get().to(render_spec_handler))
                .route(web::post().to(render_spec_handler)),
        )
        .service(
            web::resource(format!("/render{}", DEPLOYMENT))
                .route(web::get().to(render_deployment_handler)),
        )
        .service(
            web::resource(format!("/spec/{{format}}{}", SPEC))
                .route(web::get().to(spec_contents_handler))
                .route(web::post().to(spec_contents_handler))
                .default_service(web::to(not_found_handler)),
        )
        .service(web::resource(SPEC).to(mock_spec_handler))
        .service(web::resource(format!("{}/{{tail:.*}}", SPEC)).to(mock_spec_handler))
        .service(web::resource(DEPLOYMENT).to(mock_deployment_handler))
        .service(web::resource(format!("{}/{{tail:.*}}", DEPLOYMENT)).to(mock_deployment_handler))
        .service(web::resource("/mock").to(mock_header_handler))
        .service(web::resource("/mock/{tail:.*}").to(mock_header_handler));
}

pub async fn run_server(state: AppState) -> anyhow::Result<Server> {
    let server_config = state.config.server.clone();
    let addr = format!("{}:{}", server_config.host, server_config.port);

    info!("Starting server on {}", addr);
    info!("Server workers: {}", server_config.workers);
    info!("Max request size: {} bytes", server_config.max_request_size);
    info!(
        protocol = state.config.mock.protocol.as_str(),
        registry = %state.config.registry.address,
        "Mock engine configured"
    );

    let openapi = ApiDoc::openapi();
    let swagger_urls = vec![(Url::new("Registry Mock API", "/api-docs/openapi.json"), openapi)];
    let app_state = web::Data::new(state);
    let max_request_size = server_config.max_request_size;

    let server = HttpServer::new(move || {
        App::new()
            .wrap(tracing_middleware())
            .app_data(app_state.clone())
            .app_data(web::PayloadConfig::new(max_request_size))
            .service(SwaggerUi::new("/swagger-ui/{_:.*}").urls(swagger_urls.clone()))
            .configure(configure)
    })
    .workers(server_config.workers)
    .bind(addr)?
    .run();

    Ok(server)
}

async fn openapi_json_handler() -> impl Responder {
    HttpResponse::Ok().json(ApiDoc::openapi())
}
