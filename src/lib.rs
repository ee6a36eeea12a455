use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub mod bot;
pub mod commands;
pub mod imaging;
pub mod messaging;
pub mod pipeline;
pub mod startup_checks;
pub mod store;
pub mod webhook;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub app: AppConfig,
    #[serde(default)]
    pub static_files: StaticConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub imaging: ImagingConfig,
    #[serde(default)]
    pub messaging: messaging::MessagingConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    pub name: String,
    pub log_level: String,
    /// Public origin the storage URLs are built from.
    pub base_url: String,
    /// Events from these users are dropped without a reply.
    pub ignored_user_ids: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StaticConfig {
    pub directory: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfig {
    pub directory: PathBuf,
    pub url_prefix: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ImagingConfig {
    pub watermark: PathBuf,
    pub max_edge: u32,
    pub preview_width: u32,
    pub jpeg_quality: u8,
    pub transform_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            name: "Stampbot".to_string(),
            log_level: "info".to_string(),
            base_url: "http://127.0.0.1:3000".to_string(),
            ignored_user_ids: Vec::new(),
        }
    }
}

impl Default for StaticConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("static"),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("downloaded"),
            url_prefix: "/downloaded".to_string(),
        }
    }
}

impl Default for ImagingConfig {
    fn default() -> Self {
        Self {
            watermark: PathBuf::from("static/watermark.png"),
            max_edge: 1024,
            preview_width: 240,
            jpeg_quality: imaging::formats::jpeg::MAX_QUALITY,
            transform_timeout_secs: 30,
        }
    }
}

use axum::Router;
use std::sync::Arc;
use tower_http::{services::ServeDir, trace::TraceLayer};

use bot::EventHandler;
use imaging::WatermarkTemplate;
use messaging::DynMessagingClient;
use pipeline::{Pipeline, PipelineSettings};
use startup_checks::StartupCheckError;
use store::ImageStore;

#[derive(Clone)]
pub struct AppState {
    pub events: Arc<EventHandler>,
}

/// Build the pipeline described by `config`, loading the watermark template.
pub fn build_pipeline(config: &Config) -> Result<Pipeline, StartupCheckError> {
    let store = ImageStore::new(
        config.storage.directory.clone(),
        &config.app.base_url,
        &config.storage.url_prefix,
    )?;
    let watermark = WatermarkTemplate::load(&config.imaging.watermark).map_err(|e| {
        StartupCheckError::WatermarkUnreadable(config.imaging.watermark.clone(), e)
    })?;

    Ok(Pipeline::new(
        Arc::new(store),
        Arc::new(watermark),
        PipelineSettings::from(&config.imaging),
    ))
}

pub async fn create_app(config: Config) -> Result<Router, StartupCheckError> {
    let client = messaging::create_client(&config.messaging)?;
    create_app_with_client(config, client)
}

/// Like [`create_app`] with a caller-supplied messaging client.
pub fn create_app_with_client(
    config: Config,
    client: DynMessagingClient,
) -> Result<Router, StartupCheckError> {
    let pipeline = build_pipeline(&config)?;
    tracing::info!("Using messaging client: {}", client.name());

    let events = Arc::new(EventHandler::new(
        client,
        pipeline,
        config.app.ignored_user_ids.iter().cloned(),
    ));

    let storage_route = format!("/{}", config.storage.url_prefix.trim_matches('/'));
    let app_state = AppState { events };

    let router = Router::new()
        .route(
            "/webhooks",
            axum::routing::post(webhook::webhook_handler),
        )
        .nest_service("/static", ServeDir::new(&config.static_files.directory));

    // Storage served from the site root becomes the fallback
    let storage = ServeDir::new(&config.storage.directory);
    let router = if storage_route == "/" {
        router.fallback_service(storage)
    } else {
        router.nest_service(&storage_route, storage)
    };

    Ok(router
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    let method = request.method();
                    let uri = request.uri();
                    let matched_path = request
                        .extensions()
                        .get::<axum::extract::MatchedPath>()
                        .map(|matched_path| matched_path.as_str());

                    tracing::info_span!(
                        "http_request",
                        method = %method,
                        uri = %uri,
                        matched_path,
                    )
                })
                .on_request(|request: &axum::http::Request<_>, _span: &tracing::Span| {
                    let method = request.method();
                    let uri = request.uri();
                    let user_agent = request
                        .headers()
                        .get("user-agent")
                        .and_then(|h| h.to_str().ok())
                        .unwrap_or("-");

                    tracing::info!(
                        target: "access_log",
                        method = %method,
                        path = %uri.path(),
                        query = ?uri.query(),
                        user_agent = %user_agent,
                        "request"
                    );
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     _span: &tracing::Span| {
                        let status = response.status();
                        let size = response
                            .headers()
                            .get("content-length")
                            .and_then(|h| h.to_str().ok())
                            .unwrap_or("-");

                        tracing::info!(
                            target: "access_log",
                            status = %status,
                            size = %size,
                            latency_ms = %latency.as_millis(),
                            "response"
                        );
                    },
                ),
        )
        .with_state(app_state))
}
