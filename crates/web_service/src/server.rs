use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use chat_core::Config;
use llm_client::CompletionProvider;
use log::{error, info};
use session_manager::{SessionRegistry, TranscriptController};

use crate::controllers::{chat_controller, session_controller, system_controller};
use crate::middleware::TracingMiddleware;

pub struct AppState {
    pub registry: SessionRegistry,
    pub controller: TranscriptController,
}

impl AppState {
    pub fn new(provider: Arc<dyn CompletionProvider>, model: impl Into<String>) -> Self {
        Self {
            registry: SessionRegistry::new(),
            controller: TranscriptController::new(provider, model),
        }
    }

    /// State for a served process: the configured model, and idle sessions
    /// expire after `session_idle_ttl_secs`.
    pub fn from_config(provider: Arc<dyn CompletionProvider>, config: &Config) -> Self {
        Self {
            registry: SessionRegistry::with_idle_ttl(config.session_idle_ttl()),
            controller: TranscriptController::new(provider, config.model.clone()),
        }
    }
}

const DEFAULT_WORKER_COUNT: usize = 4;

pub fn app_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/v1")
            .configure(system_controller::config)
            .configure(session_controller::config)
            .configure(chat_controller::config),
    );
}

fn build_server(
    app_state: web::Data<AppState>,
    config: &Config,
) -> Result<actix_web::dev::Server, String> {
    let payload_limit = config.max_upload_bytes;
    let port = config.port;

    let server = HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .app_data(web::PayloadConfig::new(payload_limit))
            .wrap(TracingMiddleware)
            .wrap(Cors::permissive())
            .configure(app_config)
    })
    .workers(DEFAULT_WORKER_COUNT)
    .bind(format!("127.0.0.1:{port}"))
    .map_err(|e| format!("Failed to bind server: {e}"))?
    .run();

    Ok(server)
}

pub async fn run(config: Config, provider: Arc<dyn CompletionProvider>) -> Result<(), String> {
    info!("Starting web service...");

    let app_state = web::Data::new(AppState::from_config(provider, &config));
    let server = build_server(app_state, &config)?;

    info!(
        "Serving on http://127.0.0.1:{} (model {})",
        config.port, config.model
    );

    if let Err(e) = server.await {
        error!("Web server error: {}", e);
        return Err(format!("Web server error: {e}"));
    }

    Ok(())
}
