//! Router assembly and server startup.

use crate::completion::OpenAiClient;
use crate::config::ServerConfig;
use crate::handlers::{generate_strategy, health, render_template, AppState};
use crate::middleware::{require_api_key, ApiKey};
use crate::pipeline::StagePipeline;
use anyhow::{Context, Result};
use axum::http::Method;
use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

/// Build the application router.
///
/// `/health` is public; `/api/*` routes sit behind [`require_api_key`].
pub fn router(state: AppState, api_key: ApiKey) -> Router {
    // CORS for local dev (allows any origin)
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
        .allow_origin(Any);

    let public = Router::new()
        .route("/health", get(health))
        .with_state(state.clone());

    let protected = Router::new()
        .route("/api/strategy", post(generate_strategy))
        .route("/api/pine/render", post(render_template))
        .with_state(state)
        .route_layer(from_fn_with_state(api_key, require_api_key));

    public
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// Wire the OpenAI client into a pipeline and serve until shutdown.
pub async fn run_server(config: ServerConfig) -> Result<()> {
    let client = OpenAiClient::new(&config.completion).context("failed to build HTTP client")?;

    info!("Starting strategy server");
    info!("  Listen: {}", config.bind_addr);
    info!("  Completion endpoint: {}", client.url());
    info!("  Model: {}", config.completion.model_id);
    info!("  Default mode: {}", config.default_mode);
    info!("  Stage timeout: {:?}", config.stage_timeout);
    info!("  RPC endpoint: {}", config.rpc_endpoint);
    info!("  API key auth: {}", config.api_key.is_some());

    let state = AppState {
        pipeline: Arc::new(StagePipeline::new(Arc::new(client), config.stage_timeout)),
        default_mode: config.default_mode,
    };
    let api_key = ApiKey(config.api_key.map(Arc::from));

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    axum::serve(listener, router(state, api_key))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Strategy server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {e}");
    }
}
