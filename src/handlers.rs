//! HTTP request handlers.

use crate::error::PipelineError;
use crate::normalize::Normalized;
use crate::pine::{render_pine_script, PineTemplate};
use crate::pipeline::{PipelineMode, PipelineOutput, StagePipeline};
use crate::strategy::{ChatTurn, StrategyAnalysis, StrategyOutline};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

const GENERIC_FAILURE: &str = "Failed to generate strategy";

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<StagePipeline>,
    pub default_mode: PipelineMode,
}

/// Body of `POST /api/strategy`.
#[derive(Debug, Deserialize)]
pub struct StrategyRequest {
    #[serde(default)]
    pub prompt: Option<String>,
    /// Overrides the server's default mode for this request.
    #[serde(default)]
    pub mode: Option<PipelineMode>,
    /// Earlier turns of the conversation, oldest first.
    #[serde(default)]
    pub history: Vec<ChatTurn>,
}

/// Success payload; its shape depends on the pipeline mode.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum StrategyResponse {
    Chat {
        response: String,
    },
    Drafted {
        strategy: StrategyOutline,
        #[serde(rename = "pineScript")]
        pine_script: String,
    },
    Scripted {
        strategy: StrategyAnalysis,
        #[serde(rename = "pineScript")]
        pine_script: String,
    },
    Full {
        analysis: StrategyAnalysis,
        #[serde(rename = "pineScript")]
        pine_script: String,
        #[serde(rename = "contractCode")]
        contract_code: String,
    },
}

impl From<PipelineOutput> for StrategyResponse {
    fn from(output: PipelineOutput) -> Self {
        match output {
            PipelineOutput::Conversation(Normalized::Unstructured(response)) => {
                StrategyResponse::Chat { response }
            }
            PipelineOutput::Conversation(Normalized::Structured(reply)) => {
                StrategyResponse::Drafted {
                    strategy: reply.strategy,
                    pine_script: reply.pine_script,
                }
            }
            PipelineOutput::Script {
                strategy,
                pine_script,
            } => StrategyResponse::Scripted {
                strategy,
                pine_script,
            },
            PipelineOutput::Full {
                analysis,
                pine_script,
                contract_code,
            } => StrategyResponse::Full {
                analysis,
                pine_script,
                contract_code,
            },
        }
    }
}

/// Error reply: `{"error": message}` with a status code.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: &'static str,
}

impl ApiError {
    fn bad_request(message: &'static str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message,
        }
    }

    fn internal() -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: GENERIC_FAILURE,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::Validation(message) => ApiError::bad_request(message),
            PipelineError::Upstream { .. } | PipelineError::Parse { .. } => ApiError::internal(),
        }
    }
}

/// GET /health - Liveness and default mode.
pub async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({ "status": "ok", "mode": state.default_mode }))
}

/// POST /api/strategy - Run the pipeline for one prompt.
pub async fn generate_strategy(
    State(state): State<AppState>,
    payload: Result<Json<StrategyRequest>, JsonRejection>,
) -> Result<Json<StrategyResponse>, ApiError> {
    let Json(req) = payload.map_err(|rejection| {
        warn!(error = %rejection, "rejected strategy request body");
        ApiError::bad_request("Invalid request body")
    })?;

    let request_id = Uuid::new_v4();
    let mode = req.mode.unwrap_or(state.default_mode);
    let prompt = req.prompt.unwrap_or_default();

    match state.pipeline.run(mode, &prompt, &req.history).await {
        Ok(output) => {
            info!(%request_id, %mode, "strategy generated");
            Ok(Json(output.into()))
        }
        Err(err) if err.is_validation() => {
            info!(%request_id, error = %err, "strategy request rejected");
            Err(err.into())
        }
        Err(err) => {
            error!(%request_id, %mode, error = ?err, "strategy generation failed");
            Err(err.into())
        }
    }
}

/// POST /api/pine/render - Render a Pine Script template without a model call.
pub async fn render_template(
    payload: Result<Json<PineTemplate>, JsonRejection>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let Json(template) = payload.map_err(|rejection| {
        warn!(error = %rejection, "rejected pine template body");
        ApiError::bad_request("Invalid strategy template")
    })?;

    Ok(Json(json!({ "pineScript": render_pine_script(&template) })))
}
