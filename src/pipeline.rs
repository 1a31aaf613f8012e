//! Prompt-chaining pipeline.
//!
//! Stage 1 turns the user's description into a [`StrategyAnalysis`]; stages 2
//! and 3 each receive that analysis serialized as JSON and return raw text.
//! Neither later stage sees the other's output.

use crate::completion::{ChatMessage, CompletionClient, CompletionRequest};
use crate::error::{PipelineError, UpstreamError};
use crate::normalize::{normalize, try_decode, Normalized};
use crate::strategy::prompts::{
    ANALYSIS_PROMPT, CONTRACT_PROMPT, CONVERSATION_PROMPT, PINE_SCRIPT_PROMPT,
};
use crate::strategy::{ChatTurn, StrategyAnalysis, StrategyReply};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Which stages a request runs.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum PipelineMode {
    /// One conversational call, structured reply when the model gives one.
    Single,
    /// Analysis, then Pine Script.
    TwoStage,
    /// Analysis, then Pine Script and contract code.
    #[default]
    ThreeStage,
}

/// One completion call within the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum Stage {
    Conversation,
    Analysis,
    Script,
    Contract,
}

/// Token budget and sampling temperature for a stage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StageBudget {
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Stage {
    pub fn system_prompt(self) -> &'static str {
        match self {
            Stage::Conversation => CONVERSATION_PROMPT,
            Stage::Analysis => ANALYSIS_PROMPT,
            Stage::Script => PINE_SCRIPT_PROMPT,
            Stage::Contract => CONTRACT_PROMPT,
        }
    }

    pub fn budget(self) -> StageBudget {
        let max_tokens = match self {
            Stage::Conversation | Stage::Analysis => 1000,
            Stage::Script | Stage::Contract => 2000,
        };
        StageBudget {
            max_tokens,
            temperature: 0.7,
        }
    }
}

/// Result of a successful pipeline run, shaped by the mode that produced it.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineOutput {
    Conversation(Normalized<StrategyReply>),
    Script {
        strategy: StrategyAnalysis,
        pine_script: String,
    },
    Full {
        analysis: StrategyAnalysis,
        pine_script: String,
        contract_code: String,
    },
}

/// Runs the stages of one request against a completion client.
///
/// Holds no per-request state; one instance serves all requests.
pub struct StagePipeline {
    client: Arc<dyn CompletionClient>,
    stage_timeout: Duration,
}

impl StagePipeline {
    pub fn new(client: Arc<dyn CompletionClient>, stage_timeout: Duration) -> Self {
        Self {
            client,
            stage_timeout,
        }
    }

    /// Validate `prompt` and run the stages `mode` names.
    ///
    /// `history` only feeds the single-call conversation; the analysis
    /// stages see the prompt alone.
    pub async fn run(
        &self,
        mode: PipelineMode,
        prompt: &str,
        history: &[ChatTurn],
    ) -> Result<PipelineOutput, PipelineError> {
        if prompt.trim().is_empty() {
            return Err(PipelineError::Validation("Prompt is required"));
        }

        info!(%mode, prompt_len = prompt.len(), history_len = history.len(), "running pipeline");

        match mode {
            PipelineMode::Single => {
                let reply = self.converse(prompt, history).await?;
                Ok(PipelineOutput::Conversation(reply))
            }
            PipelineMode::TwoStage => {
                let strategy = self.analyze(prompt).await?;
                let pine_script = self.generate_script(&strategy).await?;
                Ok(PipelineOutput::Script {
                    strategy,
                    pine_script,
                })
            }
            PipelineMode::ThreeStage => {
                let analysis = self.analyze(prompt).await?;
                let (pine_script, contract_code) = tokio::try_join!(
                    self.generate_script(&analysis),
                    self.generate_contract_code(&analysis)
                )?;
                Ok(PipelineOutput::Full {
                    analysis,
                    pine_script,
                    contract_code,
                })
            }
        }
    }

    /// Single conversational call; plain text is a valid outcome.
    pub async fn converse(
        &self,
        prompt: &str,
        history: &[ChatTurn],
    ) -> Result<Normalized<StrategyReply>, PipelineError> {
        let mut messages: Vec<ChatMessage> = history.iter().map(ChatMessage::from).collect();
        messages.push(ChatMessage::user(prompt));

        let raw = self.call_stage(Stage::Conversation, messages).await?;
        let reply = normalize::<StrategyReply>(&raw);
        if let Normalized::Structured(reply) = &reply {
            debug!(name = %reply.strategy.name, "conversation produced a strategy");
        }
        Ok(reply)
    }

    /// Stage 1. Output that does not decode as [`StrategyAnalysis`] is fatal.
    pub async fn analyze(&self, prompt: &str) -> Result<StrategyAnalysis, PipelineError> {
        let raw = self
            .call_stage(Stage::Analysis, vec![ChatMessage::user(prompt)])
            .await?;
        try_decode(&raw).map_err(|source| {
            warn!(error = %source, "analysis output is not a strategy breakdown");
            PipelineError::Parse {
                stage: Stage::Analysis,
                source,
            }
        })
    }

    /// Stage 2. Returns the script text exactly as generated.
    pub async fn generate_script(&self, analysis: &StrategyAnalysis) -> Result<String, PipelineError> {
        let handoff = Self::handoff(analysis)?;
        self.call_stage(Stage::Script, vec![ChatMessage::user(handoff)])
            .await
    }

    /// Stage 3. Returns the contract code exactly as generated.
    pub async fn generate_contract_code(
        &self,
        analysis: &StrategyAnalysis,
    ) -> Result<String, PipelineError> {
        let handoff = Self::handoff(analysis)?;
        self.call_stage(Stage::Contract, vec![ChatMessage::user(handoff)])
            .await
    }

    fn handoff(analysis: &StrategyAnalysis) -> Result<String, PipelineError> {
        serde_json::to_string(analysis).map_err(|e| PipelineError::Parse {
            stage: Stage::Analysis,
            source: e.into(),
        })
    }

    async fn call_stage(
        &self,
        stage: Stage,
        messages: Vec<ChatMessage>,
    ) -> Result<String, PipelineError> {
        let budget = stage.budget();
        let request = CompletionRequest {
            system: stage.system_prompt().to_string(),
            messages,
            max_tokens: budget.max_tokens,
            temperature: budget.temperature,
        };

        let started = Instant::now();
        let text = tokio::time::timeout(self.stage_timeout, self.client.complete(request))
            .await
            .map_err(|_| UpstreamError::Timeout(self.stage_timeout))
            .and_then(|result| result)
            .and_then(|text| {
                if text.trim().is_empty() {
                    Err(UpstreamError::EmptyResponse)
                } else {
                    Ok(text)
                }
            })
            .map_err(|source| PipelineError::Upstream { stage, source })?;

        debug!(
            %stage,
            elapsed_ms = started.elapsed().as_millis() as u64,
            bytes = text.len(),
            "stage completed"
        );
        Ok(text)
    }
}
