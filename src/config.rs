//! Server configuration.

use crate::args::Args;
use crate::pipeline::PipelineMode;
use anyhow::{ensure, Context, Result};
use derive_builder::Builder;
use std::net::SocketAddr;
use std::time::Duration;

/// Where and how completion calls are made.
#[derive(Builder, Clone)]
pub struct CompletionConfig {
    /// Base URL of the OpenAI-compatible API
    #[builder(setter(into), default = "String::from(crate::args::DEFAULT_BASE_URL)")]
    pub(crate) base_url: String,
    /// The route for inference requests
    #[builder(setter(into), default = "String::from(\"/v1/chat/completions\")")]
    pub(crate) inference_route: String,
    /// The API key for authentication with the model API
    #[builder(setter(into))]
    pub(crate) api_key: String,
    /// The ID of the model
    #[builder(setter(into), default = "String::from(crate::args::DEFAULT_MODEL_ID)")]
    pub model_id: String,
}

impl CompletionConfig {
    pub fn builder() -> CompletionConfigBuilder {
        CompletionConfigBuilder::default()
    }
}

/// Fully validated server configuration.
#[derive(Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub completion: CompletionConfig,
    pub default_mode: PipelineMode,
    pub stage_timeout: Duration,
    /// Bearer key for `/api` routes; `None` disables auth.
    pub api_key: Option<String>,
    /// Reported in the startup log only.
    pub rpc_endpoint: String,
}

impl ServerConfig {
    pub fn from_args(args: Args) -> Result<Self> {
        ensure!(
            !args.openai_api_key.trim().is_empty(),
            "OPENAI_API_KEY must not be empty"
        );
        ensure!(
            args.stage_timeout_secs > 0,
            "stage timeout must be at least one second"
        );

        let completion = CompletionConfig::builder()
            .base_url(args.base_url)
            .api_key(args.openai_api_key)
            .model_id(args.model)
            .build()
            .context("failed to build completion config")?;

        Ok(Self {
            bind_addr: args.listen,
            completion,
            default_mode: args.mode,
            stage_timeout: Duration::from_secs(args.stage_timeout_secs),
            api_key: args.server_api_key.filter(|k| !k.is_empty()),
            rpc_endpoint: args.rpc_endpoint,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn parse(extra: &[&str]) -> clap::error::Result<Args> {
        let mut argv = vec!["strategy-server"];
        argv.extend_from_slice(extra);
        Args::try_parse_from(argv)
    }

    #[test]
    fn rpc_endpoint_is_carried_verbatim() {
        let args = parse(&[
            "--openai-api-key",
            "sk-test",
            "--rpc-endpoint",
            "http://127.0.0.1:8899",
        ])
        .unwrap();
        let config = ServerConfig::from_args(args).unwrap();
        assert_eq!(config.rpc_endpoint, "http://127.0.0.1:8899");
    }

    #[test]
    fn defaults_apply() {
        let args = parse(&["--openai-api-key", "sk-test"]).unwrap();
        let config = ServerConfig::from_args(args).unwrap();

        assert_eq!(config.bind_addr.port(), 3000);
        assert_eq!(config.default_mode, PipelineMode::ThreeStage);
        assert_eq!(config.stage_timeout, Duration::from_secs(60));
        assert_eq!(config.completion.model_id, "gpt-4");
        assert_eq!(config.completion.inference_route, "/v1/chat/completions");
        assert_eq!(config.rpc_endpoint, "https://api.devnet.solana.com");
        assert!(config.api_key.is_none());
    }

    #[test]
    fn mode_parses_kebab_case() {
        let args = parse(&["--openai-api-key", "k", "--mode", "two-stage"]).unwrap();
        assert_eq!(args.mode, PipelineMode::TwoStage);
        assert!(parse(&["--openai-api-key", "k", "--mode", "four-stage"]).is_err());
    }

    #[test]
    fn blank_api_key_rejected() {
        let args = parse(&["--openai-api-key", "   "]).unwrap();
        let err = ServerConfig::from_args(args).err().unwrap();
        assert!(err.to_string().contains("OPENAI_API_KEY"));
    }

    #[test]
    fn zero_timeout_rejected() {
        let args = parse(&["--openai-api-key", "k", "--stage-timeout-secs", "0"]).unwrap();
        assert!(ServerConfig::from_args(args).is_err());
    }

    #[test]
    fn empty_server_key_disables_auth() {
        let args = parse(&["--openai-api-key", "k", "--server-api-key", ""]).unwrap();
        assert!(ServerConfig::from_args(args).unwrap().api_key.is_none());
    }
}
