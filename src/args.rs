use crate::pipeline::PipelineMode;
use clap::Parser;
use std::net::SocketAddr;

pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_MODEL_ID: &str = "gpt-4";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";
pub const DEFAULT_STAGE_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_RPC_ENDPOINT: &str = "https://api.devnet.solana.com";

#[derive(Parser, Debug, Clone)]
#[command(name = "strategy-server")]
#[command(about = "Turns natural-language trading strategies into analysis, Pine Script and contract code")]
pub struct Args {
    /// Address to listen on
    #[arg(short, long, env = "STRATEGY_SERVER_LISTEN", default_value = DEFAULT_LISTEN_ADDR)]
    pub listen: SocketAddr,

    /// API key for the completion provider
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub openai_api_key: String,

    /// Model identifier sent with every completion call
    #[arg(short, long, env = "OPENAI_MODEL", default_value = DEFAULT_MODEL_ID)]
    pub model: String,

    /// Base URL of the OpenAI-compatible API
    #[arg(long, env = "OPENAI_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Pipeline mode used when a request does not name one
    #[arg(long, env = "PIPELINE_MODE", default_value = "three-stage")]
    pub mode: PipelineMode,

    /// Upper bound on a single stage's completion call
    #[arg(long, env = "STAGE_TIMEOUT_SECS", default_value_t = DEFAULT_STAGE_TIMEOUT_SECS)]
    pub stage_timeout_secs: u64,

    /// Bearer key required on /api routes (auth is off when unset)
    #[arg(long, env = "STRATEGY_SERVER_API_KEY", hide_env_values = true)]
    pub server_api_key: Option<String>,

    /// Solana RPC endpoint (logged at startup; not used by the pipeline)
    #[arg(long, env = "RPC_ENDPOINT", default_value = DEFAULT_RPC_ENDPOINT)]
    pub rpc_endpoint: String,
}
