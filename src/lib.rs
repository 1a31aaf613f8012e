//! Natural-language trading strategy server.
//!
//! A prompt such as "buy when RSI drops below 30" goes through a chain of
//! completion calls:
//!
//! ```text
//! 1. analysis  -> StrategyAnalysis (strict JSON)
//! 2. script    -> Pine Script text          } both fed the serialized
//! 3. contract  -> contract-interaction code } analysis, run concurrently
//! ```
//!
//! A single-call conversational mode and a two-stage mode cover the lighter
//! variants. The HTTP surface lives in [`server`].

pub mod args;
pub mod completion;
pub mod config;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod middleware;
pub mod normalize;
pub mod pine;
pub mod pipeline;
pub mod server;
pub mod strategy;

pub use args::Args;
pub use config::ServerConfig;
pub use pipeline::{PipelineMode, PipelineOutput, StagePipeline};
pub use server::run_server;
