//! Strategy server binary.
//!
//! Run with:
//! ```bash
//! OPENAI_API_KEY=sk-... strategy-server --listen 127.0.0.1:3000 --mode three-stage
//! ```

use anyhow::Result;
use clap::Parser;
use vibe_trading::logging::init_logging;
use vibe_trading::{run_server, Args, ServerConfig};

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    init_logging();

    let config = ServerConfig::from_args(Args::parse())?;
    run_server(config).await
}
