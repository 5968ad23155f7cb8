mod config;
mod main_lib;

use config::Config;
use main_lib::{build_state, init_tracing, run_sync};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env();
    init_tracing();
    let state = build_state(&config).await?;

    // Per-symbol failures are reported in the summary, not as an exit code.
    run_sync(&state, config.force_refresh).await?;
    Ok(())
}
