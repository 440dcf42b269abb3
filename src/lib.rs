pub mod config;
pub mod logging;
pub mod model;
pub mod model_gateway;
pub mod providers;
pub mod repl;
pub mod session;

use anyhow::Result;
use std::env;
use std::io;
use tracing::info;

use config::Config;
use model_gateway::HostModelGateway;
use repl::{run_repl, run_single_turn};

pub async fn run() -> Result<()> {
    dotenvy::dotenv().ok();
    logging::init();

    let cfg = Config::from_env()?;
    info!(
        provider = cfg.model_provider.as_str(),
        model = %cfg.model,
        base_url = %cfg.model_base_url,
        timeout_secs = cfg.model_timeout_secs,
        safety_settings = cfg.safety_settings.as_slice().len(),
        "loaded runtime configuration"
    );

    let gateway = HostModelGateway::from_config(&cfg)?;

    let args: Vec<String> = env::args().skip(1).collect();
    if args.is_empty() {
        run_repl(&gateway, &cfg).await
    } else {
        let prompt = args.join(" ");
        run_single_turn(&gateway, &cfg, &prompt, io::stdout().lock()).await
    }
}
