//! lifemark demo server.
//!
//! Serves the demo routes with the lifecycle plugin registered and logs
//! every request's phase durations.
//! Try: `RUST_LOG=info cargo run -p lifemark-axum` then `curl localhost:3000/`.

use std::path::Path;

use tracing_subscriber::{fmt, EnvFilter};

use lifemark_core::error::{LifemarkError, Result};
use lifemark_axum::{config, plugin::LifecyclePlugin, router};

const CONFIG_PATH: &str = "lifemark.yaml";

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let cfg = if Path::new(CONFIG_PATH).exists() {
        config::load_from_file(CONFIG_PATH)?
    } else {
        tracing::info!(path = CONFIG_PATH, "config file not found; using defaults");
        config::LifemarkConfig::default()
    };
    let listen = cfg.server.listen_addr()?;

    let plugin = LifecyclePlugin::new(&cfg.plugin)?;
    let app = router::build_router(&plugin);

    tracing::info!(%listen, "lifemark demo starting");
    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .map_err(|e| LifemarkError::Internal(format!("bind {listen} failed: {e}")))?;

    axum::serve(listener, app)
        .await
        .map_err(|e| LifemarkError::Internal(format!("server failed: {e}")))
}
