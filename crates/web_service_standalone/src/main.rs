use std::sync::Arc;

use anyhow::Context;
use chat_core::Config;
use clap::Parser;
use llm_client::OpenAIProvider;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Serve the data-to-text HTTP API.
///
/// Flags override `config.toml` and the environment.
#[derive(Parser, Debug)]
#[command(name = "data-to-text-server")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(long)]
    port: Option<u16>,

    /// Chat completions model
    #[arg(long)]
    model: Option<String>,

    /// OpenAI-compatible API base URL
    #[arg(long)]
    api_base: Option<String>,

    /// Maximum accepted upload size in bytes
    #[arg(long)]
    max_upload_bytes: Option<usize>,
}

impl Args {
    fn apply(self, config: &mut Config) {
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(model) = self.model {
            config.model = model;
        }
        if let Some(api_base) = self.api_base {
            config.api_base = api_base;
        }
        if let Some(limit) = self.max_upload_bytes {
            config.max_upload_bytes = limit;
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .with_line_number(true)
                .with_file(false),
        )
        .init();

    let mut config = Config::new();
    Args::parse().apply(&mut config);

    tracing::info!(
        port = config.port,
        model = %config.model,
        api_base = %config.api_base,
        "Starting data-to-text server"
    );

    let provider =
        OpenAIProvider::from_config(&config).context("Failed to build completion client")?;

    web_service::server::run(config, Arc::new(provider))
        .await
        .map_err(anyhow::Error::msg)
}
