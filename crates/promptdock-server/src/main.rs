//! PromptDock relay server entry point.

use clap::Parser;
use promptdock_core::Settings;
use promptdock_gateway::{Server, ServerConfig};
use std::net::IpAddr;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "promptdock", about = "LLM chat relay for PromptDock", version)]
struct Cli {
    /// Address to bind.
    #[arg(long, default_value = "127.0.0.1")]
    host: IpAddr,

    /// Port to listen on. Falls back to the PORT environment variable.
    #[arg(long, short)]
    port: Option<u16>,

    /// Default provider when a request names none.
    #[arg(long)]
    default_provider: Option<String>,

    /// Disable CORS headers.
    #[arg(long)]
    no_cors: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "promptdock=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = promptdock_core::env::load_dotenv() {
        debug!("Skipping .env: {}", e);
    }

    let cli = Cli::parse();

    let mut settings = Settings::from_env();
    if let Some(provider) = cli.default_provider {
        settings.default_provider = provider;
    }

    let config = ServerConfig {
        host: cli.host,
        port: cli.port.unwrap_or(settings.port),
        cors: !cli.no_cors,
    };

    Server::new(config, settings).run().await?;
    Ok(())
}
