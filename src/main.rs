use clap::Parser;
use tracing_subscriber::EnvFilter;

use a3s_users::ServiceConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ServiceConfig::parse();
    tracing::info!(
        version = %config.app_version,
        git_commit = %config.git_commit,
        nats_url = %config.nats_url,
        "Starting a3s-users"
    );

    a3s_users::server::start(config).await?;

    Ok(())
}
