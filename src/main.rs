use anyhow::Result;
use rmcp::ServiceExt;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use welcome_background::service::WelcomeService;

#[tokio::main]
async fn main() -> Result<()> {
    // stdout carries the MCP transport
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "welcome_background=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!("Starting welcome background server");

    let welcome = WelcomeService::new()?;
    let controller = welcome.controller().clone();
    controller.start();

    let server = welcome.serve(rmcp::transport::stdio()).await?;
    server.waiting().await?;

    controller.shutdown();
    tracing::info!("Server shutdown complete");
    Ok(())
}
