use std::sync::Arc;

use clap::Parser;

use toolforge::logging;
use toolforge::mcp::McpServer;
use toolforge::settings::Settings;
use toolforge::tools::forge::Forge;
use toolforge::tools::{ToolRegistry, load_descriptors, register_all};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let settings = Settings::parse();
    logging::init(settings.debug);

    tracing::info!(
        registry = %settings.registry.display(),
        "Starting toolforge"
    );

    let forge = Arc::new(Forge::new(settings.limits())?);
    let registry = Arc::new(ToolRegistry::new());

    // A broken registry file must not prevent the front end from starting;
    // the server then advertises an empty tool set.
    let descriptors = match load_descriptors(&settings.registry).await {
        Ok(descriptors) => descriptors,
        Err(error) => {
            tracing::error!(%error, "Failed to load the tool registry file, serving an empty tool set");
            Vec::new()
        }
    };

    // Registration runs to completion before the first request is read.
    tokio::select! {
        report = register_all(&forge, &registry, &descriptors) => {
            if !report.all_succeeded() {
                tracing::warn!(failed = report.failed_count(), "Some tools were skipped");
            }
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Startup aborted");
            return Ok(());
        }
    }

    let server = McpServer::new(forge, registry, settings);
    tokio::select! {
        result = server.serve() => result?,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Interrupted, shutting down");
        }
    }

    Ok(())
}
