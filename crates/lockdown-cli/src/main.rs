use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use dotenvy::dotenv;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

use lockdown_cli::{failure_message, render_summary, Config, Stage};
use lockdown_client::ApiClient;
use lockdown_core::{resolve_template, Orchestrator};

#[tokio::main]
async fn main() -> ExitCode {
    // Load environment variables from .env file
    dotenv().ok();

    // Parse command line arguments; a missing token or bad option exits here
    let config = Config::parse();

    // Setup logging (stderr to keep stdout for the summary)
    let level = if config.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("Failed to install the log subscriber");
        return ExitCode::FAILURE;
    }

    let (client, template_id) = match startup(&config).await {
        Ok(ready) => ready,
        Err(e) => {
            error!("{}", failure_message(Stage::Startup, &e));
            return ExitCode::FAILURE;
        }
    };

    match execute(&config, client, &template_id).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", failure_message(Stage::Run, &e));
            ExitCode::FAILURE
        }
    }
}

/// Builds the client and checks the template; nothing is touched unless it exists.
async fn startup(config: &Config) -> anyhow::Result<(Arc<ApiClient>, String)> {
    info!("Connecting to {}", config.base_url);
    let client = ApiClient::new(&config.base_url, &config.token, &config.http_config())
        .context("Invalid service base URL")?;
    let client = Arc::new(client);

    let template_id = resolve_template(client.as_ref(), &config.template_id).await?;
    Ok((client, template_id))
}

async fn execute(config: &Config, client: Arc<ApiClient>, template_id: &str) -> anyhow::Result<()> {
    let orchestrator = Orchestrator::new(client, config.run_config());
    let summary = orchestrator.run(template_id).await?;

    println!("{}", render_summary(&summary));
    Ok(())
}
