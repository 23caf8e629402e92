mod config;
mod error;
mod handlers;
mod models;
mod services;
mod web; // Browser UI

use anyhow::Result;
use dotenv::dotenv;
use std::sync::Arc;

use config::AppConfig;
use handlers::AdvisorHandler;
use services::{AzureOpenAIService, CompletionClient};
use web::create_router;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logger
    env_logger::init();

    // Load environment variables
    dotenv().ok();

    log::info!("🚀 Starting Nutrition Advisor...");

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("❌ {}. Set AZURE_API_KEY and AZURE_ENDPOINT in the environment or .env file.", e);
            return Err(e.into());
        }
    };

    let azure = AzureOpenAIService::new(&config);
    log::info!(
        "✅ Azure OpenAI service initialized with deployment: {} (api-version {})",
        azure.deployment(),
        config.api_version
    );
    let client: Arc<dyn CompletionClient> = Arc::new(azure);

    let app = create_router(AdvisorHandler::new(client));

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    log::info!("🌐 Web UI listening on http://{}", config.bind_addr);
    println!("\n🥗 Nutrition Advisor is running at http://{}", config.bind_addr);
    println!("🛑 Press Ctrl+C to stop\n");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            log::info!("🛑 Shutting down...");
        })
        .await?;

    Ok(())
}
