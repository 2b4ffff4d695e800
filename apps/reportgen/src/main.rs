mod config;
mod content;
mod errors;
mod layout;
mod pipeline;
mod render;
mod routes;
mod shaping;
mod state;
mod telegram;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::pipeline::{ReportGenerator, ReportPipeline};
use crate::routes::build_router;
use crate::state::AppState;
use crate::telegram::{run_polling, ReportBot, TelegramClient};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting reportgen v{}", env!("CARGO_PKG_VERSION"));

    // Fonts and layout config are validated here; a missing font stops startup
    let pipeline = ReportPipeline::from_config(&config)?;
    info!(
        "Report pipeline ready (font: {}, sections: {}, output: {})",
        config.font_path.display(),
        config.report_sections,
        pipeline.output_dir().display()
    );
    let generator: Arc<dyn ReportGenerator> = Arc::new(pipeline);

    // Telegram front-end runs alongside HTTP when a token is configured
    match &config.telegram_bot_token {
        Some(token) => {
            let client = TelegramClient::new(token)?;
            let bot = Arc::new(ReportBot::new(
                client.clone(),
                generator.clone(),
                config.institution.clone(),
            ));
            tokio::spawn(run_polling(client, bot));
        }
        None => warn!("TELEGRAM_BOT_TOKEN not set; chat front-end disabled"),
    }

    let state = AppState {
        config: config.clone(),
        generator,
    };

    let app = build_router(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive()),
    );

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
