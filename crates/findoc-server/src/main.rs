//! FinDoc analysis server entry point.

use std::sync::Arc;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use findoc_engine::AnalysisEngineBuilder;
use findoc_ext_openai::OpenAiAnalyzer;
use findoc_ext_pdf::PdfTextExtractor;
use findoc_server::{Server, ServerConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,findoc=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("FinDoc Analysis Server v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config/findoc.toml".to_string());

    let mut server_config = if std::path::Path::new(&config_path).exists() {
        info!("Loading configuration from {}", config_path);
        ServerConfig::from_file(&config_path)?
    } else {
        info!("Using default configuration");
        ServerConfig::default()
    };
    server_config.apply_env_overrides()?;
    server_config.validate()?;

    // Collaborators
    let extractor = PdfTextExtractor::new();
    let analyzer = OpenAiAnalyzer::new(server_config.openai.clone())?;
    info!("Using model {}", analyzer.model());

    // Build engine
    let engine = AnalysisEngineBuilder::new()
        .with_config(server_config.engine_config())
        .with_extractor(Arc::new(extractor))
        .with_analyzer(Arc::new(analyzer))
        .build()?;

    let engine = Arc::new(engine);

    // Start engine
    engine.start().await?;

    // Serve until Ctrl-C
    let server = Server::new(server_config, engine.clone());
    server.start().await?;

    engine.shutdown().await;
    Ok(())
}
