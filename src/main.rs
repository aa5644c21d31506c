use anyhow::{Context, Result};
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

mod classifier;
mod config;
mod predictor;
mod web;

use classifier::{ChaseClassifier, PipelineArtifact};
use config::Config;
use predictor::Predictor;
use web::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialise tracing / logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::parse();
    config.validate()?;

    // Load the classifier artifact once; it is immutable for the life of
    // the process and shared read-only across requests.
    let artifact = PipelineArtifact::load(&config.model_path)
        .with_context(|| format!("loading classifier artifact from {}", config.model_path))?;
    let classifier: Arc<dyn ChaseClassifier> = Arc::new(artifact);
    let vocab = classifier.vocabulary();
    info!(
        "Classifier '{}' loaded: {} teams, {} host cities",
        classifier.name(),
        vocab.batting_teams.len(),
        vocab.cities.len()
    );

    let predictor = Arc::new(Predictor::new(classifier));

    // Start the predictor HTTP server (blocks until shutdown)
    let app = web::router(AppState { predictor });
    let addr: SocketAddr = config.listen_addr.parse()?;
    info!("Predictor listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
