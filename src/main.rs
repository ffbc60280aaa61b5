//! Health Assistant - Main Entry Point
//!
//! Loads every configured classifier, then answers one JSON prediction request
//! per stdin line with one JSON response per stdout line.

use anyhow::{Context, Result};
use health_assistant::{
    config::{AppConfig, LoggingConfig},
    handler::RequestHandler,
    metrics::PredictionMetrics,
    models::{ModelLoader, ModelRegistry, PredictionService},
};
use std::io::{BufRead, Write};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn init_logging(logging: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(format!("health_assistant={}", logging.level)))?;

    // stdout carries responses, so logs go to stderr
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if logging.format == "json" {
        builder.json().init();
    } else {
        builder.init();
    }
    Ok(())
}

fn main() -> Result<()> {
    let config = AppConfig::load()?;
    init_logging(&config.logging)?;

    info!("Starting Health Assistant");
    info!(
        models_dir = %config.models.models_dir,
        models = config.models.entries.len(),
        "Configuration loaded successfully"
    );

    // Any model failing to load aborts startup
    let loader = ModelLoader::with_threads(config.models.onnx_threads)?;
    let registry = match ModelRegistry::from_config(&config, &loader) {
        Ok(registry) => registry,
        Err(e) => {
            error!(error = %e, kind = e.kind(), "Model loading failed, aborting");
            return Err(e).context("Failed to load models");
        }
    };

    let metrics = Arc::new(PredictionMetrics::new());
    let handler = RequestHandler::new(
        &config,
        &registry,
        PredictionService::with_metrics(metrics.clone()),
    );

    info!(models = ?registry.names(), "Ready for prediction requests");

    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout().lock();

    for line in stdin.lock().lines() {
        let line = line.context("Failed to read request")?;
        if line.trim().is_empty() {
            continue;
        }

        let response = handler.handle_line(&line);
        serde_json::to_writer(&mut stdout, &response)?;
        writeln!(stdout)?;
        stdout.flush()?;
    }

    info!("Input closed, shutting down...");
    metrics.print_summary();

    Ok(())
}
