//! Wiring & DI. Entry point: bootstrap adapters, inject into services, run UI.
//! No business logic here.

use chrono::Utc;
use dotenv::dotenv;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use training_scheduler::adapters::backend::{HttpTrainingBackend, MemoryBackend};
use training_scheduler::adapters::ui::tui::TuiInputPort;
use training_scheduler::ports::{InputPort, TrainingBackend};
use training_scheduler::shared::config::AppConfig;
use training_scheduler::usecases::{
    BatchImportPipeline, EligibilityResolver, TrainingHoursDashboard,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let env_loaded = dotenv();
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match &env_loaded {
        Ok(path) => info!(path = %path.display(), "loaded .env"),
        Err(_) => info!(cwd = %cwd.display(), "no .env found (check CWD)"),
    }

    training_scheduler::adapters::ui::init_ui();

    let cfg = AppConfig::load().unwrap_or_else(|e| {
        warn!(error = %e, "configuration unreadable, using defaults");
        AppConfig::default()
    });

    let backend = create_backend(&cfg)?;

    // --- Services ---
    let resolver = Arc::new(EligibilityResolver::new(Arc::clone(&backend)));
    let pipeline = Arc::new(BatchImportPipeline::new(Arc::clone(&backend)));
    let dashboard = Arc::new(TrainingHoursDashboard::new(Arc::clone(&backend)));

    let input_port: Arc<dyn InputPort> = Arc::new(TuiInputPort::new(
        Arc::clone(&backend),
        resolver,
        pipeline,
        dashboard,
    ));

    // --- Run (main menu -> sessions / registration / imports / registrants / dashboard) ---
    input_port
        .run()
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    Ok(())
}

/// HTTP backend from config, or the seeded in-memory one when running offline.
fn create_backend(cfg: &AppConfig) -> anyhow::Result<Arc<dyn TrainingBackend>> {
    if cfg.is_offline() {
        warn!("TRAINING_OFFLINE is set, using in-memory backend with demo data");
        return Ok(Arc::new(MemoryBackend::with_demo_data(Utc::now())));
    }

    let url = cfg.api_url_or_default();
    let token = cfg.api_token();
    let timeout = Duration::from_secs(cfg.request_timeout_secs_or_default());
    info!(
        url = %url,
        authenticated = token.is_some(),
        timeout_secs = timeout.as_secs(),
        "using HTTP training backend"
    );
    let backend = HttpTrainingBackend::new(url, token, timeout)
        .map_err(|e| anyhow::anyhow!("HTTP client setup failed: {}", e))?;
    Ok(Arc::new(backend))
}
