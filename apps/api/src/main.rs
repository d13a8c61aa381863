use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use jobmatch::aggregation::Aggregator;
use jobmatch::config::{Config, ExtractionMode};
use jobmatch::matching::JobPipeline;
use jobmatch::routes::build_router;
use jobmatch::skills::{CollapseWhitespace, SkillCatalog, SkillExtractor, TextAnalysis};
use jobmatch::sources::build_sources;
use jobmatch::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(format!("jobmatch={}", &config.rust_log))),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting jobmatch API v{}", env!("CARGO_PKG_VERSION"));

    // Skill catalog is validated once here; an empty catalog stops startup.
    let catalog = Arc::new(
        SkillCatalog::new(&config.skill_catalog).context("Invalid skill catalog configuration")?,
    );
    let analysis = match config.extraction_mode {
        ExtractionMode::Keyword => TextAnalysis::Keyword,
        ExtractionMode::Normalized => TextAnalysis::Normalized(Arc::new(CollapseWhitespace)),
    };
    info!(
        skills = catalog.len(),
        analysis = analysis.label(),
        "Skill extractor initialized"
    );
    let extractor = SkillExtractor::with_analysis(catalog, analysis);

    let sources = build_sources(&config).context("Failed to build job source clients")?;
    let aggregator = Aggregator::new(sources).with_timeout(config.per_source_timeout);
    info!(
        sources = ?aggregator.source_tags(),
        timeout_ms = config.per_source_timeout.as_millis() as u64,
        "Aggregator initialized"
    );

    let state = AppState {
        config: Arc::new(config.clone()),
        pipeline: Arc::new(JobPipeline::new(aggregator, extractor)),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
