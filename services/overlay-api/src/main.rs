//! Overlay modeling API service.
//!
//! HTTP server exposing weighted raster overlay, class breaks, map tile
//! rendering, histograms, and point sampling over a tiled layer catalog.

mod handlers;
mod model;
mod params;
mod state;

use anyhow::Result;
use axum::{
    extract::Extension,
    routing::{get, post},
    Router,
};
use clap::Parser;
use std::{net::SocketAddr, path::PathBuf, sync::Arc};
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use state::{AppState, ServiceConfig};

#[derive(Parser, Debug)]
#[command(name = "overlay-api")]
#[command(about = "Weighted raster overlay API server")]
struct Args {
    /// Listen address
    #[arg(short, long, default_value = "0.0.0.0:8777")]
    listen: String,

    /// Root directory of the tile catalog (falls back to CATALOG_ROOT)
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Working-grid resolution for extent-mode breaks and histograms
    /// (falls back to BREAKS_RESOLUTION)
    #[arg(long)]
    breaks_resolution: Option<usize>,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Initialize tracing
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .json()
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting overlay API server");

    // Initialize application state
    let config = ServiceConfig::resolve(args.catalog, args.breaks_resolution);
    info!(catalog = %config.catalog_root.display(), breaks_resolution = config.breaks_resolution, "configuration");
    let state = Arc::new(AppState::new(&config).await?);

    // Build router
    let app = Router::new()
        .route("/gt/colors", get(handlers::colors_handler))
        .route("/gt/breaks", post(handlers::breaks_handler))
        .route("/gt/wo", post(handlers::weighted_overlay_handler))
        .route("/gt/tile/:z/:x/:y", post(handlers::tile_handler))
        .route("/gt/histogram", post(handlers::histogram_handler))
        .route("/gt/value", post(handlers::value_handler))
        .route("/gt/spark/value", post(handlers::spark_value_handler))
        // Health check
        .route("/health", get(handlers::health_handler))
        // Layer extensions
        .layer(Extension(state))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive());

    // Parse listen address
    let addr: SocketAddr = args.listen.parse()?;
    info!(address = %addr, "Listening");

    // Start server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
