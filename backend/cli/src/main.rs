mod api;
mod app;
mod check_cmd;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use uuid::Uuid;

use autoinspect_config::{config_dir, config_file_path, load_and_prepare, validate, AutoInspectConfig};
use autoinspect_logging::init_logger;

use app::AppState;

#[derive(Parser)]
#[command(name = "autoinspect")]
#[command(about = "AutoInspect: AI-assisted used-vehicle inspection and reports")]
#[command(version)]
struct Cli {
    /// Path to config.yaml (defaults to ~/.autoinspect/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API server
    Serve {
        /// Port to bind the HTTP server to
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Analyse the photos of an inspection and store its scores
    Inspect {
        inspection_id: Uuid,
    },
    /// Render the PDF report for a vehicle's latest inspection
    Report {
        vehicle_id: Uuid,
        /// Also write the PDF to this file
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Print the effective config and validate it
    CheckConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config_path = cli
        .config
        .unwrap_or_else(|| config_file_path(&config_dir()));
    let config = load_and_prepare(&config_path).await?;

    init_logger(config.logging.level(), app::log_dir(&config));

    if let Commands::CheckConfig = cli.command {
        if !check_cmd::run(&config_path, &config).await? {
            std::process::exit(1);
        }
        return Ok(());
    }

    let report = validate(&config);
    if !report.is_valid() {
        bail!(
            "Invalid config at {}: {} error(s); run `autoinspect check-config`",
            config_path.display(),
            report.errors.len()
        );
    }

    match cli.command {
        Commands::Serve { port } => {
            let mut config = config;
            if port.is_some() {
                config.server.port = port;
            }
            run_server(config).await?;
        }
        Commands::Inspect { inspection_id } => {
            let state = AppState::from_config(&config)?;
            let summary = state.inspections.run_inspection(inspection_id).await?;
            println!("Inspection {} completed", summary.inspection.id);
            println!("  Overall:    {}/100", summary.scores.overall);
            println!("  Exterior:   {}/10", summary.scores.exterior);
            println!("  Interior:   {}/10", summary.scores.interior);
            println!("  Mechanical: {}/10", summary.scores.mechanical);
            println!("  Tires:      {}/10", summary.scores.tires);
            println!(
                "  Photos:     {} analysed, {} failed",
                summary.photos_analyzed, summary.photos_failed
            );
            println!("  Findings:   {}", summary.findings_created);
            if !summary.findings_persisted {
                println!("  Warning: findings could not be saved");
            }
        }
        Commands::Report { vehicle_id, out } => {
            let state = AppState::from_config(&config)?;
            let (blob_path, pdf) = state.reports.generate_report(vehicle_id).await?;
            println!("Report stored at {blob_path} ({} bytes)", pdf.len());
            if let Some(out) = out {
                tokio::fs::write(&out, &pdf)
                    .await
                    .with_context(|| format!("Failed to write {}", out.display()))?;
                println!("Report written to {}", out.display());
            }
        }
        Commands::CheckConfig => {}
    }

    Ok(())
}

async fn run_server(config: AutoInspectConfig) -> Result<()> {
    let addr = config.server.address();
    info!(
        port = config.server.port(),
        bind = %config.server.bind(),
        db = %config.storage.database_path(),
        "Starting AutoInspect server"
    );

    let state = Arc::new(AppState::from_config(&config)?);
    let app = api::build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!(addr = %addr, "HTTP API listening");

    axum::serve(listener, app).await?;

    Ok(())
}
