use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use medcard::api::{create_router, AppState};
use medcard::config::Config;
use medcard::extraction::longest_digit_run;
use medcard::ocr::OcrProvider;
use medcard::services::CardScanner;

#[derive(Parser)]
#[command(name = "medcard")]
#[command(about = "Reads the patient number from a photographed medical card")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Start the HTTP server (default)
    Serve,
    /// Scan a local image and print the result as JSON
    Scan {
        /// Path to the card photo
        path: PathBuf,
    },
    /// Print what every variant and recognition mode reads from a local image
    Inspect {
        /// Path to the card photo
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    dotenvy::dotenv().ok();

    init_tracing();

    let config = Config::from_env();

    tracing::info!("Initializing OCR provider: {}...", config.ocr.engine);
    let ocr = OcrProvider::new(&config.ocr)?;
    if !ocr.is_available() {
        tracing::warn!("OCR unavailable - scans will report no patient number");
    }

    match args.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config, ocr).await,
        Command::Scan { path } => {
            let bytes = read_image(&path)?;
            let scanner = CardScanner::new(&config, ocr);
            let result = scanner.scan(bytes).await?;
            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(())
        }
        Command::Inspect { path } => {
            let bytes = read_image(&path)?;
            let scanner = CardScanner::new(&config, ocr);
            let attempts = scanner.inspect(bytes).await?;
            if attempts.is_empty() {
                println!("No recognition attempts were made (OCR engine unavailable)");
            }
            for attempt in &attempts {
                let marker = if longest_digit_run(&attempt.text) > 0 {
                    "digits"
                } else {
                    "-"
                };
                println!("[{:<6}] {:<40} {:?}", marker, attempt.method(), attempt.text);
            }
            Ok(())
        }
    }
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "medcard=info,tower_http=debug".into());

    let json = std::env::var("LOG_FORMAT")
        .map(|format| format.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

fn read_image(path: &Path) -> anyhow::Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("Failed to read image {}", path.display()))
}

async fn serve(config: Config, ocr: OcrProvider) -> anyhow::Result<()> {
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState::new(config, ocr);
    let app = create_router(state);

    tracing::info!("Medcard starting on http://{}", addr);
    tracing::info!("  Scan endpoint: http://{}/process_ocr", addr);
    tracing::info!("  Health check:  http://{}/health", addr);
    tracing::info!("  API docs:      http://{}/api/docs", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, draining in-flight scans...");
}
