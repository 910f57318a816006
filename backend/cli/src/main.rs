mod services;

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use geoclass_config::{apply_all_defaults, apply_env_overrides, config_file_path, load_config};
use geoclass_core::ImageInput;
use geoclass_gateway::{start_server, GatewayState};
use geoclass_logging::{init_logger, LoggerGuard};
use geoclass_media::{detect_mime_type, validate_upload};

#[derive(Parser)]
#[command(name = "geoclass")]
#[command(about = "geoclass: guess the country a street-level photo was taken in")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP classification service
    Serve {
        /// Port to bind the HTTP server to
        #[arg(short, long)]
        port: Option<u16>,
        /// Config file (defaults to $GEOCLASS_CONFIG or ./geoclass.yaml)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Classify a single image and print the result as JSON
    Classify {
        /// Path to the image
        image: PathBuf,
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Skip the upstream services and answer from the fallback predictor
        #[arg(long)]
        offline: bool,
    },
    /// Query a running server's health endpoint
    Status {
        #[arg(short, long)]
        port: Option<u16>,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Print the resolved config with secrets masked
    Config {
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { port, config } => {
            let path = config_file_path(config.as_deref());
            let _guard = init_logging(&path).await?;
            run_server(&path, port).await?;
        }
        Commands::Classify {
            image,
            config,
            offline,
        } => {
            let path = config_file_path(config.as_deref());
            let _guard = init_logging(&path).await?;
            classify_file(&path, &image, offline).await?;
        }
        Commands::Status { port, config } => {
            let path = config_file_path(config.as_deref());
            let config = geoclass_config::load(&path).await?;
            let port = port.unwrap_or(config.server.port());
            check_status(port).await?;
        }
        Commands::Config { config } => {
            let path = config_file_path(config.as_deref());
            let config = geoclass_config::load(&path).await?;
            let value = serde_json::to_value(&config)?;
            println!("{}", serde_json::to_string_pretty(&geoclass_config::redact(&value))?);
        }
    }

    Ok(())
}

/// The logger is set up from a lightly resolved config first, so warnings
/// raised by the full load are captured.
async fn init_logging(path: &Path) -> Result<LoggerGuard> {
    let config = apply_all_defaults(apply_env_overrides(load_config(path).await?));
    Ok(init_logger(config.logging.dir.as_deref(), config.logging.level()))
}

async fn run_server(path: &Path, port: Option<u16>) -> Result<()> {
    let mut config = geoclass_config::load_and_prepare(path).await?;
    if let Some(port) = port {
        config.server.port = Some(port);
    }

    let addr: SocketAddr = format!("{}:{}", config.server.bind(), config.server.port())
        .parse()
        .context("Invalid bind address")?;

    let pipeline = services::build_pipeline(&config)?;
    let state = GatewayState::new(pipeline, services::credential_status(&config))
        .with_max_upload_bytes(config.server.max_upload_bytes());

    info!(
        addr = %addr,
        max_upload_bytes = config.server.max_upload_bytes(),
        "Starting geoclass"
    );
    start_server(addr, state).await
}

async fn classify_file(path: &Path, image_path: &Path, offline: bool) -> Result<()> {
    let config = if offline {
        geoclass_config::load(path).await?
    } else {
        geoclass_config::load_and_prepare(path).await?
    };

    let data = tokio::fs::read(image_path)
        .await
        .with_context(|| format!("Failed to read image: {}", image_path.display()))?;
    let file_name = image_path.file_name().and_then(|n| n.to_str());
    let image: ImageInput = validate_upload(
        data.into(),
        Some(detect_mime_type(image_path)),
        file_name,
        config.server.max_upload_bytes(),
    )?;

    let pipeline = if offline {
        services::offline_pipeline(&config)
    } else {
        services::build_pipeline(&config)?
    };

    let response = pipeline.classify(&image).await;
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

async fn check_status(port: u16) -> Result<()> {
    let client = reqwest::Client::new();
    match client
        .get(format!("http://localhost:{port}/health"))
        .send()
        .await
    {
        Ok(resp) => {
            let body: serde_json::Value = resp.json().await?;
            println!("{}", serde_json::to_string_pretty(&body)?);
        }
        Err(_) => {
            println!("geoclass is not running on port {port}");
        }
    }
    Ok(())
}
