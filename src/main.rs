//! Faultline - error tracking microservice

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use faultline::{
    api::{build_router, AppState},
    config::{get_config_dir, get_data_dir, load_config, AppConfig},
    db::{init_database, ErrorStore},
};

#[derive(Parser)]
#[command(name = "faultline")]
#[command(version = "0.1.0")]
#[command(about = "Self-hosted error tracking microservice with a deduplicating SQLite store")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Host to bind to
    #[arg(short = 'H', long)]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Database path (defaults to the platform data dir)
    #[arg(short, long)]
    database: Option<String>,

    /// Path to config.toml
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the error tracking server
    Serve,
    /// Initialize the database
    Init,
    /// Show configuration info
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "faultline=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref());

    // Determine database path
    let db_path = cli
        .database
        .clone()
        .unwrap_or_else(|| config.database.get_path().to_string_lossy().to_string());

    match cli.command {
        Some(Commands::Init) => {
            println!("Initializing database at: {}", db_path);
            let _pool = init_database(&db_path).await?;
            println!("Database initialized successfully!");
            return Ok(());
        }
        Some(Commands::Config) => {
            println!("Faultline Configuration");
            println!("=======================");
            println!("Config directory: {}", get_config_dir().display());
            println!("Data directory: {}", get_data_dir().display());
            println!("Database path: {}", db_path);
            println!(
                "Server: {}:{}",
                cli.host.as_deref().unwrap_or(&config.server.host),
                cli.port.unwrap_or(config.server.port)
            );
            println!("Tracking enabled: {}", config.tracking.enabled);
            return Ok(());
        }
        _ => {}
    }

    let host = cli.host.unwrap_or_else(|| config.server.host.clone());
    let port = cli.port.unwrap_or(config.server.port);

    run_server(&host, port, &db_path, &config).await
}

async fn run_server(host: &str, port: u16, db_path: &str, config: &AppConfig) -> anyhow::Result<()> {
    tracing::info!("Initializing database at: {}", db_path);
    let store = ErrorStore::open(db_path, &config.tracking).await?;

    let app = build_router(AppState::new(store));

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;

    tracing::info!("Faultline listening on http://{}", addr);
    tracing::info!("API: http://{}/api/errors", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
