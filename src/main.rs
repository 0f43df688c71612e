use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use planboard::{api, client::PlanClient, config::ServerConfig};

#[derive(Parser)]
#[command(name = "planboard")]
#[command(about = "Plans of todos and notes behind a small REST API")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the planboard server
    Serve {
        /// Interface to bind
        #[arg(long)]
        host: Option<String>,

        /// Port for HTTP API
        #[arg(short, long)]
        port: Option<u16>,

        /// SQLite file holding the plans
        #[arg(short, long)]
        database: Option<PathBuf>,
    },
    /// Check server status
    Status {
        /// Base URL of the server (defaults to PLANBOARD_URL or http://127.0.0.1:4000)
        #[arg(long)]
        url: Option<String>,
    },
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "planboard=debug,tower_http=debug".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    // Refuse to serve at all without a working store.
    let db = config.open_store()?;

    let app = api::create_router_with_cors(db.clone(), config.cors_origins.as_deref());

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;
    tracing::info!("planboard listening on http://{}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutting down");
    db.close()
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    match cli.command {
        Some(Commands::Serve {
            host,
            port,
            database,
        }) => {
            let mut config = ServerConfig::load();
            if let Some(host) = host {
                config.host = host;
            }
            if let Some(port) = port {
                config.port = port;
            }
            if database.is_some() {
                config.database_path = database;
            }
            serve(config).await?;
        }
        Some(Commands::Status { url }) => {
            let client = match url {
                Some(url) => PlanClient::new(url),
                None => PlanClient::from_env(),
            };
            let health = client
                .health()
                .await
                .with_context(|| format!("planboard is not reachable at {}", client.base_url()))?;
            println!("planboard at {} is {}", client.base_url(), health.status);
        }
        None => serve(ServerConfig::load()).await?,
    }

    Ok(())
}
