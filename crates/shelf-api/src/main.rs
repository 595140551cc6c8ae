use clap::{Parser, Subcommand};
use shelf_api::config::ShelfConfig;
use shelf_api::{AppState, build_router, demo, tracing_setup};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "shelf", version, about = "JSON collection resources over HTTP")]
struct Cli {
    /// Configuration file (defaults to $SHELF_CONFIG_PATH, then shelf.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP server (default)
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<u16>,
    },
    /// Insert and list sample profiles in a SQLite table
    Demo {
        #[arg(long, default_value = "sqlite::memory:")]
        database_url: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let (config, source) = match &cli.config {
        Some(path) => ShelfConfig::load_from(path)?,
        None => ShelfConfig::load()?,
    };
    let config = config.apply_profile()?;

    // Loading is reported once the subscriber exists.
    tracing_setup::init_tracing(&config.logging)?;
    info!(version = env!("CARGO_PKG_VERSION"), "Starting Shelf");
    source.log();
    info!(environment = %config.environment.env_type, "Configuration profile applied");

    match cli.command {
        Some(Command::Demo { database_url }) => {
            for line in demo::run_demo(&database_url).await? {
                println!("{line}");
            }
            Ok(())
        }
        Some(Command::Serve { host, port }) => start_server(config, host, port).await,
        None => start_server(config, None, None).await,
    }
}

async fn start_server(
    mut config: ShelfConfig,
    host: Option<String>,
    port: Option<u16>,
) -> anyhow::Result<()> {
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    let state = Arc::new(AppState::from_config(&config).await?);
    let resources: Vec<_> = state.resource_names().map(str::to_string).collect();
    let app = build_router(state, &config.limits);

    let addr = config.server.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, ?resources, "Web server started successfully");

    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;

    info!("Web server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
