use anyhow::Context;
use clap::{Parser, Subcommand};
use mercado_backend_api::{build_router, AppState};
use mercado_backend_runtime::{shutdown_signal, telemetry, BackendServices};
use mercado_config::{load as load_config, AppConfig};
use serde_json::json;
use tokio::{io::AsyncWriteExt, net::TcpListener};
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "mercado-backend", version, about = "Mercado e-commerce backend")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Clone, Copy, Subcommand)]
enum Command {
    /// Run the HTTP and realtime server (default).
    Serve,
    /// Print every stored product and chat message as JSON.
    DumpData,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    telemetry::init_tracing()?;

    let config = load_config().context("failed to load configuration")?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config).await,
        Command::DumpData => dump_data(config).await,
    }
}

async fn serve(config: AppConfig) -> anyhow::Result<()> {
    info!("starting Mercado backend");

    let services = BackendServices::initialise(&config).await?;
    let state = AppState::new(services.catalog.clone(), services.messages.clone(), &config);
    let app = build_router(state);

    let address = format!("{}:{}", config.http.address, config.http.port);
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind http listener on {address}"))?;

    info!(%address, "http server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("http server error")?;

    services.db_pool.close().await;
    info!("backend shut down");
    Ok(())
}

async fn dump_data(config: AppConfig) -> anyhow::Result<()> {
    let services = BackendServices::initialise(&config).await?;

    let products = services
        .catalog
        .list()
        .await
        .context("failed to list products")?;
    let messages = services
        .messages
        .list_all()
        .await
        .context("failed to list messages")?;

    let dump = serde_json::to_vec_pretty(&json!({
        "products": products,
        "messages": messages,
    }))?;

    let mut stdout = tokio::io::stdout();
    stdout.write_all(&dump).await?;
    stdout.write_all(b"\n").await?;
    stdout.flush().await?;

    services.db_pool.close().await;
    Ok(())
}
