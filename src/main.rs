use batch_ingest::config::SchedulerConfig;
use batch_ingest::server::AppState;
use clap::Parser;
use std::net::SocketAddr;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "batch-ingest", about = "Priority-ordered, rate-limited batch ingestion API")]
struct Cli {
    /// Address the HTTP server binds to.
    #[arg(long, env = "INGEST_BIND", default_value = "127.0.0.1:8000")]
    bind: SocketAddr,

    #[command(flatten)]
    scheduler: SchedulerConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = cli.scheduler.clone();
    config.validate()?;

    tracing::info!("Scheduler config: {:?}", config);

    // 1. Shared state (status store + queue):
    let state = AppState::new(config);
    let shutdown = CancellationToken::new();

    // 2. Background worker and stats reporter:
    let worker = state.start_simulated_worker(shutdown.clone());
    let stats = state.start_stats_reporter(shutdown.clone());

    // 3. HTTP server:
    let app = state.router();
    let listener = tokio::net::TcpListener::bind(cli.bind).await?;

    tracing::info!("HTTP server listening on {}", cli.bind);
    tracing::info!("Press Ctrl+C to shutdown");

    let signal = shutdown.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for Ctrl+C: {}", e);
            }
            tracing::info!("Shutdown requested");
            signal.cancel();
        })
        .await?;

    shutdown.cancel();
    worker.await?;
    if let Some(stats) = stats {
        stats.await?;
    }

    Ok(())
}
