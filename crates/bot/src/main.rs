use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use ibi::{
    config::Config,
    repos::{PgEventRepo, PgProfileRepo, PgRedemptionRepo},
    state::AppState,
    stores::InMemoryCooldownTracker,
    sweeper,
};

#[derive(Parser)]
#[command(name = "ibi")]
#[command(about = "Community bot core: XP ledger and event-code redemption")]
struct Args {
    /// Run database migrations and exit
    #[arg(long)]
    migrate: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = envy::prefixed("IBI_").from_env::<Config>()?;

    // Set up tracing: JSON in production, human-readable otherwise
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if config.is_production() {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer())
            .init();
    }

    let database = PgPoolOptions::new()
        .max_connections(25)
        .connect(&config.database_url)
        .await?;

    // Run migrations via init container only (--migrate flag)
    if args.migrate {
        tracing::info!("Running database migrations...");
        sqlx::migrate!("./migrations").run(&database).await?;
        tracing::info!("Migrations complete");
        return Ok(());
    }

    let state = AppState::new(
        config.clone(),
        Arc::new(PgProfileRepo::new(database.clone())),
        Arc::new(PgEventRepo::new(database.clone())),
        Arc::new(PgRedemptionRepo::new(database)),
        Arc::new(InMemoryCooldownTracker::new()),
    );

    // The command front-end drives `state` from its gateway events; the
    // expiry sweep is the one job the core schedules itself.
    let sweep_every = Duration::from_secs(config.purge_interval_hours * 3600);
    let sweep = tokio::spawn(sweeper::run(state.registry.clone(), sweep_every));

    tracing::info!(
        cooldown_seconds = config.cooldown_seconds,
        purge_interval_hours = config.purge_interval_hours,
        "Core online"
    );

    shutdown_signal().await;
    sweep.abort();

    tracing::info!("Shutdown complete");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down..."),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down..."),
    }
}
