use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use wispay_config::Config;
use wispay_core::{
    AccessController, ApprovalNotifier, CredentialGenerator, Orchestrator, PendingStore,
};
use wispay_server::auth::SessionSigner;
use wispay_server::{AppState, router};

#[derive(Debug, Parser)]
#[command(name = "wispay", about = "Captive-portal top-up service for RouterOS hotspots")]
struct Cli {
    /// Path to the configuration file.
    #[arg(short, long, default_value = "wispay.toml", env = "WISPAY_CONFIG")]
    config: PathBuf,

    /// Override the configured bind address.
    #[arg(short, long)]
    listen: Option<SocketAddr>,

    /// Increase log verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(err) = run(cli).await {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load(&cli.config)?;
    config.validate_server()?;

    let store = PendingStore::open(&config.store.dir).await?;
    let access = AccessController::new(&config.router_config()?)?;
    let notifier = ApprovalNotifier::new(&config.notifier_config()?)?;
    let generator = CredentialGenerator::new(config.portal.username_prefix.clone());

    let state = Arc::new(AppState {
        orchestrator: Orchestrator::new(store, access, notifier, generator),
        sessions: SessionSigner::new(
            &config.portal.session_secret,
            config.portal.session_ttl_minutes * 60,
        ),
        webhook_secret: config.telegram.webhook_secret.clone(),
    });

    // Tell the admin we're up; a failure here is worth a warning, not a
    // refusal to start.
    if let Err(e) = state.orchestrator.notifier().announce_startup().await {
        warn!(error = %e, "startup notice not delivered");
    }

    let listen = cli.listen.unwrap_or(config.server.listen);
    let listener = tokio::net::TcpListener::bind(listen).await?;
    info!(%listen, "wispay portal listening");

    let app = router(state);
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to install ctrl-c handler");
    }
    info!("shutting down");
}
