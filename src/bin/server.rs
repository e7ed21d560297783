use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use committee_portal::{
    backup::spawn_backup_task,
    config::{get_config, CliArgs, Config},
    create_app_with_state, db, run_migrations, AppState,
};

/// Installs the global subscriber
///
/// Human readable output goes to stdout. With a log directory configured,
/// JSON lines are also written to a daily rolling file; the returned guard
/// flushes that file and has to live until shutdown.
fn init_tracing(config: &Config, debug: bool) -> Option<WorkerGuard> {
    let default_level = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let (json_layer, guard) = match &config.log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "committee-portal.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .json()
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .with(json_layer)
        .init();

    guard
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = sigterm.recv() => {}
                    _ = tokio::signal::ctrl_c() => {}
                }
            }
            Err(err) => {
                warn!("Failed to listen for SIGTERM: {}", err);
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
    info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    let args = CliArgs::parse();
    let debug = args.debug;
    let config = get_config(args);
    let _log_guard = init_tracing(&config, debug);

    info!("Starting committee portal");

    // Initialize the database pool
    let pool = Arc::new(db::init_pool(&config.database_url)?);

    {
        let mut conn = pool.get().context("Failed to get a connection for migrations")?;
        run_migrations(&mut conn)?;
    }

    let _backup_task = spawn_backup_task(pool.clone(), &config);

    let app = create_app_with_state(AppState {
        pool,
        mail_domain: config.mail_domain.clone(),
    });

    let addr = SocketAddr::from(([127, 0, 0, 1], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server failed")?;

    info!("Server stopped");

    Ok(())
}
