use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use board_service::cache::{KeyValueCache, MemoryCache, RedisCache, UserInfoCache, WorkspaceCache};
use board_service::client::{CachedUserClient, HttpUserClient, UserClient};
use board_service::config::{AppConfig, LogFormat, LoggingConfig};
use board_service::database::Database;
use board_service::state::{AppState, Repositories};

#[derive(Parser)]
#[command(name = "board-service")]
#[command(about = "Project board API: workspaces, projects, boards and comments")]
#[command(version)]
struct Cli {
    #[arg(long, env = "BOARD_CONFIG", help = "YAML file layered over the environment preset")]
    config: Option<PathBuf>,

    #[arg(long, help = "Listen port, overrides configuration")]
    port: Option<u16>,

    #[arg(long, help = "Apply database migrations before serving")]
    migrate: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so local runs pick up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let mut config = AppConfig::load(cli.config.as_deref()).context("invalid configuration")?;
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    init_tracing(&config.logging);
    info!(environment = ?config.environment, "starting board-service");

    let database = Database::connect_lazy(&config.database)?;
    if cli.migrate {
        database.migrate().await.context("migrations failed")?;
    } else if config.database.run_migrations {
        // configured migrations must not keep the service from starting
        if let Err(err) = database.migrate().await {
            warn!(error = %err, "migrations not applied");
        }
    }

    let cache: Arc<dyn KeyValueCache> = match &config.cache.redis_url {
        Some(url) => {
            info!("using redis cache");
            Arc::new(RedisCache::new(url)?)
        }
        None => {
            info!("REDIS_URL not set, using in-process cache");
            Arc::new(MemoryCache::new())
        }
    };

    let http_client = Arc::new(HttpUserClient::new(&config.user_api)?);
    let user_client: Arc<dyn UserClient> = Arc::new(CachedUserClient::new(
        http_client,
        WorkspaceCache::new(cache.clone(), config.cache.membership_ttl()),
        UserInfoCache::new(cache.clone(), config.cache.profile_ttl()),
    ));

    let state = AppState::new(
        &config.security.jwt_secret,
        Arc::new(database.clone()),
        Repositories::postgres(database.pool().clone()),
        user_client,
        cache,
        &config.cache,
    );
    let app = board_service::app(state, &config.security);

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    info!(address = %bind_addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    let grace = Duration::from_secs(config.server.shutdown_timeout_secs);
    if tokio::time::timeout(grace, database.close()).await.is_err() {
        warn!("database pool did not close in time");
    }
    info!("shutdown complete");
    Ok(())
}

/// `RUST_LOG` wins over the configured level
fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    match logging.format {
        LogFormat::Json => tracing_subscriber::fmt().with_env_filter(filter).json().init(),
        LogFormat::Pretty => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "failed to listen for SIGTERM");
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
    info!("shutdown signal received");
}
