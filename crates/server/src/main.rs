//! polling-system server entry point.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use polling_api::AppState;
use polling_common::Config;
use polling_core::NewUserInput;
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "polling")]
#[command(about = "Polls, questions and answers over HTTP")]
struct Cli {
    /// Read configuration from this file instead of `config/`.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Migrate, then serve HTTP until interrupted.
    Serve,
    /// Apply pending migrations and exit.
    Migrate,
    /// Provision an account that can obtain tokens.
    CreateUser {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
        /// Grant unrestricted access.
        #[arg(long, default_value_t = false)]
        admin: bool,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "polling=debug,tower_http=debug".into());
    let json = std::env::var("POLLING_LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

/// Waits for a shutdown signal (SIGINT or SIGTERM).
///
/// On Windows, this only listens for Ctrl+C.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

async fn serve(config: Config) -> anyhow::Result<()> {
    let db = polling_db::init(&config).await?;
    info!("Connected to database");

    info!("Running database migrations...");
    polling_db::migrate(&db).await?;
    info!("Migrations completed");

    let state = AppState::new(Arc::new(db), &config.auth);
    if !state.auth_service.has_admin().await? {
        warn!("No administrator account exists; create one with `polling create-user --admin`");
    }

    let app = polling_api::app(state)
        .layer(RequestBodyLimitLayer::new(config.server.body_limit_bytes))
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .with_context(|| format!("invalid listen address {}", config.server.host))?;
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

async fn migrate(config: Config) -> anyhow::Result<()> {
    let db = polling_db::init(&config).await?;
    polling_db::migrate(&db).await?;
    info!("Migrations completed");
    Ok(())
}

async fn create_user(config: Config, input: NewUserInput) -> anyhow::Result<()> {
    let db = polling_db::init(&config).await?;
    polling_db::migrate(&db).await?;

    let state = AppState::new(Arc::new(db), &config.auth);
    let user = state.auth_service.create_user(input).await?;
    info!(user_id = user.id, username = %user.username, is_admin = user.is_admin, "Account ready");
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::load()?,
    };

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            info!("Starting polling-system server...");
            serve(config).await
        }
        Command::Migrate => migrate(config).await,
        Command::CreateUser {
            username,
            password,
            admin,
        } => {
            create_user(
                config,
                NewUserInput {
                    username,
                    password,
                    is_admin: admin,
                },
            )
            .await
        }
    }
}
