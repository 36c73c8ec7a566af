//! # fixit
//!
//! Assembles the application from the adapters selected by cargo features and
//! serves it, or seeds a database with demo content.

#[cfg(not(all(feature = "db-sqlite", feature = "auth-simple")))]
compile_error!("fixit needs a storage and an auth adapter: enable `db-sqlite` and `auth-simple`");

use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use fx_api::{build_router, AppState, Settings};
use fx_auth_simple::{LogMailer, SimpleAuthProvider};
use fx_config::{AppConfig, LogFormat};
use fx_db_sqlite::SqliteStore;
use secrecy::ExposeSecret;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_LOG_FILTER: &str = "fixit=info,fx_api=info,fx_core=info,tower_http=info";

#[derive(Debug, Parser)]
#[command(name = "fixit", version, about = "Community issue tracker")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the web server (the default).
    Web {
        /// Overrides the configured port.
        #[arg(long)]
        port: Option<u16>,
    },
    /// Insert demo users, a community and issues into an empty database.
    Seed,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = AppConfig::load().context("loading configuration")?;
    init_tracing(config.log_format);

    match cli.command.unwrap_or(Command::Web { port: None }) {
        Command::Web { port } => {
            if let Some(port) = port {
                config.port = port;
            }
            serve(config).await
        }
        Command::Seed => {
            let store = SqliteStore::connect(&config.database_url).await?;
            let auth = auth_provider(&config)?;
            if fx_db_sqlite::seed::seed(&store, &auth).await? {
                tracing::info!("demo data inserted");
            } else {
                tracing::info!("database already has communities, nothing seeded");
            }
            Ok(())
        }
    }
}

fn init_tracing(format: LogFormat) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Json => registry.with(fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(fmt::layer()).init(),
    }
}

fn auth_provider(config: &AppConfig) -> anyhow::Result<SimpleAuthProvider> {
    let ttl = chrono::Duration::hours(config.session_ttl_hours);
    match &config.session_key {
        Some(key) => SimpleAuthProvider::new(key.expose_secret().as_bytes(), ttl),
        None => {
            tracing::warn!("no session_key configured; sessions will not survive a restart");
            SimpleAuthProvider::with_random_key(ttl)
        }
    }
}

async fn serve(config: AppConfig) -> anyhow::Result<()> {
    let store = Arc::new(SqliteStore::connect(&config.database_url).await?);
    tracing::info!(database = %config.database_url, "database ready");

    let auth = auth_provider(&config)?;
    if config.seed && fx_db_sqlite::seed::seed(&store, &auth).await? {
        tracing::info!("demo data inserted");
    }

    let state = AppState::from_store(
        store,
        Arc::new(auth),
        Arc::new(LogMailer::new(&config.from_name, &config.from_email)),
        Settings {
            app_name: config.app_name.clone(),
            root_url: config.root_url.clone(),
            show_errors: config.show_errors,
        },
    );
    let app = build_router(state);

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    tracing::info!(%addr, app = %config.app_name, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("shutdown complete");
    Ok(())
}

/// Resolves on Ctrl-C, or SIGTERM on Unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "cannot listen for Ctrl-C");
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
                tracing::error!(error = %err, "cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("received Ctrl-C, shutting down"),
        () = terminate => tracing::info!("received SIGTERM, shutting down"),
    }
}
