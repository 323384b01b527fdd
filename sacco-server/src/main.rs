//! sacco-server: SACCO membership verification backend
//!
//! Runs the REST service (default) and a few admin maintenance commands.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, anyhow, bail};
use clap::{Parser, Subcommand};
use sacco_server::{AppState, Config, DbService, api, auth, db, util};
use shared::models::UserCreate;
use tokio::net::TcpListener;

#[derive(Parser, Debug)]
#[command(author, version, about = "SACCO membership verification server", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP server
    Serve,
    /// Run database migrations
    Migrate,
    /// Create an admin user
    CreateUser {
        username: String,
        email: String,
        password: String,
        /// super_admin | member_manager | verification_viewer | correction_viewer
        #[arg(long, default_value = "super_admin")]
        role: String,
    },
    /// List admin users
    ListUsers,
    /// Set a new password for an existing user
    ChangePassword { username: String, password: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    let config = Config::from_env().map_err(|e| anyhow!("invalid configuration: {e}"))?;

    let subscriber = tracing_subscriber::fmt().with_env_filter(
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "sacco_server=info,tower_http=info".into()),
    );
    if config.is_development() {
        subscriber.init();
    } else {
        subscriber.json().init();
    }

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => run_serve(config).await,
        Command::Migrate => run_migrate(config).await,
        Command::CreateUser {
            username,
            email,
            password,
            role,
        } => run_create_user(config, username, email, password, role).await,
        Command::ListUsers => run_list_users(config).await,
        Command::ChangePassword { username, password } => {
            run_change_password(config, username, password).await
        }
    }
}

async fn open_database(config: &Config) -> anyhow::Result<DbService> {
    DbService::connect(&config.database_url)
        .await
        .map_err(|e| anyhow!("{}", e.message))
        .with_context(|| format!("open database {}", config.database_url))
}

async fn run_serve(config: Config) -> anyhow::Result<()> {
    tracing::info!(
        environment = %config.environment,
        database = %config.database_url,
        login_limit = %config.login_rate_limit,
        search_limit = %config.search_rate_limit,
        "Starting sacco-server"
    );

    let db = open_database(&config).await?;
    if let Some(admin) = &config.bootstrap_admin {
        auth::ensure_bootstrap_admin(&db.pool, admin)
            .await
            .map_err(|e| anyhow!("bootstrap admin: {e}"))?;
    }

    let http_port = config.http_port;
    let state = AppState::new(db, config);
    spawn_cleanup(state.clone());

    let app = api::build_app(state);
    let addr = format!("0.0.0.0:{http_port}");
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("bind {addr}"))?;
    tracing::info!("sacco-server HTTP listening on {addr}");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("HTTP server error")?;

    Ok(())
}

/// Every 5 minutes: drop closed rate limit windows and expired sessions
fn spawn_cleanup(state: AppState) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(300));
        loop {
            interval.tick().await;
            let closed = state.rate_limiter.cleanup().await;
            if closed > 0 {
                tracing::debug!(windows = closed, "Rate limit windows removed");
            }
            match db::sessions::purge_expired(&state.pool, util::now_millis()).await {
                Ok(0) => {}
                Ok(n) => tracing::debug!(purged = n, "Expired sessions removed"),
                Err(e) => tracing::warn!(error = %e, "Session cleanup failed"),
            }
        }
    });
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutdown signal received");
}

async fn run_migrate(config: Config) -> anyhow::Result<()> {
    open_database(&config).await?;
    println!("Migrations applied to {}", config.database_url);
    Ok(())
}

async fn run_create_user(
    config: Config,
    username: String,
    email: String,
    password: String,
    role: String,
) -> anyhow::Result<()> {
    let data = UserCreate {
        username,
        email,
        password,
        role,
    }
    .validate()
    .map_err(|e| anyhow!("{}", e.message))?;

    let db = open_database(&config).await?;
    let hash = util::hash_password(&data.password).map_err(|e| anyhow!("hash password: {e}"))?;
    let user = db::users::create(&db.pool, &data.username, &data.email, &hash, data.role)
        .await
        .map_err(|e| anyhow!("{e}"))?;

    println!(
        "Created user '{}' ({}) with role {}",
        user.username,
        user.email,
        user.role.label()
    );
    Ok(())
}

async fn run_list_users(config: Config) -> anyhow::Result<()> {
    let db = open_database(&config).await?;
    let users = db::users::list(&db.pool).await?;
    if users.is_empty() {
        println!("No users found");
        return Ok(());
    }

    println!(
        "{:<5} {:<20} {:<30} {:<22} {:<8} LAST LOGIN",
        "ID", "USERNAME", "EMAIL", "ROLE", "ACTIVE"
    );
    for user in users {
        let last_login = user
            .last_login
            .map(shared::util::format_millis)
            .unwrap_or_else(|| "never".to_string());
        println!(
            "{:<5} {:<20} {:<30} {:<22} {:<8} {}",
            user.id,
            user.username,
            user.email,
            user.role.as_str(),
            if user.is_active { "yes" } else { "no" },
            last_login
        );
    }
    Ok(())
}

async fn run_change_password(
    config: Config,
    username: String,
    password: String,
) -> anyhow::Result<()> {
    shared::models::validate_password(&password).map_err(|e| anyhow!("{}", e.message))?;

    let db = open_database(&config).await?;
    let hash = util::hash_password(&password).map_err(|e| anyhow!("hash password: {e}"))?;
    if !db::users::set_password(&db.pool, &username, &hash).await? {
        bail!("user '{username}' not found");
    }

    if let Some(user) = db::users::find_credentials(&db.pool, &username).await? {
        db::sessions::delete_for_user(&db.pool, user.user.id).await?;
    }
    println!("Password updated for '{username}'");
    Ok(())
}
